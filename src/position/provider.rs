//! Geolocation collaborator boundary

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::core::error::GeolocationError;
use crate::core::types::GeoPoint;

/// One raw reading from the device location source
#[derive(Debug, Clone, PartialEq)]
pub struct PositionSample {
    pub coordinates: GeoPoint,
    /// Instantaneous speed in m/s, when the source reports one
    pub speed_mps: Option<f64>,
    /// Horizontal accuracy in meters, when the source reports one
    pub accuracy_m: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl PositionSample {
    pub fn at(coordinates: GeoPoint, timestamp: DateTime<Utc>) -> Self {
        Self {
            coordinates,
            speed_mps: None,
            accuracy_m: None,
            timestamp,
        }
    }

    pub fn with_speed(mut self, speed_mps: f64) -> Self {
        self.speed_mps = Some(speed_mps);
        self
    }
}

/// Device/location-service collaborator.
///
/// The push subscription is the caller feeding each delivered sample into
/// `PositionSampler::ingest`; this trait covers the one-shot request.
/// Failures are typed so the caller can present different guidance per
/// case instead of one generic error.
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    async fn current_position(&self) -> std::result::Result<PositionSample, GeolocationError>;
}
