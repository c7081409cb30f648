//! Throttling and cheat-gating over the raw location stream
//!
//! The sampler is only active while a walk attempt is in progress; it is
//! stopped immediately when the attempt ends so a late sample can never
//! append a point after cancellation.

use chrono::{DateTime, Duration, Utc};

use crate::core::config::GameConfig;
use crate::position::provider::PositionSample;

/// What the sampler decided about one raw sample
#[derive(Debug, Clone, PartialEq)]
pub enum SampleDecision {
    /// Forward this sample to the active attempt
    Accepted(PositionSample),
    /// Within the throttle window of the last accepted sample
    Throttled,
    /// Below the minimum walking speed: stationary jitter, dropped
    Stationary,
    /// Speed ceiling exceeded: the sample is dropped and the caller is
    /// expected to abort the current attempt
    CheatDetected { speed_mps: f64 },
    /// Sampler is stopped; sample ignored
    Inactive,
}

pub struct PositionSampler {
    interval: Duration,
    max_speed_mps: f64,
    min_speed_mps: f64,
    active: bool,
    last_accepted_at: Option<DateTime<Utc>>,
    pending: Option<PositionSample>,
}

impl PositionSampler {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            interval: Duration::milliseconds(config.sample_interval_ms as i64),
            max_speed_mps: config.max_walking_speed_mps,
            min_speed_mps: config.min_walking_speed_mps,
            active: false,
            last_accepted_at: None,
            pending: None,
        }
    }

    pub fn start(&mut self) {
        self.active = true;
        self.last_accepted_at = None;
        self.pending = None;
    }

    pub fn stop(&mut self) {
        self.active = false;
        self.last_accepted_at = None;
        self.pending = None;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Classify one raw sample.
    ///
    /// Order matters: the cheat gate runs before throttling so a burst of
    /// impossible speeds is flagged even mid-window. Bursts of valid
    /// updates coalesce to at most one acceptance per interval, latest
    /// wins: a throttled sample replaces the buffered one, and the buffer
    /// is dropped as soon as a newer sample is accepted. `take_pending`
    /// drains the buffer so a walk can end on the newest position even
    /// when the stream stopped mid-window.
    pub fn ingest(&mut self, sample: PositionSample) -> SampleDecision {
        if !self.active {
            return SampleDecision::Inactive;
        }

        if let Some(speed) = sample.speed_mps {
            if speed > self.max_speed_mps {
                tracing::warn!(speed_mps = speed, ceiling = self.max_speed_mps, "speed ceiling exceeded");
                return SampleDecision::CheatDetected { speed_mps: speed };
            }
            if speed < self.min_speed_mps {
                return SampleDecision::Stationary;
            }
        }

        if let Some(last) = self.last_accepted_at {
            if sample.timestamp - last < self.interval {
                self.pending = Some(sample);
                return SampleDecision::Throttled;
            }
        }

        self.pending = None;
        self.last_accepted_at = Some(sample.timestamp);
        SampleDecision::Accepted(sample)
    }

    /// The newest throttled sample since the last acceptance, if any
    pub fn take_pending(&mut self) -> Option<PositionSample> {
        self.pending.take()
    }
}
