//! Loop-closure capture: the alternative territory strategy
//!
//! A walk captures ground when its path closes back onto its own start,
//! or onto the boundary of a previously captured loop, within the
//! configured closing distance. Each capture banks the walked ring and its
//! spherical-excess area; territory under this strategy is the union of
//! all captured loops. A cooldown prevents rapid re-captures from GPS
//! noise around the closing point.

use chrono::{DateTime, Duration, Utc};

use crate::core::config::GameConfig;
use crate::core::types::{GeoPoint, PlayerId};
use crate::geo;
use crate::territory::computer::Territory;

/// One banked loop
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedLoop {
    pub ring: Vec<GeoPoint>,
    pub area_m2: f64,
    pub captured_at: DateTime<Utc>,
}

pub struct CaptureTracker {
    close_distance_m: f64,
    min_loop_points: usize,
    cooldown: Duration,
    loops: Vec<CapturedLoop>,
    last_capture_at: Option<DateTime<Utc>>,
}

impl CaptureTracker {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            close_distance_m: config.loop_close_distance_m,
            min_loop_points: config.min_loop_points,
            cooldown: Duration::seconds(config.capture_cooldown_secs),
            loops: Vec::new(),
            last_capture_at: None,
        }
    }

    /// Inspect the in-progress path after each appended point; banks and
    /// returns a captured loop when the path closes.
    pub fn observe_path(&mut self, path: &[GeoPoint], now: DateTime<Utc>) -> Option<CapturedLoop> {
        if path.len() < self.min_loop_points {
            return None;
        }
        if let Some(last_capture) = self.last_capture_at {
            if now - last_capture < self.cooldown {
                return None;
            }
        }

        let head = *path.first()?;
        let tail = *path.last()?;
        if !self.closes(head, tail) {
            return None;
        }

        let ring = path.to_vec();
        let area_m2 = geo::polygon_area_m2(&ring);
        let captured = CapturedLoop {
            ring,
            area_m2,
            captured_at: now,
        };
        tracing::info!(area_m2, points = captured.ring.len(), "loop captured");
        self.last_capture_at = Some(now);
        self.loops.push(captured.clone());
        Some(captured)
    }

    /// Closure test: back to the walk's own start, or onto an existing
    /// captured boundary
    fn closes(&self, head: GeoPoint, tail: GeoPoint) -> bool {
        if geo::distance_m(head, tail) <= self.close_distance_m {
            return true;
        }
        self.loops.iter().any(|l| {
            l.ring
                .iter()
                .any(|v| geo::distance_m(*v, tail) <= self.close_distance_m)
        })
    }

    /// Union-of-loops territory; none before the first capture
    pub fn territory(&self, owner: PlayerId) -> Option<Territory> {
        if self.loops.is_empty() {
            return None;
        }
        Some(Territory {
            owner,
            polygons: self.loops.iter().map(|l| geo::ring_polygon(&l.ring)).collect(),
            area_m2: self.loops.iter().map(|l| l.area_m2).sum(),
        })
    }

    pub fn loops(&self) -> &[CapturedLoop] {
        &self.loops
    }

    pub fn clear(&mut self) {
        self.loops.clear();
        self.last_capture_at = None;
    }
}
