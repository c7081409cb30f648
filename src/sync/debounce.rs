//! Debounce window for peer re-fetches
//!
//! Change notifications arrive in bursts; rather than patching
//! incrementally, the sync layer re-fetches everything a short, fixed
//! delay after the last notification. A new trigger supersedes a pending
//! window instead of stacking requests.

use chrono::{DateTime, Duration, Utc};

#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<DateTime<Utc>>,
}

impl Debouncer {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::milliseconds(delay_ms as i64),
            deadline: None,
        }
    }

    /// Arm (or re-arm) the window from `now`
    pub fn trigger(&mut self, now: DateTime<Utc>) {
        self.deadline = Some(now + self.delay);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Consume the window if it has elapsed
    pub fn fire_due(&mut self, now: DateTime<Utc>) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_only_after_delay() {
        let mut d = Debouncer::new(2000);
        let t0 = Utc::now();
        assert!(!d.fire_due(t0));

        d.trigger(t0);
        assert!(d.is_pending());
        assert!(!d.fire_due(t0 + Duration::milliseconds(1999)));
        assert!(d.fire_due(t0 + Duration::milliseconds(2000)));
        // Consumed: does not fire twice
        assert!(!d.fire_due(t0 + Duration::seconds(10)));
    }

    #[test]
    fn test_new_trigger_supersedes_pending_window() {
        let mut d = Debouncer::new(2000);
        let t0 = Utc::now();
        d.trigger(t0);
        // Re-trigger just before the first deadline pushes it out
        d.trigger(t0 + Duration::milliseconds(1500));
        assert!(!d.fire_due(t0 + Duration::milliseconds(2000)));
        assert!(d.fire_due(t0 + Duration::milliseconds(3500)));
    }
}
