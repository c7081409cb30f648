//! The resumable state machine for an in-progress walk
//!
//! idle -> active (persisted) -> { finalized, cancelled, expired }
//!
//! The attempt is persisted continuously so it survives a process restart:
//! immediately at start, then every Nth accepted point via a background
//! task so point ingestion never blocks on storage. A persisted attempt
//! older than the expiry window is discarded silently on restore; expiry
//! is an expected outcome, not an error.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::task::JoinHandle;

use crate::core::config::GameConfig;
use crate::core::error::{ClaimError, Result};
use crate::core::types::{GeoPoint, Node, SessionKind};
use crate::storage::{AttemptRecord, StateStore};

/// The single mutable in-progress walk
///
/// `path` is always non-empty; its first element is the anchor coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainAttempt {
    pub anchor: Node,
    pub path: Vec<GeoPoint>,
}

/// Derived view of the active attempt's age
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptInfo {
    pub started_at: chrono::DateTime<Utc>,
    pub elapsed: Duration,
    pub point_count: usize,
    pub is_expired: bool,
}

pub struct ChainAttemptController {
    store: Arc<dyn StateStore>,
    persist_every: usize,
    expiry: Duration,
    /// Simulation sessions never persist
    persist_enabled: bool,
    attempt: Option<ChainAttempt>,
    points_since_save: usize,
    pending_save: Option<JoinHandle<()>>,
}

impl ChainAttemptController {
    pub fn new(store: Arc<dyn StateStore>, config: &GameConfig, kind: SessionKind) -> Self {
        Self {
            store,
            persist_every: config.persist_every_points,
            expiry: Duration::hours(config.attempt_expiry_hours),
            persist_enabled: kind == SessionKind::Permanent,
            attempt: None,
            points_since_save: 0,
            pending_save: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.attempt.is_some()
    }

    pub fn attempt(&self) -> Option<&ChainAttempt> {
        self.attempt.as_ref()
    }

    /// Start a new attempt at the given coordinates. Only legal from idle.
    ///
    /// Creates a pending anchor node and a one-element path, and persists
    /// immediately so a crash right after starting still restores.
    pub async fn start_attempt(&mut self, point: GeoPoint, temporary: bool) -> Result<Node> {
        if self.attempt.is_some() {
            return Err(ClaimError::AttemptAlreadyActive);
        }

        let anchor = Node::pending(point, temporary);
        let attempt = ChainAttempt {
            path: vec![point],
            anchor,
        };

        if self.persist_enabled {
            let record = AttemptRecord::new(&attempt.anchor, &attempt.path);
            if let Err(e) = self.store.save_attempt(&record).await {
                // Local state is authoritative; the next cadence save retries
                tracing::warn!(error = %e, "failed to persist new walk attempt");
            }
        }
        self.points_since_save = 0;

        tracing::info!(anchor = ?attempt.anchor.id, "walk attempt started");
        let anchor = attempt.anchor.clone();
        self.attempt = Some(attempt);
        Ok(anchor)
    }

    /// Append an accepted point. Only legal from active.
    ///
    /// Non-blocking: at the persistence cadence a snapshot is written by a
    /// spawned task instead of being awaited here.
    pub fn add_point(&mut self, point: GeoPoint) -> Result<()> {
        let attempt = self.attempt.as_mut().ok_or(ClaimError::NoActiveAttempt)?;
        attempt.path.push(point);
        self.points_since_save += 1;

        if self.persist_enabled && self.points_since_save >= self.persist_every {
            self.points_since_save = 0;
            let record = AttemptRecord::new(&attempt.anchor, &attempt.path);
            let store = self.store.clone();
            // Saves chain behind the previous one so snapshots reach
            // storage in order and clear_attempt drains every in-flight
            // write before deleting the record
            let prev = self.pending_save.take();
            self.pending_save = Some(tokio::spawn(async move {
                if let Some(prev) = prev {
                    let _ = prev.await;
                }
                if let Err(e) = store.save_attempt(&record).await {
                    // Retried at the next cadence; local state is unaffected
                    tracing::warn!(error = %e, "failed to persist walk attempt");
                }
            }));
        }
        Ok(())
    }

    /// Elapsed duration and expiry flag for the active attempt
    pub fn attempt_info(&self) -> Option<AttemptInfo> {
        let attempt = self.attempt.as_ref()?;
        let elapsed = Utc::now() - attempt.anchor.created_at;
        Some(AttemptInfo {
            started_at: attempt.anchor.created_at,
            elapsed,
            point_count: attempt.path.len(),
            is_expired: elapsed > self.expiry,
        })
    }

    /// Take ownership of the attempt for promotion into a permanent chain
    pub fn take_attempt(&mut self) -> Option<ChainAttempt> {
        self.attempt.take()
    }

    /// Transition to idle and erase persisted state. Idempotent; called on
    /// finalize, cancel, and cheat-abort alike.
    pub async fn clear_attempt(&mut self) {
        self.attempt = None;
        self.points_since_save = 0;
        self.await_pending_save().await;
        if self.persist_enabled {
            if let Err(e) = self.store.delete_attempt().await {
                // Local state is already idle; a stale record will be
                // overwritten by the next attempt or expire on its own
                tracing::warn!(error = %e, "failed to erase persisted walk attempt");
            }
        }
    }

    /// Restore a persisted attempt on process start.
    ///
    /// Returns true if an attempt younger than the expiry window was
    /// restored into active; older records are discarded silently.
    pub async fn restore(&mut self) -> Result<bool> {
        if !self.persist_enabled || self.attempt.is_some() {
            return Ok(false);
        }

        let Some(record) = self.store.load_attempt().await? else {
            return Ok(false);
        };

        let anchor = record.anchor.clone().into_node();
        let age = Utc::now() - anchor.created_at;
        if age > self.expiry {
            tracing::debug!(anchor = ?anchor.id, "discarding expired walk attempt");
            if let Err(e) = self.store.delete_attempt().await {
                tracing::warn!(error = %e, "failed to erase expired walk attempt");
            }
            return Ok(false);
        }

        let path = record.path_points();
        tracing::info!(anchor = ?anchor.id, points = path.len(), "walk attempt restored");
        self.attempt = Some(ChainAttempt { anchor, path });
        Ok(true)
    }

    /// Wait for an outstanding background save (shutdown and tests)
    pub async fn await_pending_save(&mut self) {
        if let Some(handle) = self.pending_save.take() {
            let _ = handle.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::storage::{ChainRecord, MemoryStore, NodeRecord};
    use geo_types::coord;

    fn pt(x: f64, y: f64) -> GeoPoint {
        coord! { x: x, y: y }
    }

    /// Delegates to a MemoryStore but sleeps on one chosen attempt save,
    /// simulating a slow storage write that outlives later calls
    struct DelayedSaveStore {
        inner: MemoryStore,
        saves: AtomicUsize,
        slow_save: usize,
        delay_ms: u64,
    }

    impl DelayedSaveStore {
        fn new(slow_save: usize, delay_ms: u64) -> Self {
            Self {
                inner: MemoryStore::new(),
                saves: AtomicUsize::new(0),
                slow_save,
                delay_ms,
            }
        }
    }

    #[async_trait]
    impl StateStore for DelayedSaveStore {
        async fn save_attempt(&self, attempt: &AttemptRecord) -> Result<()> {
            let n = self.saves.fetch_add(1, Ordering::SeqCst) + 1;
            if n == self.slow_save {
                tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
            }
            self.inner.save_attempt(attempt).await
        }

        async fn load_attempt(&self) -> Result<Option<AttemptRecord>> {
            self.inner.load_attempt().await
        }

        async fn delete_attempt(&self) -> Result<()> {
            self.inner.delete_attempt().await
        }

        async fn save_nodes(&self, nodes: &[NodeRecord]) -> Result<()> {
            self.inner.save_nodes(nodes).await
        }

        async fn load_nodes(&self) -> Result<Vec<NodeRecord>> {
            self.inner.load_nodes().await
        }

        async fn save_chains(&self, chains: &[ChainRecord]) -> Result<()> {
            self.inner.save_chains(chains).await
        }

        async fn load_chains(&self) -> Result<Vec<ChainRecord>> {
            self.inner.load_chains().await
        }
    }

    /// Attempt saves always fail; everything else delegates
    #[derive(Default)]
    struct FailingSaveStore {
        inner: MemoryStore,
    }

    #[async_trait]
    impl StateStore for FailingSaveStore {
        async fn save_attempt(&self, _attempt: &AttemptRecord) -> Result<()> {
            Err(ClaimError::Storage("disk full".into()))
        }

        async fn load_attempt(&self) -> Result<Option<AttemptRecord>> {
            self.inner.load_attempt().await
        }

        async fn delete_attempt(&self) -> Result<()> {
            self.inner.delete_attempt().await
        }

        async fn save_nodes(&self, nodes: &[NodeRecord]) -> Result<()> {
            self.inner.save_nodes(nodes).await
        }

        async fn load_nodes(&self) -> Result<Vec<NodeRecord>> {
            self.inner.load_nodes().await
        }

        async fn save_chains(&self, chains: &[ChainRecord]) -> Result<()> {
            self.inner.save_chains(chains).await
        }

        async fn load_chains(&self) -> Result<Vec<ChainRecord>> {
            self.inner.load_chains().await
        }
    }

    fn controller(store: Arc<dyn StateStore>, kind: SessionKind) -> ChainAttemptController {
        let config = GameConfig {
            persist_every_points: 5,
            ..GameConfig::default()
        };
        ChainAttemptController::new(store, &config, kind)
    }

    #[tokio::test]
    async fn test_start_persists_immediately_and_rejects_double_start() {
        let store = Arc::new(MemoryStore::new());
        let mut ctrl = controller(store.clone(), SessionKind::Permanent);

        ctrl.start_attempt(pt(0.0, 0.0), false).await.unwrap();
        assert_eq!(store.attempt_save_count(), 1);
        assert!(ctrl.is_active());

        let err = ctrl.start_attempt(pt(1.0, 1.0), false).await.unwrap_err();
        assert!(matches!(err, ClaimError::AttemptAlreadyActive));
    }

    #[tokio::test]
    async fn test_add_point_persists_at_cadence_only() {
        let store = Arc::new(MemoryStore::new());
        let mut ctrl = controller(store.clone(), SessionKind::Permanent);
        ctrl.start_attempt(pt(0.0, 0.0), false).await.unwrap();

        for i in 0..4 {
            ctrl.add_point(pt(0.0, 0.0001 * (i + 1) as f64)).unwrap();
        }
        ctrl.await_pending_save().await;
        // 4 points < cadence of 5: only the initial save happened
        assert_eq!(store.attempt_save_count(), 1);

        ctrl.add_point(pt(0.0, 0.0005)).unwrap();
        ctrl.await_pending_save().await;
        assert_eq!(store.attempt_save_count(), 2);

        let persisted = store.load_attempt().await.unwrap().unwrap();
        assert_eq!(persisted.path.len(), 6);
    }

    #[tokio::test]
    async fn test_add_point_requires_active_attempt() {
        let store = Arc::new(MemoryStore::new());
        let mut ctrl = controller(store, SessionKind::Permanent);
        assert!(matches!(
            ctrl.add_point(pt(0.0, 0.0)),
            Err(ClaimError::NoActiveAttempt)
        ));
    }

    #[tokio::test]
    async fn test_restore_round_trip_within_window() {
        let store = Arc::new(MemoryStore::new());
        let mut ctrl = controller(store.clone(), SessionKind::Permanent);
        ctrl.start_attempt(pt(0.0, 0.0), false).await.unwrap();
        for i in 1..=5 {
            ctrl.add_point(pt(0.0, 0.0001 * i as f64)).unwrap();
        }
        ctrl.await_pending_save().await;
        let original = ctrl.attempt().cloned().unwrap();

        // Fresh controller over the same store: the attempt comes back whole
        let mut restored = controller(store, SessionKind::Permanent);
        assert!(restored.restore().await.unwrap());
        assert_eq!(restored.attempt().cloned().unwrap(), original);
    }

    #[tokio::test]
    async fn test_restore_discards_expired_attempt() {
        let store = Arc::new(MemoryStore::new());
        let mut anchor = Node::pending(pt(0.0, 0.0), false);
        anchor.created_at = Utc::now() - Duration::hours(73);
        let record = AttemptRecord::new(&anchor, &[anchor.coordinates]);
        store.save_attempt(&record).await.unwrap();

        let mut ctrl = controller(store.clone(), SessionKind::Permanent);
        assert!(!ctrl.restore().await.unwrap());
        assert!(!ctrl.is_active());
        // The stale record is gone too
        assert!(store.load_attempt().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear_attempt_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let mut ctrl = controller(store.clone(), SessionKind::Permanent);
        ctrl.start_attempt(pt(0.0, 0.0), false).await.unwrap();

        ctrl.clear_attempt().await;
        assert!(!ctrl.is_active());
        assert!(store.load_attempt().await.unwrap().is_none());

        ctrl.clear_attempt().await;
        assert!(!ctrl.is_active());
    }

    #[tokio::test]
    async fn test_simulation_never_persists() {
        let store = Arc::new(MemoryStore::new());
        let mut ctrl = controller(store.clone(), SessionKind::Simulation);
        ctrl.start_attempt(pt(0.0, 0.0), true).await.unwrap();
        for i in 1..=10 {
            ctrl.add_point(pt(0.0, 0.0001 * i as f64)).unwrap();
        }
        ctrl.await_pending_save().await;
        assert_eq!(store.attempt_save_count(), 0);
        assert!(store.load_attempt().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear_attempt_drains_slow_in_flight_saves() {
        // The first cadence save (save #2, after the start save) stalls;
        // clearing must wait it out so the stale snapshot can never land
        // after the delete and resurrect the attempt
        let store = Arc::new(DelayedSaveStore::new(2, 100));
        let config = GameConfig {
            persist_every_points: 1,
            ..GameConfig::default()
        };
        let mut ctrl = ChainAttemptController::new(store.clone(), &config, SessionKind::Permanent);

        ctrl.start_attempt(pt(0.0, 0.0), false).await.unwrap();
        ctrl.add_point(pt(0.0, 0.0001)).unwrap(); // slow save
        ctrl.add_point(pt(0.0, 0.0002)).unwrap(); // chained behind it
        ctrl.clear_attempt().await;

        assert!(store.load_attempt().await.unwrap().is_none());
        // Long after the stalled write would have finished, still gone
        tokio::time::sleep(std::time::Duration::from_millis(150)).await;
        assert!(store.load_attempt().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cadence_saves_apply_in_order() {
        // An early slow write must not overwrite a later snapshot
        let store = Arc::new(DelayedSaveStore::new(2, 50));
        let config = GameConfig {
            persist_every_points: 1,
            ..GameConfig::default()
        };
        let mut ctrl = ChainAttemptController::new(store.clone(), &config, SessionKind::Permanent);

        ctrl.start_attempt(pt(0.0, 0.0), false).await.unwrap();
        ctrl.add_point(pt(0.0, 0.0001)).unwrap();
        ctrl.add_point(pt(0.0, 0.0002)).unwrap();
        ctrl.await_pending_save().await;

        let persisted = store.load_attempt().await.unwrap().unwrap();
        assert_eq!(persisted.path.len(), 3);
    }

    #[tokio::test]
    async fn test_start_attempt_survives_storage_failure() {
        // Persistence failures are logged and retried, never fatal
        let store = Arc::new(FailingSaveStore::default());
        let mut ctrl = controller(store, SessionKind::Permanent);

        let anchor = ctrl.start_attempt(pt(0.0, 0.0), false).await.unwrap();
        assert!(ctrl.is_active());
        assert_eq!(anchor.coordinates, pt(0.0, 0.0));
        // Points keep flowing despite the failing store
        ctrl.add_point(pt(0.0, 0.0001)).unwrap();
        ctrl.await_pending_save().await;
        assert_eq!(ctrl.attempt().unwrap().path.len(), 2);
    }

    #[tokio::test]
    async fn test_attempt_info_tracks_elapsed() {
        let store = Arc::new(MemoryStore::new());
        let mut ctrl = controller(store, SessionKind::Permanent);
        assert!(ctrl.attempt_info().is_none());

        ctrl.start_attempt(pt(0.0, 0.0), false).await.unwrap();
        let info = ctrl.attempt_info().unwrap();
        assert!(!info.is_expired);
        assert_eq!(info.point_count, 1);
    }
}
