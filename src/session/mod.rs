//! Player session: the single-actor context owning all mutable game state
//!
//! All mutation happens here in response to discrete events (a GPS sample,
//! a user action); stores, index, and controller are owned values, not
//! shared singletons, so tests and multi-tenant servers can run many
//! sessions side by side. Storage calls are the only suspension points.

use std::sync::Arc;

use chrono::Utc;

use crate::attempt::{AttemptInfo, ChainAttemptController};
use crate::core::config::{GameConfig, TerritoryStrategy};
use crate::core::error::{ClaimError, Result};
use crate::core::types::{Chain, GeoPoint, Node, NodeStatus, PlayerId, SessionKind};
use crate::position::{PositionSample, PositionSampler, SampleDecision};
use crate::rules;
use crate::rules::RuleCheck;
use crate::spatial::SpatialIndex;
use crate::storage::{chain_records, node_records, StateStore};
use crate::store::{ChainStore, NodeStore};
use crate::territory::{Territory, TerritoryComputer};

/// What one ingested sample did to the session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Point appended to the active walk
    PointRecorded(GeoPoint),
    /// Sample throttled, stationary, or arrived while idle
    SampleIgnored,
    /// A loop closed under the loop-capture strategy
    LoopCaptured { area_m2: f64 },
    /// Speed ceiling exceeded: the walk was aborted
    CheatAborted { speed_mps: f64 },
}

pub struct PlayerSession {
    player: PlayerId,
    kind: SessionKind,
    config: GameConfig,
    store: Arc<dyn StateStore>,
    nodes: NodeStore,
    chains: ChainStore,
    index: SpatialIndex,
    controller: ChainAttemptController,
    sampler: PositionSampler,
    territory: TerritoryComputer,
    current_territory: Option<Territory>,
}

impl PlayerSession {
    pub fn new(
        player: PlayerId,
        kind: SessionKind,
        config: GameConfig,
        store: Arc<dyn StateStore>,
    ) -> Result<Self> {
        config.validate().map_err(ClaimError::Config)?;
        Ok(Self {
            player,
            kind,
            index: SpatialIndex::new(config.influence_radius_km),
            controller: ChainAttemptController::new(store.clone(), &config, kind),
            sampler: PositionSampler::new(&config),
            territory: TerritoryComputer::new(&config),
            config,
            store,
            nodes: NodeStore::new(),
            chains: ChainStore::new(),
            current_territory: None,
        })
    }

    /// Load persisted state on process start: node/chain collections, the
    /// spatial index, the derived territory, and any resumable attempt.
    pub async fn restore(&mut self) -> Result<()> {
        if self.kind == SessionKind::Simulation {
            return Ok(());
        }

        for record in self.store.load_nodes().await? {
            self.nodes.insert(record.into_node());
        }
        for record in self.store.load_chains().await? {
            self.chains.insert(record.into_chain());
        }
        let pruned = self.chains.prune_dangling(&self.nodes);
        if pruned > 0 {
            tracing::warn!(pruned, "dropped chains referencing missing nodes");
        }

        self.index.build(&self.nodes.all());
        self.recompute_territory();

        if self.controller.restore().await? {
            // Mid-walk restart: resume listening for positions
            self.sampler.start();
        }
        Ok(())
    }

    /// Gate and begin a new walk at the given coordinates.
    ///
    /// Returns the failing `RuleCheck` on rejection; `Err` is reserved for
    /// real faults (already walking, storage failure).
    pub async fn start_walk(&mut self, point: GeoPoint) -> Result<RuleCheck> {
        if self.controller.is_active() {
            return Err(ClaimError::AttemptAlreadyActive);
        }

        let temporary = self.kind.temporary();
        let today = Utc::now().date_naive();
        let count_today = self.chains.count_created_on(today, temporary);
        let quota = rules::can_create_chain_today(count_today, self.kind, self.config.daily_chain_quota);
        if !quota.allowed {
            return Ok(quota);
        }

        let reach = rules::can_start_chain(
            point,
            &self.nodes.all(),
            &self.chains.all(),
            self.kind,
            self.config.influence_radius_km,
        );
        if !reach.allowed {
            return Ok(reach);
        }

        self.controller.start_attempt(point, temporary).await?;
        self.sampler.start();
        Ok(RuleCheck::ok())
    }

    /// Feed one raw geolocation sample through throttle and cheat gates
    pub async fn ingest_sample(&mut self, sample: PositionSample) -> Result<SessionEvent> {
        match self.sampler.ingest(sample) {
            SampleDecision::Accepted(sample) => {
                let point = sample.coordinates;
                self.controller.add_point(point)?;

                if self.config.territory_strategy == TerritoryStrategy::LoopCapture {
                    if let Some(attempt) = self.controller.attempt() {
                        let path = attempt.path.clone();
                        if let Some(captured) = self
                            .territory
                            .capture_mut()
                            .observe_path(&path, sample.timestamp)
                        {
                            self.current_territory =
                                self.territory.recompute(self.player, &[]);
                            return Ok(SessionEvent::LoopCaptured {
                                area_m2: captured.area_m2,
                            });
                        }
                    }
                }
                Ok(SessionEvent::PointRecorded(point))
            }
            SampleDecision::CheatDetected { speed_mps } => {
                // Hard abort: halt sampling before clearing state so no
                // further points can land after the caller observes this
                self.sampler.stop();
                self.controller.clear_attempt().await;
                tracing::warn!(speed_mps, "walk aborted by cheat detection");
                Ok(SessionEvent::CheatAborted { speed_mps })
            }
            SampleDecision::Throttled | SampleDecision::Stationary | SampleDecision::Inactive => {
                Ok(SessionEvent::SampleIgnored)
            }
        }
    }

    /// Validate and promote the active walk into a chain and two
    /// established nodes.
    ///
    /// On a failing path check the attempt stays active (the player can
    /// keep walking or cancel); on success stores, index, territory, and
    /// persisted state are all updated.
    pub async fn finish_walk(&mut self) -> Result<RuleCheck> {
        if !self.controller.is_active() {
            return Err(ClaimError::NoActiveAttempt);
        }
        // Fold in the newest throttled sample so the chain ends at the
        // most recent delivered position, not the last accepted one
        if let Some(sample) = self.sampler.take_pending() {
            self.controller.add_point(sample.coordinates)?;
        }

        let path = self
            .controller
            .attempt()
            .map(|a| a.path.clone())
            .ok_or(ClaimError::NoActiveAttempt)?;

        let check = rules::is_valid_path(&path, self.config.min_path_points);
        if !check.allowed {
            return Ok(check);
        }

        self.sampler.stop();
        let attempt = self.controller.take_attempt().ok_or(ClaimError::NoActiveAttempt)?;

        let mut anchor = attempt.anchor;
        anchor.status = NodeStatus::Established;
        let temporary = self.kind.temporary();

        let first = attempt.path[0];
        let last = attempt.path[attempt.path.len() - 1];
        let end = Node::established(last, temporary);

        // Permanent chains keep only their endpoints; the walked route is
        // dropped here for player-location privacy
        let chain_path = if temporary {
            attempt.path.clone()
        } else {
            vec![first, last]
        };
        let chain = Chain::new(anchor.id, end.id, chain_path, temporary);

        tracing::info!(
            chain = ?chain.id,
            node_a = ?anchor.id,
            node_b = ?end.id,
            points_walked = attempt.path.len(),
            "walk promoted to chain"
        );

        self.index.insert(&anchor);
        self.index.insert(&end);
        self.nodes.insert(anchor);
        self.nodes.insert(end);
        self.chains.insert(chain);

        self.controller.clear_attempt().await;
        self.recompute_territory();
        self.persist_world().await;
        Ok(RuleCheck::ok())
    }

    /// Abandon the active walk; the pending anchor is discarded
    pub async fn cancel_walk(&mut self) {
        self.sampler.stop();
        self.controller.clear_attempt().await;
    }

    fn recompute_territory(&mut self) {
        let established = self.nodes.established(self.kind.temporary());
        self.current_territory = self.territory.recompute(self.player, &established);
    }

    /// Write the permanent collections through the storage collaborator.
    ///
    /// Failures are logged and retried on the next mutation; local state
    /// is already updated and stays authoritative.
    async fn persist_world(&self) {
        if self.kind == SessionKind::Simulation {
            return;
        }
        let nodes = node_records(&self.nodes.all());
        if let Err(e) = self.store.save_nodes(&nodes).await {
            tracing::warn!(error = %e, "failed to persist nodes");
        }
        let chains = chain_records(&self.chains.all());
        if let Err(e) = self.store.save_chains(&chains).await {
            tracing::warn!(error = %e, "failed to persist chains");
        }
    }

    // === Read-only accessors ===

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn is_walking(&self) -> bool {
        self.controller.is_active()
    }

    pub fn attempt_info(&self) -> Option<AttemptInfo> {
        self.controller.attempt_info()
    }

    pub fn territory(&self) -> Option<&Territory> {
        self.current_territory.as_ref()
    }

    pub fn nodes(&self) -> &NodeStore {
        &self.nodes
    }

    pub fn chains(&self) -> &ChainStore {
        &self.chains
    }

    pub fn spatial_index(&self) -> &SpatialIndex {
        &self.index
    }

    /// Shutdown hook: wait out any background attempt save
    pub async fn flush(&mut self) {
        self.controller.await_pending_save().await;
    }
}
