//! Multiplayer sync: peer fetch/merge, territory derivation, conflict list
//!
//! The sync path only ever reads peer data into a disjoint read-only
//! structure; it never mutates the local player's collections. Change
//! notifications trigger a debounced re-fetch rather than incremental
//! patching, trading a few seconds of staleness for simplicity.

pub mod client;
pub mod debounce;

use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use chrono::{DateTime, Utc};

pub use client::{BackendClient, BackendSnapshot, PlayerProfile, SyncError};
pub use debounce::Debouncer;

use crate::core::config::GameConfig;
use crate::core::types::{Chain, Node, PlayerId};
use crate::storage::{chain_records, node_records};
use crate::territory::computer::{hull_territory, Territory};
use crate::territory::conflict::{detect_conflicts, ColorAssigner, PlayerTerritory};

pub struct MultiplayerSync {
    client: Arc<dyn BackendClient>,
    local_player: PlayerId,
    simplify_epsilon_deg: f64,
    debounce: Debouncer,
    colors: ColorAssigner,
    peers: AHashMap<PlayerId, PlayerTerritory>,
    conflicts: Vec<PlayerId>,
}

impl MultiplayerSync {
    pub fn new(client: Arc<dyn BackendClient>, local_player: PlayerId, config: &GameConfig) -> Self {
        Self {
            client,
            local_player,
            simplify_epsilon_deg: config.simplify_epsilon_deg,
            debounce: Debouncer::new(config.sync_debounce_ms),
            colors: ColorAssigner::new(),
            peers: AHashMap::new(),
            conflicts: Vec::new(),
        }
    }

    /// A change notification arrived for some owner; schedule a re-fetch
    pub fn notify_change(&mut self, now: DateTime<Utc>) {
        self.debounce.trigger(now);
    }

    /// Drive the debounce window; re-fetches when it elapses.
    ///
    /// Returns true when a refresh ran. Fetch failures leave the previous
    /// peer view intact and are retried on the next debounce tick.
    pub async fn tick(
        &mut self,
        now: DateTime<Utc>,
        local: Option<&Territory>,
    ) -> Result<bool, SyncError> {
        if !self.debounce.fire_due(now) {
            return Ok(false);
        }
        self.refresh(local).await?;
        Ok(true)
    }

    /// Fetch all peer data, group by owner, derive territories and colors,
    /// and recompute the conflict list
    pub async fn refresh(&mut self, local: Option<&Territory>) -> Result<(), SyncError> {
        let snapshot = self.client.fetch_snapshot().await.inspect_err(
            |e| tracing::warn!(error = %e, "peer fetch failed; keeping previous view"),
        )?;

        let mut nodes_by_player: AHashMap<PlayerId, Vec<Node>> = AHashMap::new();
        for (owner, node) in snapshot.nodes {
            if owner != self.local_player {
                nodes_by_player.entry(owner).or_default().push(node);
            }
        }

        let mut chains_by_player: AHashMap<PlayerId, Vec<Chain>> = AHashMap::new();
        for (owner, chain) in snapshot.chains {
            if owner != self.local_player {
                chains_by_player.entry(owner).or_default().push(chain);
            }
        }

        let mut owners: AHashSet<PlayerId> = nodes_by_player.keys().copied().collect();
        owners.extend(chains_by_player.keys().copied());

        self.peers.clear();
        for owner in owners {
            let nodes = nodes_by_player.remove(&owner).unwrap_or_default();
            let chains = chains_by_player.remove(&owner).unwrap_or_default();
            // Peers' territories use the same hull procedure as our own
            let territory = hull_territory(owner, &nodes, self.simplify_epsilon_deg);
            let color = self.colors.color_for(owner);
            self.peers.insert(
                owner,
                PlayerTerritory {
                    player: owner,
                    color,
                    nodes,
                    chains,
                    territory,
                },
            );
        }

        let peer_list: Vec<PlayerTerritory> = self.peers.values().cloned().collect();
        self.conflicts = detect_conflicts(local, &peer_list);
        tracing::debug!(
            peers = self.peers.len(),
            conflicts = self.conflicts.len(),
            "peer view refreshed"
        );
        Ok(())
    }

    /// Upload local permanent progress, skipping ids the backend already
    /// holds. Chains are reduced to exactly two path points first: the
    /// walked route never leaves the device.
    pub async fn push_local(&self, nodes: &[Node], chains: &[Chain]) -> Result<(), SyncError> {
        let known_nodes: AHashSet<_> = self.client.existing_node_ids().await?.into_iter().collect();
        let new_nodes: Vec<_> = node_records(nodes)
            .into_iter()
            .filter(|r| !known_nodes.contains(&crate::core::types::NodeId(r.id)))
            .collect();
        if !new_nodes.is_empty() {
            self.client.upload_nodes(self.local_player, &new_nodes).await?;
        }

        let known_chains: AHashSet<_> =
            self.client.existing_chain_ids().await?.into_iter().collect();
        let new_chains: Vec<_> = chain_records(chains)
            .into_iter()
            .filter(|r| !known_chains.contains(&crate::core::types::ChainId(r.id)))
            .map(|r| r.with_endpoint_path())
            .collect();
        if !new_chains.is_empty() {
            self.client
                .upload_chains(self.local_player, &new_chains)
                .await?;
        }
        Ok(())
    }

    pub fn peers(&self) -> Vec<&PlayerTerritory> {
        self.peers.values().collect()
    }

    pub fn peer(&self, id: PlayerId) -> Option<&PlayerTerritory> {
        self.peers.get(&id)
    }

    /// Peer ids whose territory bounding box overlaps the local player's
    pub fn conflicts(&self) -> &[PlayerId] {
        &self.conflicts
    }
}
