//! Chain store: the single owner of the canonical chain collection

use ahash::AHashMap;
use chrono::NaiveDate;

use crate::core::types::{Chain, ChainId, NodeId};
use crate::store::nodes::NodeStore;

#[derive(Debug, Default)]
pub struct ChainStore {
    chains: AHashMap<ChainId, Chain>,
}

impl ChainStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a chain
    pub fn insert(&mut self, chain: Chain) {
        self.chains.insert(chain.id, chain);
    }

    pub fn get(&self, id: ChainId) -> Option<&Chain> {
        self.chains.get(&id)
    }

    pub fn remove(&mut self, id: ChainId) -> Option<Chain> {
        self.chains.remove(&id)
    }

    /// Snapshot of every chain
    pub fn all(&self) -> Vec<Chain> {
        self.chains.values().cloned().collect()
    }

    /// Snapshot of one pool: temporary (simulation) or permanent chains
    pub fn pool(&self, temporary: bool) -> Vec<Chain> {
        self.chains
            .values()
            .filter(|c| c.temporary == temporary)
            .cloned()
            .collect()
    }

    /// Chains eligible for durable storage (never temporary ones)
    pub fn persistent(&self) -> Vec<Chain> {
        self.pool(false)
    }

    /// Chains connected to the given node
    pub fn chains_touching(&self, node: NodeId) -> Vec<Chain> {
        self.chains
            .values()
            .filter(|c| c.touches(node))
            .cloned()
            .collect()
    }

    /// Drop chains referencing nodes that no longer exist.
    ///
    /// A chain is valid iff both endpoints exist; anything else is pruned.
    /// Returns the number of chains removed.
    pub fn prune_dangling(&mut self, nodes: &NodeStore) -> usize {
        let before = self.chains.len();
        self.chains
            .retain(|_, c| nodes.contains(c.node_a) && nodes.contains(c.node_b));
        before - self.chains.len()
    }

    /// Chains of one pool created on the given UTC calendar day
    pub fn count_created_on(&self, day: NaiveDate, temporary: bool) -> usize {
        self.chains
            .values()
            .filter(|c| c.temporary == temporary && c.created_at.date_naive() == day)
            .count()
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}
