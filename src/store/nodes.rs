//! Node store: the single owner of the canonical node collection
//!
//! Readers get cloned snapshots; nothing outside the store holds a mutable
//! handle to the collection.

use ahash::AHashMap;

use crate::core::error::{ClaimError, Result};
use crate::core::types::{Node, NodeId, NodeStatus};

#[derive(Debug, Default)]
pub struct NodeStore {
    nodes: AHashMap<NodeId, Node>,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a node
    pub fn insert(&mut self, node: Node) {
        self.nodes.insert(node.id, node);
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        self.nodes.remove(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Snapshot of every node
    pub fn all(&self) -> Vec<Node> {
        self.nodes.values().cloned().collect()
    }

    /// Snapshot of one pool: temporary (simulation) or permanent nodes
    pub fn pool(&self, temporary: bool) -> Vec<Node> {
        self.nodes
            .values()
            .filter(|n| n.temporary == temporary)
            .cloned()
            .collect()
    }

    /// Established nodes of one pool; the territory input set
    pub fn established(&self, temporary: bool) -> Vec<Node> {
        self.nodes
            .values()
            .filter(|n| n.temporary == temporary && n.is_established())
            .cloned()
            .collect()
    }

    /// Nodes eligible for durable storage (never temporary ones)
    pub fn persistent(&self) -> Vec<Node> {
        self.pool(false)
    }

    pub fn set_status(&mut self, id: NodeId, status: NodeStatus) -> Result<()> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(ClaimError::NodeNotFound(id))?;
        node.status = status;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
