//! Backend sync collaborator boundary

use async_trait::async_trait;
use thiserror::Error;

use crate::core::types::{Chain, ChainId, Node, NodeId, PlayerId};
use crate::storage::{ChainRecord, NodeRecord};

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("malformed backend data: {0}")]
    Malformed(String),
}

/// Another player's profile as the backend reports it
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerProfile {
    pub id: PlayerId,
    pub display_name: String,
}

/// Bulk peer data: all nodes, chains, and profiles, grouped client-side
#[derive(Debug, Clone, Default)]
pub struct BackendSnapshot {
    pub nodes: Vec<(PlayerId, Node)>,
    pub chains: Vec<(PlayerId, Chain)>,
    pub profiles: Vec<PlayerProfile>,
}

/// Backend collaborator.
///
/// Uploads are idempotent: callers fetch the server-side id sets first and
/// skip records the backend already holds, so a partially-failed sync is
/// safe to resume.
#[async_trait]
pub trait BackendClient: Send + Sync {
    async fn fetch_snapshot(&self) -> Result<BackendSnapshot, SyncError>;

    async fn existing_node_ids(&self) -> Result<Vec<NodeId>, SyncError>;

    async fn existing_chain_ids(&self) -> Result<Vec<ChainId>, SyncError>;

    async fn upload_nodes(&self, player: PlayerId, nodes: &[NodeRecord]) -> Result<(), SyncError>;

    async fn upload_chains(&self, player: PlayerId, chains: &[ChainRecord])
        -> Result<(), SyncError>;
}
