//! Persisted-storage collaborator boundary
//!
//! The engine persists three logical records: the single active walk
//! attempt (overwritten in place, deleted on clear), the permanent node
//! collection, and the permanent chain collection. Implementations sit
//! behind `StateStore`; the engine never touches the medium directly.

pub mod memory;
pub mod records;

use async_trait::async_trait;

use crate::core::error::Result;
pub use memory::MemoryStore;
pub use records::{chain_records, node_records, AttemptRecord, ChainRecord, NodeRecord};

#[async_trait]
pub trait StateStore: Send + Sync {
    /// Overwrite the persisted walk attempt
    async fn save_attempt(&self, attempt: &AttemptRecord) -> Result<()>;

    async fn load_attempt(&self) -> Result<Option<AttemptRecord>>;

    /// Delete the persisted walk attempt; deleting a missing record is a no-op
    async fn delete_attempt(&self) -> Result<()>;

    /// Replace the persisted node collection
    async fn save_nodes(&self, nodes: &[NodeRecord]) -> Result<()>;

    async fn load_nodes(&self) -> Result<Vec<NodeRecord>>;

    /// Replace the persisted chain collection
    async fn save_chains(&self, chains: &[ChainRecord]) -> Result<()>;

    async fn load_chains(&self) -> Result<Vec<ChainRecord>>;
}
