//! In-memory `StateStore` for tests and the demo binary

use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::error::Result;
use crate::storage::records::{AttemptRecord, ChainRecord, NodeRecord};
use crate::storage::StateStore;

#[derive(Debug, Default)]
struct Inner {
    attempt: Option<AttemptRecord>,
    nodes: Vec<NodeRecord>,
    chains: Vec<ChainRecord>,
    attempt_saves: usize,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times the attempt record was written (write-amplification
    /// assertions in tests)
    pub fn attempt_save_count(&self) -> usize {
        self.inner.lock().expect("store lock poisoned").attempt_saves
    }

    pub fn node_count(&self) -> usize {
        self.inner.lock().expect("store lock poisoned").nodes.len()
    }

    pub fn chain_count(&self) -> usize {
        self.inner.lock().expect("store lock poisoned").chains.len()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn save_attempt(&self, attempt: &AttemptRecord) -> Result<()> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        inner.attempt = Some(attempt.clone());
        inner.attempt_saves += 1;
        Ok(())
    }

    async fn load_attempt(&self) -> Result<Option<AttemptRecord>> {
        Ok(self.inner.lock().expect("store lock poisoned").attempt.clone())
    }

    async fn delete_attempt(&self) -> Result<()> {
        self.inner.lock().expect("store lock poisoned").attempt = None;
        Ok(())
    }

    async fn save_nodes(&self, nodes: &[NodeRecord]) -> Result<()> {
        self.inner.lock().expect("store lock poisoned").nodes = nodes.to_vec();
        Ok(())
    }

    async fn load_nodes(&self) -> Result<Vec<NodeRecord>> {
        Ok(self.inner.lock().expect("store lock poisoned").nodes.clone())
    }

    async fn save_chains(&self, chains: &[ChainRecord]) -> Result<()> {
        self.inner.lock().expect("store lock poisoned").chains = chains.to_vec();
        Ok(())
    }

    async fn load_chains(&self) -> Result<Vec<ChainRecord>> {
        Ok(self.inner.lock().expect("store lock poisoned").chains.clone())
    }
}
