//! In-memory resource store (reference implementation)

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{ResourceRecord, ResourceStore};
use crate::error::Result;
use crate::scope::ScopePath;

/// Map-backed resource store
#[derive(Default)]
pub struct MemoryResourceStore {
    records: RwLock<HashMap<ScopePath, ResourceRecord>>,
}

impl MemoryResourceStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResourceStore for MemoryResourceStore {
    async fn get(&self, id: &ScopePath) -> Result<Option<ResourceRecord>> {
        let records = self.records.read().await;
        Ok(records.get(id).cloned())
    }

    async fn set(&self, record: ResourceRecord) -> Result<()> {
        let mut records = self.records.write().await;
        records.insert(record.id.clone(), record);
        Ok(())
    }

    async fn delete(&self, id: &ScopePath) -> Result<()> {
        let mut records = self.records.write().await;
        records.remove(id);
        Ok(())
    }

    async fn exists(&self, id: &ScopePath) -> Result<bool> {
        let records = self.records.read().await;
        Ok(records.contains_key(id))
    }

    async fn children(&self, id: &ScopePath, kind: &str) -> Result<Vec<ResourceRecord>> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|r| r.kind == kind && r.id.rank() == id.rank() + 1 && r.id.starts_with(id))
            .cloned()
            .collect())
    }
}
