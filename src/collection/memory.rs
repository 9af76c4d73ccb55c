//! In-memory permission backend (reference implementation)

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::query::{PermissionQuery, PermissionSearch};
use super::{EntryUpdate, PermissionBackend};
use crate::entry::AccountPermissionEntry;
use crate::error::Result;
use crate::scope::ScopePath;

/// Map-backed permission backend
///
/// One coarse lock per logical collection: all scope records live behind a
/// single `RwLock`, so same-scope operations serialize. The search
/// implementation is a pure in-memory filter over every stored entry.
#[derive(Default)]
pub struct MemoryPermissionBackend {
    scopes: RwLock<HashMap<ScopePath, Vec<AccountPermissionEntry>>>,
}

impl MemoryPermissionBackend {
    /// Creates an empty backend
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PermissionBackend for MemoryPermissionBackend {
    async fn load(&self, scope: &ScopePath) -> Result<Vec<AccountPermissionEntry>> {
        let scopes = self.scopes.read().await;
        Ok(scopes.get(scope).cloned().unwrap_or_default())
    }

    async fn store(&self, scope: &ScopePath, entries: Vec<AccountPermissionEntry>) -> Result<()> {
        let mut scopes = self.scopes.write().await;
        if entries.is_empty() {
            // A scope with zero entries is equivalent to no stored record
            scopes.remove(scope);
        } else {
            scopes.insert(scope.clone(), entries);
        }
        Ok(())
    }

    async fn merge(
        &self,
        scope: &ScopePath,
        update: EntryUpdate<'_>,
    ) -> Result<Vec<AccountPermissionEntry>> {
        let mut scopes = self.scopes.write().await;
        let existing = scopes.remove(scope).unwrap_or_default();
        let updated = update(existing);
        if !updated.is_empty() {
            scopes.insert(scope.clone(), updated.clone());
        }
        Ok(updated)
    }

    async fn scopes_under(&self, prefix: &ScopePath) -> Result<Vec<ScopePath>> {
        let scopes = self.scopes.read().await;
        Ok(scopes
            .keys()
            .filter(|s| s.starts_with(prefix))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PermissionSearch for MemoryPermissionBackend {
    async fn search(&self, query: &PermissionQuery) -> Result<Vec<AccountPermissionEntry>> {
        let scopes = self.scopes.read().await;
        Ok(scopes
            .values()
            .flatten()
            .filter(|e| query.matches(e))
            .cloned()
            .collect())
    }
}
