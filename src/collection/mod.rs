//! Permission collection abstraction
//!
//! Two dual views over the same scope-addressed entry storage: an
//! account-bound collection (one `(account, scope)` pair) and a scope-bound
//! collection (one scope, all accounts). Both are generic over a pluggable
//! [`PermissionBackend`]; the in-memory backend is the reference
//! implementation.

mod memory;
mod query;

pub use memory::MemoryPermissionBackend;
pub use query::{PermissionQuery, PermissionSearch, ScopeMatch, TextMatch};

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use std::sync::Arc;

use crate::entry::{AccountPermissionEntry, PermissionEntry};
use crate::error::{PermissionError, Result};
use crate::scope::ScopePath;

/// Entry-list updater applied atomically per scope record
///
/// Durable backends implement this as a merge updater, retried on
/// precondition failure; the in-memory backend applies it under its write
/// lock.
pub type EntryUpdate<'a> =
    &'a (dyn Fn(Vec<AccountPermissionEntry>) -> Vec<AccountPermissionEntry> + Send + Sync);

/// Pluggable persistence backend for raw permission entries
///
/// The contract is per-scope: each scope stores one sequence of entries, and
/// a scope with zero entries is equivalent to a scope with no stored record.
#[async_trait]
pub trait PermissionBackend: Send + Sync {
    /// Returns the raw entries recorded at exactly this scope
    async fn load(&self, scope: &ScopePath) -> Result<Vec<AccountPermissionEntry>>;

    /// Replaces the scope record; an empty list deletes it
    async fn store(&self, scope: &ScopePath, entries: Vec<AccountPermissionEntry>) -> Result<()>;

    /// Atomically reads, transforms, and writes back one scope record,
    /// returning the stored result
    async fn merge(
        &self,
        scope: &ScopePath,
        update: EntryUpdate<'_>,
    ) -> Result<Vec<AccountPermissionEntry>>;

    /// Enumerates scopes with stored records under a prefix (inclusive)
    async fn scopes_under(&self, prefix: &ScopePath) -> Result<Vec<ScopePath>>;
}

/// Collection bound to one `(account, scope)` pair
///
/// All keys in the collection live under that pair; entry scopes are rebased
/// to the bound scope on write. Set/remove on the same key are
/// last-write-wins in call order within one collection instance.
#[async_trait]
pub trait AccountPermissionCollection: Send + Sync {
    /// The bound account id
    fn account_id(&self) -> &str;

    /// The bound scope
    fn scope(&self) -> &ScopePath;

    /// Enumerates the account's entries at the bound scope
    async fn entries(&self) -> Result<Vec<PermissionEntry>>;

    /// Enumerates entries as a stream
    async fn stream(&self) -> Result<BoxStream<'static, PermissionEntry>> {
        Ok(stream::iter(self.entries().await?).boxed())
    }

    /// Batch upsert: replaces entries with matching keys, appends the rest
    async fn set(&self, entries: Vec<PermissionEntry>) -> Result<()>;

    /// Batch removal by key
    async fn remove(&self, keys: &[&str]) -> Result<()>;

    /// Removes every entry of the bound account at the bound scope
    async fn clear(&self) -> Result<()>;

    /// Whether a key exists in this collection
    async fn contains(&self, key: &str) -> Result<bool>;

    /// Looks up one entry; missing keys are an explicit
    /// [`PermissionError::KeyNotFound`]
    async fn get(&self, key: &str) -> Result<PermissionEntry>;
}

/// Collection bound to one scope, spanning all accounts there
#[async_trait]
pub trait ScopePermissionCollection: Send + Sync {
    /// The bound scope
    fn scope(&self) -> &ScopePath;

    /// Enumerates every account's entries at the bound scope
    async fn entries(&self) -> Result<Vec<AccountPermissionEntry>>;

    /// Enumerates entries as a stream
    async fn stream(&self) -> Result<BoxStream<'static, AccountPermissionEntry>> {
        Ok(stream::iter(self.entries().await?).boxed())
    }

    /// Batch upsert keyed by `(account, key)`
    async fn set(&self, entries: Vec<AccountPermissionEntry>) -> Result<()>;

    /// Batch removal by `(account, key)`
    async fn remove(&self, keys: &[(&str, &str)]) -> Result<()>;

    /// Removes the entire scope record
    async fn clear(&self) -> Result<()>;

    /// Whether an `(account, key)` entry exists
    async fn contains(&self, account_id: &str, key: &str) -> Result<bool>;

    /// Looks up one entry; missing entries are an explicit
    /// [`PermissionError::EntryNotFound`]
    async fn get(&self, account_id: &str, key: &str) -> Result<AccountPermissionEntry>;

    /// Returns the per-account sub-collection at the bound scope
    fn for_account(&self, account_id: &str) -> Result<Arc<dyn AccountPermissionCollection>>;
}

/// Account collection over any backend
pub struct BackendAccountCollection {
    backend: Arc<dyn PermissionBackend>,
    account_id: String,
    scope: ScopePath,
}

impl BackendAccountCollection {
    /// Binds a collection to one `(account, scope)` pair
    pub fn new(
        backend: Arc<dyn PermissionBackend>,
        account_id: impl Into<String>,
        scope: ScopePath,
    ) -> Result<Self> {
        let account_id = account_id.into();
        if account_id.is_empty() {
            return Err(PermissionError::EmptyAccountId);
        }
        Ok(Self {
            backend,
            account_id,
            scope,
        })
    }
}

#[async_trait]
impl AccountPermissionCollection for BackendAccountCollection {
    fn account_id(&self) -> &str {
        &self.account_id
    }

    fn scope(&self) -> &ScopePath {
        &self.scope
    }

    async fn entries(&self) -> Result<Vec<PermissionEntry>> {
        Ok(self
            .backend
            .load(&self.scope)
            .await?
            .into_iter()
            .filter(|e| e.account_id == self.account_id)
            .map(|e| e.entry)
            .collect())
    }

    async fn set(&self, entries: Vec<PermissionEntry>) -> Result<()> {
        let incoming: Vec<AccountPermissionEntry> = entries
            .into_iter()
            .map(|e| AccountPermissionEntry {
                account_id: self.account_id.clone(),
                entry: e.rebased(&self.scope),
            })
            .collect();

        let account_id = self.account_id.clone();
        self.backend
            .merge(&self.scope, &move |mut existing| {
                for entry in incoming.iter().cloned() {
                    match existing.iter_mut().find(|b| {
                        b.account_id == account_id && b.entry.key == entry.entry.key
                    }) {
                        Some(slot) => *slot = entry,
                        None => existing.push(entry),
                    }
                }
                existing
            })
            .await?;
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> Result<()> {
        let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        let account_id = self.account_id.clone();
        self.backend
            .merge(&self.scope, &move |mut existing| {
                existing.retain(|e| {
                    e.account_id != account_id || !keys.iter().any(|k| *k == e.entry.key)
                });
                existing
            })
            .await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let account_id = self.account_id.clone();
        self.backend
            .merge(&self.scope, &move |mut existing| {
                existing.retain(|e| e.account_id != account_id);
                existing
            })
            .await?;
        Ok(())
    }

    async fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.entries().await?.iter().any(|e| e.key == key))
    }

    async fn get(&self, key: &str) -> Result<PermissionEntry> {
        self.entries()
            .await?
            .into_iter()
            .find(|e| e.key == key)
            .ok_or_else(|| PermissionError::KeyNotFound(key.to_string()))
    }
}

/// Scope collection over any backend
pub struct BackendScopeCollection {
    backend: Arc<dyn PermissionBackend>,
    scope: ScopePath,
}

impl BackendScopeCollection {
    /// Binds a collection to one scope
    pub fn new(backend: Arc<dyn PermissionBackend>, scope: ScopePath) -> Self {
        Self { backend, scope }
    }
}

#[async_trait]
impl ScopePermissionCollection for BackendScopeCollection {
    fn scope(&self) -> &ScopePath {
        &self.scope
    }

    async fn entries(&self) -> Result<Vec<AccountPermissionEntry>> {
        self.backend.load(&self.scope).await
    }

    async fn set(&self, entries: Vec<AccountPermissionEntry>) -> Result<()> {
        let incoming: Vec<AccountPermissionEntry> = entries
            .into_iter()
            .map(|mut e| {
                e.entry = e.entry.rebased(&self.scope);
                e
            })
            .collect();

        self.backend
            .merge(&self.scope, &move |mut existing| {
                for entry in incoming.iter().cloned() {
                    match existing.iter_mut().find(|b| {
                        b.account_id == entry.account_id && b.entry.key == entry.entry.key
                    }) {
                        Some(slot) => *slot = entry,
                        None => existing.push(entry),
                    }
                }
                existing
            })
            .await?;
        Ok(())
    }

    async fn remove(&self, keys: &[(&str, &str)]) -> Result<()> {
        let keys: Vec<(String, String)> = keys
            .iter()
            .map(|(a, k)| (a.to_string(), k.to_string()))
            .collect();
        self.backend
            .merge(&self.scope, &move |mut existing| {
                existing.retain(|e| {
                    !keys
                        .iter()
                        .any(|(a, k)| *a == e.account_id && *k == e.entry.key)
                });
                existing
            })
            .await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.backend.store(&self.scope, Vec::new()).await
    }

    async fn contains(&self, account_id: &str, key: &str) -> Result<bool> {
        Ok(self
            .entries()
            .await?
            .iter()
            .any(|e| e.account_id == account_id && e.entry.key == key))
    }

    async fn get(&self, account_id: &str, key: &str) -> Result<AccountPermissionEntry> {
        self.entries()
            .await?
            .into_iter()
            .find(|e| e.account_id == account_id && e.entry.key == key)
            .ok_or_else(|| PermissionError::EntryNotFound {
                account: account_id.to_string(),
                key: key.to_string(),
            })
    }

    fn for_account(&self, account_id: &str) -> Result<Arc<dyn AccountPermissionCollection>> {
        Ok(Arc::new(BackendAccountCollection::new(
            Arc::clone(&self.backend),
            account_id,
            self.scope.clone(),
        )?))
    }
}
