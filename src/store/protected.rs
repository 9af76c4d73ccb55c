//! Permission-checked decorator over a raw resource store

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{
    ResourceRecord, ResourceStore, CAN_READ_DATA, CAN_READ_PERMISSIONS, CAN_WRITE_DATA,
    CAN_WRITE_PERMISSIONS,
};
use crate::cache::{PermissionCache, PermissionCacheConfig, PermissionSource};
use crate::entry::{AccountPermissionEntry, PermissionValue};
use crate::error::{PermissionError, Result};
use crate::scope::ScopePath;

/// Cache source that reads each scope's raw ACL from a resource store
pub struct StorePermissionSource {
    inner: Arc<dyn ResourceStore>,
}

impl StorePermissionSource {
    pub fn new(inner: Arc<dyn ResourceStore>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl PermissionSource for StorePermissionSource {
    async fn raw_permissions(&self, scope: &ScopePath) -> Result<Vec<AccountPermissionEntry>> {
        Ok(self
            .inner
            .get(scope)
            .await?
            .map(|record| record.permissions)
            .unwrap_or_default())
    }
}

/// Decorator that authorizes every operation against the merged ancestor
/// permission set before delegating to the inner store
///
/// A resource with no recorded permissions at any ancestor allows every
/// operation: the first writer wins and is expected to claim the resource by
/// attaching an ACL. Reads by callers without ACL visibility succeed with the
/// permission list stripped rather than failing outright.
pub struct ProtectedResourceStore {
    inner: Arc<dyn ResourceStore>,
    cache: PermissionCache,
}

impl ProtectedResourceStore {
    /// Decorates a store using the default cache configuration
    pub fn new(inner: Arc<dyn ResourceStore>) -> Self {
        Self::with_config(inner, PermissionCacheConfig::default())
    }

    /// Decorates a store with a custom cache configuration
    pub fn with_config(inner: Arc<dyn ResourceStore>, config: PermissionCacheConfig) -> Self {
        let source = Arc::new(StorePermissionSource::new(Arc::clone(&inner)));
        Self {
            inner,
            cache: PermissionCache::with_config(source, config),
        }
    }

    /// The permission cache protecting the inner store
    pub fn cache(&self) -> &PermissionCache {
        &self.cache
    }

    /// Whether `account` holds `permission` at `id`
    ///
    /// Resolution runs over the cached merged ancestor set, so wildcard
    /// entries apply with specific-account precedence. An empty merged set
    /// means the resource has no ownership recorded anywhere and the
    /// operation is allowed.
    pub async fn is_permitted(&self, account: &str, id: &ScopePath, permission: &str) -> Result<bool> {
        let merged = self.cache.get(id).await?;
        if merged.is_empty() {
            debug!(account, resource = %id, "no ACL recorded; first writer wins");
            return Ok(true);
        }
        Ok(merged.resolve(account, permission) == PermissionValue::Allow)
    }

    async fn ensure(&self, account: &str, id: &ScopePath, permission: &str) -> Result<()> {
        if self.is_permitted(account, id, permission).await? {
            Ok(())
        } else {
            warn!(account, resource = %id, permission, "operation denied");
            Err(PermissionError::NotPermitted {
                account: account.to_string(),
                permission: permission.to_string(),
                resource: id.clone(),
            })
        }
    }

    /// Reads a record; requires `can_read_data`
    ///
    /// Without `can_read_permissions` the returned record's permission list
    /// is stripped.
    pub async fn get(&self, account: &str, id: &ScopePath) -> Result<Option<ResourceRecord>> {
        self.ensure(account, id, CAN_READ_DATA).await?;

        let Some(mut record) = self.inner.get(id).await? else {
            return Ok(None);
        };
        if !self.is_permitted(account, id, CAN_READ_PERMISSIONS).await? {
            record.permissions.clear();
        }
        Ok(Some(record))
    }

    /// Writes a record; requires `can_write_data`
    ///
    /// A record carrying permission entries additionally requires
    /// `can_write_permissions` and invalidates the cache for its subtree. A
    /// record without permission entries preserves the stored ACL.
    pub async fn set(&self, account: &str, record: ResourceRecord) -> Result<()> {
        self.ensure(account, &record.id, CAN_WRITE_DATA).await?;

        let id = record.id.clone();
        let mut record = record;

        if record.permissions.is_empty() {
            if let Some(existing) = self.inner.get(&id).await? {
                record.permissions = existing.permissions;
            }
            self.inner.set(record).await
        } else {
            self.ensure(account, &id, CAN_WRITE_PERMISSIONS).await?;
            for entry in &mut record.permissions {
                entry.entry.scope = id.clone();
            }
            self.inner.set(record).await?;
            self.cache.reset(&id);
            Ok(())
        }
    }

    /// Deletes a record; requires `can_write_data`
    pub async fn delete(&self, account: &str, id: &ScopePath) -> Result<()> {
        self.ensure(account, id, CAN_WRITE_DATA).await?;
        self.inner.delete(id).await?;
        self.cache.reset(id);
        Ok(())
    }

    /// Whether a record exists; requires `can_read_data`
    pub async fn exists(&self, account: &str, id: &ScopePath) -> Result<bool> {
        self.ensure(account, id, CAN_READ_DATA).await?;
        self.inner.exists(id).await
    }

    /// Lists immediate children of a kind; requires `can_read_data` at the
    /// parent, and strips each child's ACL the caller may not see
    pub async fn children(
        &self,
        account: &str,
        id: &ScopePath,
        kind: &str,
    ) -> Result<Vec<ResourceRecord>> {
        self.ensure(account, id, CAN_READ_DATA).await?;

        let mut children = self.inner.children(id, kind).await?;
        for child in &mut children {
            if !self
                .is_permitted(account, &child.id, CAN_READ_PERMISSIONS)
                .await?
            {
                child.permissions.clear();
            }
        }
        Ok(children)
    }

    /// Reads a resource's own permission list; requires
    /// `can_read_permissions` and an existing record
    pub async fn permissions(
        &self,
        account: &str,
        id: &ScopePath,
    ) -> Result<Vec<AccountPermissionEntry>> {
        self.ensure(account, id, CAN_READ_PERMISSIONS).await?;
        let record = self
            .inner
            .get(id)
            .await?
            .ok_or_else(|| PermissionError::ResourceNotFound(id.clone()))?;
        Ok(record.permissions)
    }

    /// Replaces a resource's permission list; requires
    /// `can_write_permissions`, invalidates the cache before returning
    pub async fn set_permissions(
        &self,
        account: &str,
        id: &ScopePath,
        permissions: Vec<AccountPermissionEntry>,
    ) -> Result<()> {
        self.ensure(account, id, CAN_WRITE_PERMISSIONS).await?;

        let mut record = self
            .inner
            .get(id)
            .await?
            .ok_or_else(|| PermissionError::ResourceNotFound(id.clone()))?;
        record.permissions = permissions;
        for entry in &mut record.permissions {
            entry.entry.scope = id.clone();
        }

        self.inner.set(record).await?;
        self.cache.reset(id);
        Ok(())
    }
}
