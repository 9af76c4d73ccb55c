//! Read-through cache of merged, ancestor-aggregated permission sets
//!
//! Protects a resource store from repeated ancestor-chain walks. Entries use
//! sliding expiration and are invalidated explicitly; invalidation cascades
//! to every cached descendant of the written resource.

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::collection::PermissionBackend;
use crate::entry::{AccountPermissionEntry, ResourcePermissions};
use crate::error::Result;
use crate::resolve::merge_overlay;
use crate::scope::ScopePath;

/// Source of raw (unmerged) permission entries for one scope
#[async_trait]
pub trait PermissionSource: Send + Sync {
    /// Returns the entries recorded at exactly this scope (empty when none)
    async fn raw_permissions(&self, scope: &ScopePath) -> Result<Vec<AccountPermissionEntry>>;
}

/// Adapter exposing any [`PermissionBackend`] as a cache source
pub struct BackendPermissionSource {
    backend: Arc<dyn PermissionBackend>,
}

impl BackendPermissionSource {
    pub fn new(backend: Arc<dyn PermissionBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl PermissionSource for BackendPermissionSource {
    async fn raw_permissions(&self, scope: &ScopePath) -> Result<Vec<AccountPermissionEntry>> {
        self.backend.load(scope).await
    }
}

/// Cache configuration
#[derive(Debug, Clone)]
pub struct PermissionCacheConfig {
    /// Maximum number of cached resource ids
    pub capacity: usize,

    /// Sliding time-to-live: a hit refreshes the entry's lifetime
    pub ttl: Duration,
}

impl Default for PermissionCacheConfig {
    fn default() -> Self {
        Self {
            capacity: 10_000,
            ttl: Duration::from_secs(60),
        }
    }
}

/// Cached merged set with its last access time
struct CachedPermissions {
    merged: ResourcePermissions,
    last_access: Instant,
}

/// Cache statistics
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: usize,
    /// Number of cache misses
    pub misses: usize,
    /// Number of expired entries encountered
    pub expirations: usize,
    /// Current number of cached resource ids
    pub entries: usize,
}

impl CacheStats {
    /// Calculates the cache hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Read-through, sliding-expiration cache of merged permission sets
///
/// On a miss the cache walks the resource's ancestor chain root-to-leaf,
/// fetches each ancestor's raw set from the source, and merges them so a
/// deeper ancestor's entry replaces a shallower one for the same
/// `(account, key)`. The entry is populated only after the full walk
/// succeeds; source errors propagate and are never cached.
///
/// The key-tracking side index is mutated under one mutex shared with
/// population and eviction; the cache map itself locks per key.
pub struct PermissionCache {
    source: Arc<dyn PermissionSource>,
    entries: DashMap<ScopePath, CachedPermissions>,
    tracked: Mutex<HashSet<ScopePath>>,
    config: PermissionCacheConfig,
    stats: DashMap<String, usize>,
}

impl PermissionCache {
    /// Creates a cache with the default configuration
    pub fn new(source: Arc<dyn PermissionSource>) -> Self {
        Self::with_config(source, PermissionCacheConfig::default())
    }

    /// Creates a cache with a custom configuration
    pub fn with_config(source: Arc<dyn PermissionSource>, config: PermissionCacheConfig) -> Self {
        Self {
            source,
            entries: DashMap::new(),
            tracked: Mutex::new(HashSet::new()),
            config,
            stats: DashMap::new(),
        }
    }

    /// Returns the merged permission set for a resource
    ///
    /// An empty result means no ancestor recorded any permission for the
    /// resource (the resource has no ACL at all).
    pub async fn get(&self, resource: &ScopePath) -> Result<ResourcePermissions> {
        let mut expired = false;
        if let Some(mut cached) = self.entries.get_mut(resource) {
            if cached.last_access.elapsed() > self.config.ttl {
                expired = true;
            } else {
                cached.last_access = Instant::now();
                self.increment_stat("hits");
                return Ok(cached.merged.clone());
            }
        }

        if expired {
            let mut tracked = self.tracked.lock();
            self.entries.remove(resource);
            tracked.remove(resource);
            self.increment_stat("expirations");
        } else {
            self.increment_stat("misses");
        }

        // Full ancestor walk first; nothing is cached until it succeeds
        let merged = self.load_merged(resource).await?;

        {
            let mut tracked = self.tracked.lock();
            if self.entries.len() >= self.config.capacity {
                self.evict_oldest_locked(&mut tracked);
            }
            self.entries.insert(
                resource.clone(),
                CachedPermissions {
                    merged: merged.clone(),
                    last_access: Instant::now(),
                },
            );
            tracked.insert(resource.clone());
        }

        debug!(resource = %resource, entries = merged.entries.len(), "permission cache populated");
        Ok(merged)
    }

    /// Evicts a resource and every cached descendant of it
    ///
    /// Writing permissions anywhere in a subtree invalidates every cached
    /// merged set that depended on the written scope.
    pub fn reset(&self, resource: &ScopePath) {
        let mut tracked = self.tracked.lock();
        let victims: Vec<ScopePath> = tracked
            .iter()
            .filter(|key| key.starts_with(resource))
            .cloned()
            .collect();

        for key in &victims {
            self.entries.remove(key);
            tracked.remove(key);
        }

        debug!(resource = %resource, evicted = victims.len(), "permission cache invalidated");
    }

    /// Drops every cached entry and all statistics
    pub fn clear(&self) {
        let mut tracked = self.tracked.lock();
        self.entries.clear();
        tracked.clear();
        self.stats.clear();
    }

    /// Returns cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.get_stat("hits"),
            misses: self.get_stat("misses"),
            expirations: self.get_stat("expirations"),
            entries: self.entries.len(),
        }
    }

    /// Current number of cached resource ids
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    async fn load_merged(&self, resource: &ScopePath) -> Result<ResourcePermissions> {
        let mut merged = Vec::new();
        for ancestor in resource.hierarchy_ascending(false) {
            let raw = self.source.raw_permissions(&ancestor).await?;
            merge_overlay(&mut merged, raw);
        }
        Ok(ResourcePermissions {
            resource: resource.clone(),
            entries: merged,
        })
    }

    /// Removes the oldest ~10% of entries by last access. Caller holds the
    /// tracked-key lock.
    fn evict_oldest_locked(&self, tracked: &mut HashSet<ScopePath>) {
        let mut by_age: Vec<(ScopePath, Instant)> = self
            .entries
            .iter()
            .map(|e| (e.key().clone(), e.value().last_access))
            .collect();
        by_age.sort_by_key(|(_, accessed)| *accessed);

        let to_remove = (self.config.capacity / 10).max(1);
        for (key, _) in by_age.into_iter().take(to_remove) {
            self.entries.remove(&key);
            tracked.remove(&key);
        }
    }

    fn increment_stat(&self, key: &str) {
        self.stats
            .entry(key.to_string())
            .and_modify(|count| *count += 1)
            .or_insert(1);
    }

    fn get_stat(&self, key: &str) -> usize {
        self.stats.get(key).map(|v| *v).unwrap_or(0)
    }
}
