//! # scopegate
//!
//! Hierarchical, scope-based access-control engine. For an account and a
//! permission key, it answers whether access is allowed at a point in a
//! tree-shaped namespace: the most specific ancestor scope with an explicit
//! decision wins. It also computes effective views (the flattened set of
//! active permissions at a scope) and protects a resource store behind a
//! read-through permission cache with cascading invalidation.
//!
//! ## Features
//!
//! - **Normalized scope addressing** with hierarchy traversal and ancestor
//!   ordering operators
//! - **Most-specific-scope-wins resolution** with an "all accounts" wildcard
//! - **Pluggable entry storage** behind account- and scope-bound collections
//! - **Read-through merged-permission cache** with sliding expiration and
//!   cascading invalidation
//! - **Protected resource store** decorator enforcing read/write/ACL keys
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use scopegate::collection::{
//!     BackendScopeCollection, MemoryPermissionBackend, PermissionBackend,
//!     ScopePermissionCollection,
//! };
//! use scopegate::{resolve_value, AccountPermissionEntry, PermissionEntry,
//!     PermissionValue, ScopePath};
//!
//! #[tokio::main]
//! async fn main() -> scopegate::Result<()> {
//!     let backend: Arc<dyn PermissionBackend> = Arc::new(MemoryPermissionBackend::new());
//!
//!     let org = BackendScopeCollection::new(Arc::clone(&backend), ScopePath::parse("/org"));
//!     org.set(vec![AccountPermissionEntry::new(
//!         "acct1",
//!         PermissionEntry::new(ScopePath::parse("/org"), "read", PermissionValue::Allow)?,
//!     )?])
//!     .await?;
//!
//!     // Entries at /org govern everything beneath it
//!     let entries = backend.load(&ScopePath::parse("/org")).await?;
//!     let value = resolve_value(&entries, &ScopePath::parse("/org/proj"), "acct1", "read");
//!     assert_eq!(value, PermissionValue::Allow);
//!
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod collection;
pub mod entry;
pub mod error;
pub mod resolve;
pub mod scope;
pub mod store;

// Re-export commonly used types
pub use cache::{
    BackendPermissionSource, CacheStats, PermissionCache, PermissionCacheConfig, PermissionSource,
};
pub use entry::{
    AccountPermissionEntry, PermissionEntry, PermissionValue, ResourcePermissions,
    WILDCARD_ACCOUNT,
};
pub use error::{PermissionError, Result};
pub use resolve::{resolve_key_value, resolve_key_view, resolve_value, resolve_view};
pub use scope::ScopePath;
pub use store::{
    MemoryResourceStore, ProtectedResourceStore, ResourcePayload, ResourceRecord, ResourceStore,
    CAN_READ_DATA, CAN_READ_PERMISSIONS, CAN_WRITE_DATA, CAN_WRITE_PERMISSIONS,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
