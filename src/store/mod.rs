//! Resource store abstraction and protection
//!
//! A resource store keeps typed payloads keyed by `ScopePath`, each carrying
//! its own permission list. [`ProtectedResourceStore`] decorates any store so
//! that every operation is authorized against the merged ancestor permission
//! set first.

mod memory;
mod protected;

pub use memory::MemoryResourceStore;
pub use protected::{ProtectedResourceStore, StorePermissionSource};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::entry::AccountPermissionEntry;
use crate::error::Result;
use crate::scope::ScopePath;

/// Permission key gating resource data reads
pub const CAN_READ_DATA: &str = "can_read_data";
/// Permission key gating resource data writes and deletes
pub const CAN_WRITE_DATA: &str = "can_write_data";
/// Permission key gating visibility of a resource's permission list
pub const CAN_READ_PERMISSIONS: &str = "can_read_permissions";
/// Permission key gating changes to a resource's permission list
pub const CAN_WRITE_PERMISSIONS: &str = "can_write_permissions";

/// Contract for typed payloads stored in a [`ResourceRecord`]
///
/// The kind tag is declared explicitly by the payload type; there is no
/// runtime type registry.
pub trait ResourcePayload: Serialize + DeserializeOwned {
    /// Kind tag used by `children` queries
    const KIND: &'static str;
}

/// One stored resource: id, kind tag, ACL, and payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// Resource address
    pub id: ScopePath,

    /// Kind tag (see [`ResourcePayload::KIND`])
    pub kind: String,

    /// Permission entries attached to this resource
    #[serde(default)]
    pub permissions: Vec<AccountPermissionEntry>,

    /// Payload data
    #[serde(default)]
    pub data: serde_json::Value,
}

impl ResourceRecord {
    /// Creates an empty record
    pub fn new(id: ScopePath, kind: impl Into<String>) -> Self {
        Self {
            id,
            kind: kind.into(),
            permissions: Vec::new(),
            data: serde_json::Value::Null,
        }
    }

    /// Creates a record from a typed payload
    pub fn from_payload<T: ResourcePayload>(id: ScopePath, payload: &T) -> Result<Self> {
        Ok(Self {
            id,
            kind: T::KIND.to_string(),
            permissions: Vec::new(),
            data: serde_json::to_value(payload)?,
        })
    }

    /// Decodes the payload as a typed value
    pub fn payload<T: ResourcePayload>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.data.clone())?)
    }

    /// Attaches a permission list
    pub fn with_permissions(mut self, permissions: Vec<AccountPermissionEntry>) -> Self {
        self.permissions = permissions;
        self
    }
}

/// Raw resource store: get/set/delete/exists/children keyed by `ScopePath`
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Returns the record at an id, if any
    async fn get(&self, id: &ScopePath) -> Result<Option<ResourceRecord>>;

    /// Inserts or replaces a record
    async fn set(&self, record: ResourceRecord) -> Result<()>;

    /// Removes a record; removing a missing record is a no-op
    async fn delete(&self, id: &ScopePath) -> Result<()>;

    /// Whether a record exists at an id
    async fn exists(&self, id: &ScopePath) -> Result<bool>;

    /// Returns the immediate children of an id with a matching kind tag
    async fn children(&self, id: &ScopePath, kind: &str) -> Result<Vec<ResourceRecord>>;
}
