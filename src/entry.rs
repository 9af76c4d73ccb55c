//! Permission entry value objects

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{PermissionError, Result};
use crate::scope::ScopePath;

/// Reserved account id meaning "every account without a more specific entry"
pub const WILDCARD_ACCOUNT: &str = "*";

/// Three-state permission value
///
/// `Unset` means "no explicit decision at this scope" and is never a terminal
/// resolution result on its own: it signals "consult the ancestor chain" or,
/// from the resolver, "no decision anywhere".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionValue {
    /// No explicit decision
    #[default]
    Unset,
    /// Access granted
    Allow,
    /// Access denied
    Deny,
}

impl PermissionValue {
    /// Whether this value is a terminal decision (Allow or Deny)
    pub fn is_explicit(&self) -> bool {
        !matches!(self, PermissionValue::Unset)
    }
}

/// A single permission decision attached to a scope
///
/// Metadata is an unordered string map used only for filtering; it never
/// affects resolution precedence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionEntry {
    /// Scope the decision is attached to
    pub scope: ScopePath,

    /// Permission key (non-empty)
    pub key: String,

    /// Decision value
    pub value: PermissionValue,

    /// Filter-only metadata
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl PermissionEntry {
    /// Creates an entry, rejecting empty keys
    pub fn new(scope: ScopePath, key: impl Into<String>, value: PermissionValue) -> Result<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(PermissionError::EmptyKey);
        }
        Ok(Self {
            scope,
            key,
            value,
            metadata: HashMap::new(),
        })
    }

    /// Adds a metadata pair
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Returns a copy of this entry reattached to another scope
    pub(crate) fn rebased(mut self, scope: &ScopePath) -> Self {
        self.scope = scope.clone();
        self
    }
}

/// An account-qualified permission entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountPermissionEntry {
    /// Owning account id, or [`WILDCARD_ACCOUNT`]
    pub account_id: String,

    /// The underlying entry
    pub entry: PermissionEntry,
}

impl AccountPermissionEntry {
    /// Creates an account-qualified entry, rejecting empty account ids
    pub fn new(account_id: impl Into<String>, entry: PermissionEntry) -> Result<Self> {
        let account_id = account_id.into();
        if account_id.is_empty() {
            return Err(PermissionError::EmptyAccountId);
        }
        Ok(Self { account_id, entry })
    }

    /// Creates a wildcard ("all accounts") entry
    pub fn wildcard(entry: PermissionEntry) -> Self {
        Self {
            account_id: WILDCARD_ACCOUNT.to_string(),
            entry,
        }
    }

    /// Convenience: wildcard Allow for a key at a scope
    pub fn allow_all(scope: ScopePath, key: impl Into<String>) -> Result<Self> {
        Ok(Self::wildcard(PermissionEntry::new(
            scope,
            key,
            PermissionValue::Allow,
        )?))
    }

    /// Convenience: wildcard Deny for a key at a scope
    pub fn deny_all(scope: ScopePath, key: impl Into<String>) -> Result<Self> {
        Ok(Self::wildcard(PermissionEntry::new(
            scope,
            key,
            PermissionValue::Deny,
        )?))
    }

    /// Whether this entry is the wildcard form
    pub fn is_wildcard(&self) -> bool {
        self.account_id == WILDCARD_ACCOUNT
    }

    /// Whether this entry applies to the given account
    pub fn applies_to(&self, account_id: &str) -> bool {
        self.account_id == account_id || self.is_wildcard()
    }
}

/// Merged, ancestor-aggregated permission set for one resource
///
/// The cache value type: an ordered `(account, entry)` list where a deeper
/// ancestor's entry has already replaced any shallower entry for the same
/// `(account, key)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePermissions {
    /// Resource the set was merged for
    pub resource: ScopePath,

    /// Merged entries, shallowest-first insertion order
    pub entries: Vec<AccountPermissionEntry>,
}

impl ResourcePermissions {
    /// An empty set for a resource with no recorded permissions
    pub fn empty(resource: ScopePath) -> Self {
        Self {
            resource,
            entries: Vec::new(),
        }
    }

    /// Whether no ancestor recorded any permission
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves the effective value for an account and key at this resource
    pub fn resolve(&self, account_id: &str, key: &str) -> PermissionValue {
        crate::resolve::resolve_value(&self.entries, &self.resource, account_id, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_rejects_empty_key() {
        let result = PermissionEntry::new(ScopePath::parse("/org"), "", PermissionValue::Allow);
        assert!(matches!(result, Err(PermissionError::EmptyKey)));
    }

    #[test]
    fn test_entry_metadata_builder() {
        let entry = PermissionEntry::new(ScopePath::parse("/org"), "read", PermissionValue::Allow)
            .unwrap()
            .with_metadata("source", "bootstrap");
        assert_eq!(entry.metadata.get("source"), Some(&"bootstrap".to_string()));
    }

    #[test]
    fn test_account_entry_rejects_empty_account() {
        let entry =
            PermissionEntry::new(ScopePath::parse("/org"), "read", PermissionValue::Allow).unwrap();
        let result = AccountPermissionEntry::new("", entry);
        assert!(matches!(result, Err(PermissionError::EmptyAccountId)));
    }

    #[test]
    fn test_wildcard_entry() {
        let entry = AccountPermissionEntry::allow_all(ScopePath::parse("/org"), "read").unwrap();
        assert!(entry.is_wildcard());
        assert!(entry.applies_to("acct1"));
        assert!(entry.applies_to("anyone"));

        let specific = AccountPermissionEntry::new(
            "acct1",
            PermissionEntry::new(ScopePath::parse("/org"), "read", PermissionValue::Deny).unwrap(),
        )
        .unwrap();
        assert!(!specific.is_wildcard());
        assert!(specific.applies_to("acct1"));
        assert!(!specific.applies_to("acct2"));
    }

    #[test]
    fn test_serde_round_trip() {
        let entry = AccountPermissionEntry::new(
            "acct1",
            PermissionEntry::new(ScopePath::parse("/org"), "read", PermissionValue::Allow)
                .unwrap()
                .with_metadata("origin", "test"),
        )
        .unwrap();

        let json = serde_json::to_string(&entry).unwrap();
        let back: AccountPermissionEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
