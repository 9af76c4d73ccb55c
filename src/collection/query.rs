//! Cross-cutting permission search
//!
//! A query is a conjunction of optional filters over raw entries. Backends
//! are not assumed to have any native query capability; the reference
//! implementation is a pure in-memory filter.

use async_trait::async_trait;

use crate::entry::{AccountPermissionEntry, PermissionValue};
use crate::error::Result;
use crate::scope::ScopePath;

/// Text filter for permission keys
#[derive(Debug, Clone)]
pub enum TextMatch {
    Exact(String),
    Prefix(String),
    Suffix(String),
}

impl TextMatch {
    fn matches(&self, value: &str) -> bool {
        match self {
            TextMatch::Exact(t) => value == t,
            TextMatch::Prefix(t) => value.starts_with(t.as_str()),
            TextMatch::Suffix(t) => value.ends_with(t.as_str()),
        }
    }
}

/// Scope filter, segment-wise
#[derive(Debug, Clone)]
pub enum ScopeMatch {
    Exact(ScopePath),
    /// Scopes under a prefix (inclusive); `immediate_children_only` narrows
    /// to scopes of rank `prefix.rank() + 1`
    Prefix {
        prefix: ScopePath,
        immediate_children_only: bool,
    },
    Suffix(ScopePath),
}

impl ScopeMatch {
    fn matches(&self, scope: &ScopePath) -> bool {
        match self {
            ScopeMatch::Exact(p) => scope == p,
            ScopeMatch::Prefix {
                prefix,
                immediate_children_only,
            } => {
                scope.starts_with(prefix)
                    && (!immediate_children_only || scope.rank() == prefix.rank() + 1)
            }
            ScopeMatch::Suffix(p) => scope.ends_with(p),
        }
    }
}

/// Conjunctive filter over raw permission entries
///
/// Every supplied filter must match for an entry to survive; an empty query
/// matches everything.
///
/// # Examples
///
/// ```
/// use scopegate::collection::PermissionQuery;
/// use scopegate::scope::ScopePath;
///
/// let query = PermissionQuery::new()
///     .with_account("acct1")
///     .with_key_prefix("can_")
///     .under_scope(ScopePath::parse("/org"), false);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PermissionQuery {
    account: Option<String>,
    key: Option<TextMatch>,
    scope: Option<ScopeMatch>,
    value: Option<PermissionValue>,
    metadata: Vec<(String, String)>,
}

impl PermissionQuery {
    /// An empty query matching every entry
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by exact account id
    pub fn with_account(mut self, account_id: impl Into<String>) -> Self {
        self.account = Some(account_id.into());
        self
    }

    /// Filter by exact key
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(TextMatch::Exact(key.into()));
        self
    }

    /// Filter by key prefix
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key = Some(TextMatch::Prefix(prefix.into()));
        self
    }

    /// Filter by key suffix
    pub fn with_key_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.key = Some(TextMatch::Suffix(suffix.into()));
        self
    }

    /// Filter by exact scope
    pub fn at_scope(mut self, scope: ScopePath) -> Self {
        self.scope = Some(ScopeMatch::Exact(scope));
        self
    }

    /// Filter by scope prefix, optionally immediate children only
    pub fn under_scope(mut self, prefix: ScopePath, immediate_children_only: bool) -> Self {
        self.scope = Some(ScopeMatch::Prefix {
            prefix,
            immediate_children_only,
        });
        self
    }

    /// Filter by scope suffix
    pub fn with_scope_suffix(mut self, suffix: ScopePath) -> Self {
        self.scope = Some(ScopeMatch::Suffix(suffix));
        self
    }

    /// Filter by the entry's explicit value
    pub fn with_value(mut self, value: PermissionValue) -> Self {
        self.value = Some(value);
        self
    }

    /// Require a metadata pair (repeatable; all pairs must be present)
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push((key.into(), value.into()));
        self
    }

    /// Applies every supplied filter conjunctively
    pub fn matches(&self, entry: &AccountPermissionEntry) -> bool {
        if let Some(account) = &self.account {
            if entry.account_id != *account {
                return false;
            }
        }
        if let Some(key) = &self.key {
            if !key.matches(&entry.entry.key) {
                return false;
            }
        }
        if let Some(scope) = &self.scope {
            if !scope.matches(&entry.entry.scope) {
                return false;
            }
        }
        if let Some(value) = &self.value {
            if entry.entry.value != *value {
                return false;
            }
        }
        self.metadata
            .iter()
            .all(|(k, v)| entry.entry.metadata.get(k) == Some(v))
    }
}

/// Cross-cutting search over every stored entry
#[async_trait]
pub trait PermissionSearch: Send + Sync {
    /// Returns all entries matching the query
    async fn search(&self, query: &PermissionQuery) -> Result<Vec<AccountPermissionEntry>>;
}
