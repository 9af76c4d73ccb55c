//! Pure resolution and view computation
//!
//! Resolution answers one question: for a scope, an account, and a key, what
//! is the effective value given a set of raw entries? The most specific
//! (deepest) ancestor-or-equal scope with an explicit entry wins. These
//! functions never suspend and never fail on missing entries.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::entry::{AccountPermissionEntry, PermissionEntry, PermissionValue};
use crate::scope::ScopePath;

/// Computes the effective value for `(scope, account_id, key)`
///
/// Entries survive the filter when their scope is an ancestor-or-equal of
/// `scope`, their key matches exactly, and their account matches exactly or
/// is the wildcard. Among survivors the deepest scope wins; at equal rank a
/// specific-account entry beats the wildcard, and otherwise the
/// last-applicable entry wins.
///
/// Returns `PermissionValue::Unset` when no entry applies.
pub fn resolve_value(
    entries: &[AccountPermissionEntry],
    scope: &ScopePath,
    account_id: &str,
    key: &str,
) -> PermissionValue {
    let mut winner: Option<&AccountPermissionEntry> = None;

    for candidate in entries {
        if candidate.entry.key != key
            || !candidate.applies_to(account_id)
            || !(candidate.entry.scope <= *scope)
        {
            continue;
        }

        winner = Some(match winner {
            None => candidate,
            Some(current) => {
                if supersedes(candidate, current) {
                    candidate
                } else {
                    current
                }
            }
        });
    }

    winner.map(|e| e.entry.value).unwrap_or_default()
}

/// Tie-break rule: deeper rank wins; at equal rank a specific account beats
/// the wildcard; otherwise the later-applied entry wins.
fn supersedes(challenger: &AccountPermissionEntry, current: &AccountPermissionEntry) -> bool {
    match challenger
        .entry
        .scope
        .rank()
        .cmp(&current.entry.scope.rank())
    {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => !(challenger.is_wildcard() && !current.is_wildcard()),
    }
}

/// Computes the flattened effective view at a scope
///
/// One output entry per distinct `(account, key)` pair visible in the
/// ancestor-or-equal entry set, including pairs that resolve to `Unset`
/// (callers filter further if they only want terminal decisions). Output
/// entries are attached to the queried scope and carry the winning entry's
/// metadata; ordering is deterministic (sorted by account, then key).
pub fn resolve_view(entries: &[AccountPermissionEntry], scope: &ScopePath) -> Vec<AccountPermissionEntry> {
    let applicable: Vec<&AccountPermissionEntry> = entries
        .iter()
        .filter(|e| e.entry.scope <= *scope)
        .collect();

    let accounts: BTreeSet<&str> = applicable.iter().map(|e| e.account_id.as_str()).collect();
    let keys: BTreeSet<&str> = applicable.iter().map(|e| e.entry.key.as_str()).collect();

    let mut view = Vec::with_capacity(accounts.len() * keys.len());
    for account in &accounts {
        for key in &keys {
            let mut winner: Option<&AccountPermissionEntry> = None;
            for candidate in &applicable {
                if candidate.entry.key != *key || !candidate.applies_to(account) {
                    continue;
                }
                winner = Some(match winner {
                    None => candidate,
                    Some(current) => {
                        if supersedes(candidate, current) {
                            candidate
                        } else {
                            current
                        }
                    }
                });
            }

            let (value, metadata) = winner
                .map(|e| (e.entry.value, e.entry.metadata.clone()))
                .unwrap_or_default();

            view.push(AccountPermissionEntry {
                account_id: account.to_string(),
                entry: PermissionEntry {
                    scope: scope.clone(),
                    key: key.to_string(),
                    value,
                    metadata,
                },
            });
        }
    }

    view
}

/// Single-account overload: effective value for a key without the account
/// dimension
pub fn resolve_key_value(entries: &[PermissionEntry], scope: &ScopePath, key: &str) -> PermissionValue {
    let mut winner: Option<&PermissionEntry> = None;

    for candidate in entries {
        if candidate.key != key || !(candidate.scope <= *scope) {
            continue;
        }
        winner = Some(match winner {
            None => candidate,
            Some(current) if candidate.scope.rank() >= current.scope.rank() => candidate,
            Some(current) => current,
        });
    }

    winner.map(|e| e.value).unwrap_or_default()
}

/// Single-account overload: flattened per-key view
pub fn resolve_key_view(entries: &[PermissionEntry], scope: &ScopePath) -> Vec<PermissionEntry> {
    let applicable: Vec<&PermissionEntry> =
        entries.iter().filter(|e| e.scope <= *scope).collect();

    let keys: BTreeSet<&str> = applicable.iter().map(|e| e.key.as_str()).collect();

    keys.into_iter()
        .map(|key| {
            let value = resolve_key_value(entries, scope, key);
            PermissionEntry {
                scope: scope.clone(),
                key: key.to_string(),
                value,
                metadata: Default::default(),
            }
        })
        .collect()
}

/// Ancestor-merge step used by the permission cache
///
/// Overlay entries replace base entries for the same `(account, key)` pair in
/// place; entries unique to either side pass through unchanged. The caller
/// applies overlays shallowest-to-deepest so deeper scopes win.
pub(crate) fn merge_overlay(
    base: &mut Vec<AccountPermissionEntry>,
    overlay: Vec<AccountPermissionEntry>,
) {
    for entry in overlay {
        match base
            .iter_mut()
            .find(|b| b.account_id == entry.account_id && b.entry.key == entry.entry.key)
        {
            Some(slot) => *slot = entry,
            None => base.push(entry),
        }
    }
}
