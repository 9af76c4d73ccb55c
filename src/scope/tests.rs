use super::ScopePath;
use crate::error::PermissionError;

use proptest::prelude::*;
use std::collections::HashMap;

#[test]
fn test_parse_normalization() {
    let scope = ScopePath::parse("/Org/Acme/Dept");
    assert_eq!(scope.segments(), ["org", "acme", "dept"]);

    // Alias separators are rewritten to the canonical one
    let aliased = ScopePath::parse("org:acme\\dept");
    assert_eq!(aliased, scope);

    // Empty segments are dropped
    let sloppy = ScopePath::parse("//org///acme//dept/");
    assert_eq!(sloppy, scope);
}

#[test]
fn test_parse_never_fails() {
    assert!(ScopePath::parse("").is_root());
    assert!(ScopePath::parse("   ").is_root());
    assert!(ScopePath::parse("///").is_root());
    assert_eq!(ScopePath::parse(" org / acme ").segments(), ["org", "acme"]);
}

#[test]
fn test_parse_with_custom_aliases() {
    let scope = ScopePath::parse_with("org.acme.dept", &['.']);
    assert_eq!(scope.segments(), ["org", "acme", "dept"]);
}

#[test]
fn test_construction_validates_segments() {
    assert!(ScopePath::new(["org", "acme"]).is_ok());

    let embedded = ScopePath::new(["org", "a/b"]);
    assert!(matches!(embedded, Err(PermissionError::InvalidSegment(_))));

    let aliased = ScopePath::new(["org", "a:b"]);
    assert!(matches!(aliased, Err(PermissionError::InvalidSegment(_))));

    let whitespace = ScopePath::new(["org", "a b"]);
    assert!(matches!(whitespace, Err(PermissionError::InvalidSegment(_))));

    let empty = ScopePath::new(["org", ""]);
    assert!(matches!(empty, Err(PermissionError::InvalidSegment(_))));
}

#[test]
fn test_display() {
    assert_eq!(ScopePath::root().to_string(), "/");
    assert_eq!(ScopePath::parse("org/acme").to_string(), "/org/acme");
}

#[test]
fn test_root_is_additive_identity() {
    let scope = ScopePath::parse("/org/acme");
    assert_eq!(scope.append(&ScopePath::root()), scope);
    assert_eq!(ScopePath::root().append(&scope), scope);
}

#[test]
fn test_append_and_add_operators() {
    let left = ScopePath::parse("/org");
    let right = ScopePath::parse("/acme/dept");

    assert_eq!(&left + &right, ScopePath::parse("/org/acme/dept"));
    assert_eq!(left.clone() + right, ScopePath::parse("/org/acme/dept"));
    assert_eq!(&left + "acme", ScopePath::parse("/org/acme"));
}

#[test]
fn test_back_floors_at_root() {
    let scope = ScopePath::parse("/org/acme/dept");
    assert_eq!(scope.back(1), ScopePath::parse("/org/acme"));
    assert_eq!(scope.back(3), ScopePath::root());
    assert_eq!(scope.back(10), ScopePath::root());
}

#[test]
fn test_subtraction_containment() {
    let child = ScopePath::parse("/org/acme/dept");
    let parent = ScopePath::parse("/org");
    assert_eq!(&child - &parent, ScopePath::parse("/acme/dept"));
    assert_eq!(&parent - &child, ScopePath::parse("/acme/dept"));
}

#[test]
fn test_subtraction_branch_remainder() {
    // Shared prefix /org; the larger path's remainder after the branch wins
    let a = ScopePath::parse("/org/acme/dept");
    let b = ScopePath::parse("/org/other");
    assert_eq!(&a - &b, ScopePath::parse("/acme/dept"));
}

#[test]
fn test_subtraction_disjoint() {
    let a = ScopePath::parse("/org/acme");
    let b = ScopePath::parse("/x");
    assert_eq!(&a - &b, a);
}

#[test]
fn test_ancestor_ordering() {
    let root = ScopePath::root();
    let org = ScopePath::parse("/org");
    let dept = ScopePath::parse("/org/acme/dept");
    let other = ScopePath::parse("/x");

    assert!(org < dept);
    assert!(org <= dept);
    assert!(dept > org);
    assert!(root < org);

    // A path is >= itself but never > itself
    assert!(org >= org);
    assert!(org <= org);
    assert!(!(org > org));
    assert!(!(org < org));

    // Disjoint paths are unordered
    assert!(!(org <= other));
    assert!(!(org >= other));
    assert!(!(other <= org));
}

#[test]
fn test_hierarchy_ascending() {
    let scope = ScopePath::parse("/org/acme/dept");

    let with_root = scope.hierarchy_ascending(true);
    assert_eq!(
        with_root,
        vec![
            ScopePath::root(),
            ScopePath::parse("/org"),
            ScopePath::parse("/org/acme"),
            ScopePath::parse("/org/acme/dept"),
        ]
    );

    let without_root = scope.hierarchy_ascending(false);
    assert_eq!(without_root.len(), 3);
    assert_eq!(without_root[0], ScopePath::parse("/org"));
    assert_eq!(without_root[2], scope);
}

#[test]
fn test_hierarchy_descending() {
    let scope = ScopePath::parse("/org/acme");
    let chain = scope.hierarchy_descending(false);
    assert_eq!(chain, vec![ScopePath::parse("/org/acme"), ScopePath::parse("/org")]);

    assert!(ScopePath::root().hierarchy_ascending(false).is_empty());
    assert_eq!(ScopePath::root().hierarchy_ascending(true).len(), 1);
}

#[test]
fn test_starts_and_ends_with() {
    let scope = ScopePath::parse("/org/acme/dept");

    assert!(scope.starts_with(&ScopePath::parse("/org")));
    assert!(scope.starts_with(&scope));
    assert!(scope.starts_with(&ScopePath::root()));
    assert!(!scope.starts_with(&ScopePath::parse("/acme")));

    assert!(scope.ends_with(&ScopePath::parse("/acme/dept")));
    assert!(!scope.ends_with(&ScopePath::parse("/org")));
}

#[test]
fn test_branch_point() {
    let a = ScopePath::parse("/org/acme/dept");
    let b = ScopePath::parse("/org/acme/sales");
    assert_eq!(a.branch_point(&b), ScopePath::parse("/org/acme"));

    let disjoint = ScopePath::parse("/x/y");
    assert_eq!(a.branch_point(&disjoint), ScopePath::root());
}

#[test]
fn test_last_segments_and_reverse() {
    let scope = ScopePath::parse("/org/acme/dept");
    assert_eq!(scope.last_segments(2), ScopePath::parse("/acme/dept"));
    assert_eq!(scope.last_segments(10), scope);
    assert_eq!(scope.reversed(), ScopePath::parse("/dept/acme/org"));
}

#[test]
fn test_hash_and_equality_by_segments() {
    let mut map = HashMap::new();
    map.insert(ScopePath::parse("/org/acme"), 1);

    // Different spellings of the same path hit the same key
    assert_eq!(map.get(&ScopePath::parse("Org:Acme")), Some(&1));
    assert!(map.get(&ScopePath::parse("/org")).is_none());
}

#[test]
fn test_serde_round_trip() {
    let scope = ScopePath::parse("/org/acme/dept");
    let json = serde_json::to_string(&scope).unwrap();
    assert_eq!(json, "\"/org/acme/dept\"");

    let back: ScopePath = serde_json::from_str(&json).unwrap();
    assert_eq!(back, scope);
}

fn arb_path() -> impl Strategy<Value = ScopePath> {
    proptest::collection::vec("[a-z][a-z0-9]{0,6}", 0..6)
        .prop_map(|segments| ScopePath::new(segments).unwrap())
}

proptest! {
    #[test]
    fn prop_root_identity(scope in arb_path()) {
        prop_assert_eq!(scope.append(&ScopePath::root()), scope.clone());
        prop_assert_eq!(ScopePath::root().append(&scope), scope);
    }

    #[test]
    fn prop_rank_monotonicity(scope in arb_path(), n in 0usize..10) {
        prop_assert_eq!(scope.back(n).rank(), scope.rank().saturating_sub(n));
    }

    #[test]
    fn prop_parse_display_round_trip(scope in arb_path()) {
        prop_assert_eq!(ScopePath::parse(&scope.to_string()), scope);
    }

    #[test]
    fn prop_ancestors_are_less_or_equal(scope in arb_path()) {
        for ancestor in scope.hierarchy_ascending(true) {
            prop_assert!(ancestor <= scope);
        }
    }
}
