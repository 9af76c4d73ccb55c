//! Protected resource store integration tests
//!
//! Drives typed payloads through the decorator against a multi-level
//! hierarchy: claiming, inheritance, revocation, and listing.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use scopegate::{
    AccountPermissionEntry, MemoryResourceStore, PermissionEntry, PermissionError, PermissionValue,
    ProtectedResourceStore, ResourcePayload, ResourceRecord, ScopePath, CAN_READ_DATA,
    CAN_READ_PERMISSIONS, CAN_WRITE_DATA, CAN_WRITE_PERMISSIONS,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Document {
    title: String,
    body: String,
}

impl ResourcePayload for Document {
    const KIND: &'static str = "document";
}

fn acl_entry(account: &str, key: &str, value: PermissionValue) -> AccountPermissionEntry {
    AccountPermissionEntry::new(
        account,
        PermissionEntry::new(ScopePath::root(), key, value).unwrap(),
    )
    .unwrap()
}

fn owner_acl(account: &str) -> Vec<AccountPermissionEntry> {
    [
        CAN_READ_DATA,
        CAN_WRITE_DATA,
        CAN_READ_PERMISSIONS,
        CAN_WRITE_PERMISSIONS,
    ]
    .iter()
    .map(|key| acl_entry(account, key, PermissionValue::Allow))
    .collect()
}

/// Owner claims /org; documents live underneath it.
async fn org_store(owner: &str) -> ProtectedResourceStore {
    let store = ProtectedResourceStore::new(Arc::new(MemoryResourceStore::new()));
    store
        .set(
            owner,
            ResourceRecord::new(ScopePath::parse("/org"), "org").with_permissions(owner_acl(owner)),
        )
        .await
        .unwrap();
    store
}

#[tokio::test]
async fn test_typed_payload_through_protection() {
    let store = org_store("owner").await;
    let id = ScopePath::parse("/org/doc1");

    let doc = Document {
        title: "notes".to_string(),
        body: "hello".to_string(),
    };
    store
        .set("owner", ResourceRecord::from_payload(id.clone(), &doc).unwrap())
        .await
        .unwrap();

    let record = store.get("owner", &id).await.unwrap().unwrap();
    assert_eq!(record.kind, Document::KIND);
    assert_eq!(record.payload::<Document>().unwrap(), doc);

    // Anyone outside the org ACL is shut out
    let denied = store.get("outsider", &id).await;
    assert!(matches!(denied, Err(PermissionError::NotPermitted { .. })));
}

#[tokio::test]
async fn test_grant_then_revoke_at_ancestor() {
    let store = org_store("owner").await;
    let org = ScopePath::parse("/org");
    let id = ScopePath::parse("/org/team/doc");

    store
        .set("owner", ResourceRecord::new(id.clone(), Document::KIND))
        .await
        .unwrap();

    // Grant a collaborator read at the org level
    let mut acl = store.permissions("owner", &org).await.unwrap();
    acl.push(acl_entry("collab", CAN_READ_DATA, PermissionValue::Allow));
    store.set_permissions("owner", &org, acl.clone()).await.unwrap();

    assert!(store.get("collab", &id).await.unwrap().is_some());

    // Flip the grant to Deny; the cached subtree must notice immediately
    acl.retain(|e| e.account_id != "collab");
    acl.push(acl_entry("collab", CAN_READ_DATA, PermissionValue::Deny));
    store.set_permissions("owner", &org, acl).await.unwrap();

    let denied = store.get("collab", &id).await;
    assert!(matches!(denied, Err(PermissionError::NotPermitted { .. })));
}

#[tokio::test]
async fn test_deeper_acl_overrides_ancestor_grant() {
    let store = org_store("owner").await;
    let open = ScopePath::parse("/org/open");
    let locked = ScopePath::parse("/org/open/locked");

    // Org-wide read for the viewer
    let mut acl = store
        .permissions("owner", &ScopePath::parse("/org"))
        .await
        .unwrap();
    acl.push(acl_entry("viewer", CAN_READ_DATA, PermissionValue::Allow));
    store
        .set_permissions("owner", &ScopePath::parse("/org"), acl)
        .await
        .unwrap();

    store
        .set("owner", ResourceRecord::new(open.clone(), Document::KIND))
        .await
        .unwrap();

    // Lock a subtree with a deeper Deny
    let mut locked_acl = owner_acl("owner");
    locked_acl.push(acl_entry("viewer", CAN_READ_DATA, PermissionValue::Deny));
    store
        .set(
            "owner",
            ResourceRecord::new(locked.clone(), Document::KIND).with_permissions(locked_acl),
        )
        .await
        .unwrap();

    assert!(store.get("viewer", &open).await.unwrap().is_some());
    let denied = store.get("viewer", &locked).await;
    assert!(matches!(denied, Err(PermissionError::NotPermitted { .. })));
}

#[tokio::test]
async fn test_delete_invalidates_subtree() {
    let store = org_store("owner").await;
    let gate = ScopePath::parse("/org/gate");
    let inner = ScopePath::parse("/org/gate/inner");

    // A gate record denies the prober below the org grant
    let mut gate_acl = owner_acl("owner");
    gate_acl.push(acl_entry("prober", CAN_READ_DATA, PermissionValue::Deny));
    store
        .set(
            "owner",
            ResourceRecord::new(gate.clone(), Document::KIND).with_permissions(gate_acl),
        )
        .await
        .unwrap();
    let mut org_acl = store
        .permissions("owner", &ScopePath::parse("/org"))
        .await
        .unwrap();
    org_acl.push(acl_entry("prober", CAN_READ_DATA, PermissionValue::Allow));
    store
        .set_permissions("owner", &ScopePath::parse("/org"), org_acl)
        .await
        .unwrap();
    store
        .set("owner", ResourceRecord::new(inner.clone(), Document::KIND))
        .await
        .unwrap();

    // Prime the cache with the Deny, then remove the gate
    let denied = store.get("prober", &inner).await;
    assert!(matches!(denied, Err(PermissionError::NotPermitted { .. })));

    store.delete("owner", &gate).await.unwrap();
    assert!(store.get("prober", &inner).await.unwrap().is_some());
}

#[tokio::test]
async fn test_children_listing_filters_kind() {
    let store = org_store("owner").await;

    for (path, kind) in [
        ("/org/d1", Document::KIND),
        ("/org/d2", Document::KIND),
        ("/org/img", "image"),
        ("/org/d1/nested", Document::KIND),
    ] {
        store
            .set("owner", ResourceRecord::new(ScopePath::parse(path), kind))
            .await
            .unwrap();
    }

    let docs = store
        .children("owner", &ScopePath::parse("/org"), Document::KIND)
        .await
        .unwrap();
    assert_eq!(docs.len(), 2);
    assert!(docs.iter().all(|r| r.kind == Document::KIND && r.id.rank() == 2));
}

#[tokio::test]
async fn test_stats_reflect_protected_traffic() {
    let store = org_store("owner").await;
    let id = ScopePath::parse("/org/doc");

    store
        .set("owner", ResourceRecord::new(id.clone(), Document::KIND))
        .await
        .unwrap();
    for _ in 0..3 {
        store.get("owner", &id).await.unwrap();
    }

    let stats = store.cache().stats();
    assert!(stats.hits > 0);
    assert!(stats.misses > 0);
    assert!(stats.hit_rate() > 0.0);
}
