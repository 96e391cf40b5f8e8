//! Integration tests for subtree copy
//!
//! Tests cover:
//! - Copy lands next to the original, with fresh ids
//! - Descendant paths point at copied parents
//! - Child filters drop whole subtrees
//! - Custom clone functions
//! - Bulk insert semantics (no validation, duplicate rejection)

mod common;

use anyhow::Result;
use common::{node, service, service_with, sorted_ids};
use mpath_core::{CopyOptions, MemoryStore, Node, StoreError, TreeError};
use serde_json::json;
use std::collections::HashSet;

/// p ── r ─┬─ a ─┬─ b
///         │     └─ c
///         └─ d (archived) ── e
async fn seed(service: &common::Service) -> Result<Node> {
    let p = service.attach(node("p"), None, true).await?;
    let r = service.attach(node("r"), Some(&p), true).await?;
    let a = service.attach(node("a"), Some(&r), true).await?;
    service.attach(node("b"), Some(&a), true).await?;
    service.attach(node("c"), Some(&a), true).await?;

    let mut d = node("d");
    d.properties = json!({"archived": true});
    let d = service.attach(d, Some(&r), true).await?;
    service.attach(node("e"), Some(&d), true).await?;
    Ok(r)
}

#[tokio::test]
async fn test_copy_is_sibling_of_original() -> Result<()> {
    let service = service();
    let r = seed(&service).await?;

    let copy = service.copy(&r, &CopyOptions::new()).await?;
    let root = copy.root();

    assert_ne!(root.id(), "r");
    assert_eq!(root.node().name, "R");
    assert_eq!(root.node().mpath, "/p");
    assert_eq!(root.node().parent_id.as_deref(), Some("p"));

    let p = service.store().get("p").await.unwrap();
    let siblings = service.get_children(&p, None, None).await?;
    assert_eq!(siblings.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_copy_uses_fresh_ids_and_paths() -> Result<()> {
    let service = service();
    let r = seed(&service).await?;

    let copy = service.copy(&r, &CopyOptions::new()).await?;
    assert_eq!(copy.len(), 6);

    let originals: HashSet<_> = ["r", "a", "b", "c", "d", "e"].into_iter().collect();
    for entry in copy.forest().iter() {
        assert!(!originals.contains(entry.id()));
        if let Some(parent) = entry.parent() {
            let expected = format!("{}/{}", parent.node().mpath, parent.id());
            assert_eq!(entry.node().mpath, expected);
            assert_eq!(entry.node().parent_id.as_deref(), Some(parent.id()));
        }
    }

    let names: Vec<_> = copy
        .root()
        .descendants()
        .iter()
        .map(|n| n.node().name.clone())
        .collect();
    assert_eq!(names, vec!["A", "B", "C", "D", "E"]);
    Ok(())
}

#[tokio::test]
async fn test_copy_leaves_original_untouched() -> Result<()> {
    let service = service();
    let r = seed(&service).await?;
    let before = service.store().all().await;

    service.copy(&r, &CopyOptions::new()).await?;

    let store = service.store();
    for original in before {
        assert_eq!(store.get(&original.id).await, Some(original));
    }
    assert_eq!(store.len().await, 13);
    Ok(())
}

#[tokio::test]
async fn test_filter_child_drops_subtrees() -> Result<()> {
    let service = service();
    let r = seed(&service).await?;

    let options =
        CopyOptions::new().filter_child(|child: &Node| child.properties["archived"] != true);
    let copy = service.copy(&r, &options).await?;

    let names: Vec<_> = copy.forest().nodes().map(|n| n.name.clone()).collect();
    assert_eq!(copy.len(), 4);
    assert!(!names.contains(&"D".to_string()));
    assert!(!names.contains(&"E".to_string()));
    Ok(())
}

#[tokio::test]
async fn test_filter_child_applies_below_first_level() -> Result<()> {
    let service = service();

    // r ── a ─┬─ b ── deep
    //         └─ keep
    let r = service.attach(node("r"), None, true).await?;
    let a = service.attach(node("a"), Some(&r), true).await?;
    let b = service.attach(node("b"), Some(&a), true).await?;
    service.attach(node("deep"), Some(&b), true).await?;
    service.attach(node("keep"), Some(&a), true).await?;

    let options = CopyOptions::new().filter_child(|child: &Node| child.id != "b");
    let copy = service.copy(&r, &options).await?;

    let mut names: Vec<_> = copy.forest().nodes().map(|n| n.name.clone()).collect();
    names.sort();
    assert_eq!(names, vec!["A", "KEEP", "R"]);

    let a_copy = copy.root().children().next().unwrap();
    let under_a: Vec<_> = a_copy.children().map(|c| c.node().name.clone()).collect();
    assert_eq!(under_a, vec!["KEEP"]);

    // Originals plus three copies; b and deep were not duplicated
    assert_eq!(service.store().len().await, 8);
    Ok(())
}

#[tokio::test]
async fn test_custom_clone_fn() -> Result<()> {
    let service = service();
    let r = seed(&service).await?;

    let options = CopyOptions::new()
        .filter_child(|child: &Node| child.id != "d")
        .clone_with(|original: &Node| {
            let mut copy = original.clone();
            copy.id = format!("{}-copy", original.id);
            copy.name = format!("{} (copy)", original.name);
            copy
        });
    let copy = service.copy(&r, &options).await?;

    assert_eq!(copy.root().id(), "r-copy");
    assert_eq!(
        sorted_ids(copy.forest().nodes()),
        vec!["a-copy", "b-copy", "c-copy", "r-copy"]
    );

    let b = service.store().get("b-copy").await.unwrap();
    assert_eq!(b.mpath, "/p/r-copy/a-copy");
    assert_eq!(b.name, "B (copy)");
    Ok(())
}

#[tokio::test]
async fn test_copy_skips_save_validation() -> Result<()> {
    let store = MemoryStore::new().with_validator(|n: &Node| {
        if n.name == "A" && n.id != "a" {
            Err("no second A".to_string())
        } else {
            Ok(())
        }
    });
    let service = service_with(store);
    let r = seed(&service).await?;

    let copy = service.copy(&r, &CopyOptions::new()).await?;
    assert_eq!(copy.len(), 6);
    Ok(())
}

#[tokio::test]
async fn test_copy_reports_duplicate_ids() -> Result<()> {
    let service = service();
    let r = seed(&service).await?;

    // Clone fn reusing ids collides with the originals
    let options = CopyOptions::new().clone_with(|original: &Node| original.clone());
    let err = service.copy(&r, &options).await.unwrap_err();

    assert!(matches!(
        err,
        TreeError::Store(StoreError::DuplicateKey { ref id }) if id == "r"
    ));
    assert_eq!(service.store().len().await, 7);
    Ok(())
}

#[tokio::test]
async fn test_copy_of_leaf() -> Result<()> {
    let service = service();
    seed(&service).await?;
    let b = service.store().get("b").await.unwrap();

    let copy = service.copy(&b, &CopyOptions::new()).await?;
    assert_eq!(copy.len(), 1);
    assert_eq!(copy.root().node().mpath, "/p/r/a");

    let a = service.store().get("a").await.unwrap();
    assert_eq!(service.get_children(&a, None, None).await?.len(), 3);
    Ok(())
}
