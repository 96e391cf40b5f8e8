//! End-to-end hierarchy scenarios
//!
//! Builds small hierarchies through the public API only and checks the
//! observable state after each structural change.

mod common;

use anyhow::Result;
use common::{node, service, sorted_ids};
use mpath_core::{parse_ancestor_ids, Forest, Node};

// =========================================================================
// Attach Order Scenarios
// =========================================================================

#[tokio::test]
async fn test_children_attached_before_their_parent() -> Result<()> {
    let service = service();
    let n1 = node("n1");
    let n2 = node("n2");

    // n2 is still a root (and unsaved) when n3/n4 join it
    service.attach(node("n4"), Some(&n2), true).await?;
    service.attach(node("n3"), Some(&n2), true).await?;
    let n2 = service.attach(n2, Some(&n1), false).await?;

    let of_n1 = service.get_children(&n1, None, None).await?;
    assert_eq!(sorted_ids(&of_n1), vec!["n2"]);

    let of_n2 = service.get_children(&n2, None, None).await?;
    assert_eq!(sorted_ids(&of_n2), vec!["n3", "n4"]);

    let under_n1 = service.get_descendants(&n1, None, None).await?;
    assert_eq!(sorted_ids(&under_n1), vec!["n2", "n3", "n4"]);

    let n3 = service.store().get("n3").await.unwrap();
    assert_eq!(n3.mpath, "/n1/n2");
    assert_eq!(parse_ancestor_ids(&n3.mpath), vec!["n1", "n2"]);
    Ok(())
}

// =========================================================================
// Full Lifecycle Scenario
// =========================================================================

#[tokio::test]
async fn test_build_move_and_assemble() -> Result<()> {
    let service = service();

    let r = service.attach(node("r"), None, true).await?;
    let r2 = service.attach(node("r2"), None, true).await?;
    let a = service.attach(node("a"), Some(&r), true).await?;
    let b = service.attach(node("b"), Some(&a), true).await?;
    let c = service.attach(node("c"), Some(&a), true).await?;

    assert_eq!(a.mpath, "/r");
    assert_eq!(b.mpath, "/r/a");
    assert_eq!(c.mpath, "/r/a");

    let a = service.attach(a, Some(&r2), false).await?;
    assert_eq!(a.mpath, "/r2");

    let store = service.store();
    let b = store.get("b").await.unwrap();
    let c = store.get("c").await.unwrap();
    assert_eq!(b.mpath, "/r2/a");
    assert_eq!(c.mpath, "/r2/a");
    assert!(service.get_children(&r, None, None).await?.is_empty());

    let forest = service.build_ancestor_tree(vec![b, c]).await?;
    assert_eq!(forest.root_count(), 1);
    let root = forest.roots().next().unwrap();
    assert_eq!(root.id(), "r2");
    assert_eq!(root.descendants().len(), 3);

    let json = root.to_json()?;
    assert_eq!(json["children"][0]["id"], "a");
    assert_eq!(json["children"][0]["children"].as_array().map(Vec::len), Some(2));

    let removed = service.remove_subtree(&a).await?;
    assert_eq!(removed.deleted_count, 3);
    assert_eq!(sorted_ids(&service.store().all().await), vec!["r", "r2"]);
    Ok(())
}

#[tokio::test]
async fn test_rebuilt_forest_is_stable() -> Result<()> {
    let service = service();
    let r = service.attach(node("r"), None, true).await?;
    let a = service.attach(node("a"), Some(&r), true).await?;
    service.attach(node("b"), Some(&a), true).await?;
    service.attach(node("c"), Some(&r), true).await?;

    let tree = service.build_descendant_tree(&r).await?;
    let shape = |forest: &Forest<Node>| -> Vec<(String, Option<String>)> {
        forest
            .iter()
            .map(|n| (n.id().to_string(), n.parent().map(|p| p.id().to_string())))
            .collect()
    };

    let first = shape(tree.forest());
    let rebuilt = Forest::build(tree.into_forest().into_nodes());
    assert_eq!(shape(&rebuilt), first);
    Ok(())
}
