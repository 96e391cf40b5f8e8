//! Shared helpers for the integration suites

#![allow(dead_code)]

use mpath_core::{MemoryStore, Node, Placeable, Placement, TreeService};
use serde_json::json;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

pub type Service = TreeService<Node, MemoryStore<Node>>;

/// Install a test-friendly subscriber once per test binary
///
/// Honors `RUST_LOG`, defaults to `warn`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

pub fn service() -> Service {
    init_tracing();
    TreeService::new(Arc::new(MemoryStore::new()))
}

pub fn service_with(store: MemoryStore<Node>) -> Service {
    init_tracing();
    TreeService::new(Arc::new(store))
}

/// Detached node whose name is the uppercased id
pub fn node(id: &str) -> Node {
    Node::new_with_id(id, id.to_uppercase(), json!({}))
}

/// Node already placed under `parent`, without touching a store
pub fn placed(id: &str, parent: Option<&Node>) -> Node {
    let mut node = node(id);
    node.set_placement(Placement::under(parent));
    node
}

pub fn sorted_ids<'a>(nodes: impl IntoIterator<Item = &'a Node>) -> Vec<String> {
    let mut ids: Vec<String> = nodes.into_iter().map(|n| n.id.clone()).collect();
    ids.sort();
    ids
}
