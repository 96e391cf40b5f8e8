//! In-Memory Forest Construction
//!
//! Rebuilds parent/child structure from a flat list of records using only the
//! records in that list. Nodes live in an arena (`Vec`) and links are arena
//! indices, so there are no reference cycles and nothing to keep alive.
//!
//! # Algorithm
//!
//! 1. Index every node by id (first occurrence of an id wins)
//! 2. Link each node to its `parent_id` iff that parent is in the same input
//! 3. Every node that never became a child is a root
//!
//! A node whose real parent exists in the store but was not passed in is
//! returned as a root. Building never fetches.
//!
//! # Examples
//!
//! ```rust
//! use mpath_core::models::{Forest, Node, Placeable, Placement};
//! use serde_json::json;
//!
//! let root = Node::new_with_id("r", "Root", json!({}));
//! let mut child = Node::new_with_id("a", "A", json!({}));
//! child.set_placement(Placement::under(Some(&root)));
//!
//! let forest = Forest::build(vec![child, root]);
//! assert_eq!(forest.root_count(), 1);
//!
//! let r = forest.get("r").unwrap();
//! assert_eq!(r.children().map(|c| c.id()).collect::<Vec<_>>(), vec!["a"]);
//! ```

use crate::models::node::TreeNode;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct Entry<N> {
    node: N,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Set of trees built from a flat node list
#[derive(Debug, Clone)]
pub struct Forest<N> {
    entries: Vec<Entry<N>>,
    index: HashMap<String, usize>,
    roots: Vec<usize>,
}

impl<N> Default for Forest<N> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            roots: Vec::new(),
        }
    }
}

impl<N: TreeNode> Forest<N> {
    /// An empty forest
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a forest from `nodes`
    ///
    /// Arena order, root order and child order all follow input order, so the
    /// result is deterministic, and rebuilding from [`Forest::into_nodes`]
    /// reproduces the same forest.
    pub fn build<I>(nodes: I) -> Self
    where
        I: IntoIterator<Item = N>,
    {
        let mut entries: Vec<Entry<N>> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for node in nodes {
            if index.contains_key(node.id()) {
                tracing::warn!("Dropping duplicate node {} from forest input", node.id());
                continue;
            }
            index.insert(node.id().to_string(), entries.len());
            entries.push(Entry {
                node,
                parent: None,
                children: Vec::new(),
            });
        }

        for idx in 0..entries.len() {
            let parent_idx = match entries[idx]
                .node
                .parent_id()
                .and_then(|parent_id| index.get(parent_id))
                .copied()
            {
                Some(parent_idx) => parent_idx,
                None => continue,
            };

            if Self::closes_cycle(&entries, idx, parent_idx) {
                tracing::warn!(
                    "Not linking node {} under {}: link would close a cycle",
                    entries[idx].node.id(),
                    entries[parent_idx].node.id()
                );
                continue;
            }

            entries[idx].parent = Some(parent_idx);
            entries[parent_idx].children.push(idx);
        }

        let roots = (0..entries.len())
            .filter(|&idx| entries[idx].parent.is_none())
            .collect();

        Self {
            entries,
            index,
            roots,
        }
    }

    /// Whether linking `child` under `parent` would make `child` its own ancestor
    fn closes_cycle(entries: &[Entry<N>], child: usize, parent: usize) -> bool {
        let mut cursor = Some(parent);
        while let Some(idx) = cursor {
            if idx == child {
                return true;
            }
            cursor = entries[idx].parent;
        }
        false
    }

    /// Number of nodes in the forest
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    /// Root nodes, in input order
    pub fn roots(&self) -> impl Iterator<Item = NodeRef<'_, N>> + '_ {
        self.roots.iter().map(move |&idx| NodeRef { forest: self, idx })
    }

    /// All nodes, in arena (input) order
    pub fn iter(&self) -> impl Iterator<Item = NodeRef<'_, N>> + '_ {
        (0..self.entries.len()).map(move |idx| NodeRef { forest: self, idx })
    }

    /// Look up a node by id
    pub fn get(&self, id: &str) -> Option<NodeRef<'_, N>> {
        self.index
            .get(id)
            .map(|&idx| NodeRef { forest: self, idx })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Borrow all nodes, in arena order
    pub fn nodes(&self) -> impl Iterator<Item = &N> + '_ {
        self.entries.iter().map(|entry| &entry.node)
    }

    /// Drop the links and return the nodes in arena order
    pub fn into_nodes(self) -> Vec<N> {
        self.entries.into_iter().map(|entry| entry.node).collect()
    }

    /// Re-root this forest at `root_id`, keeping every node
    ///
    /// Returns `None` if `root_id` is not in the forest.
    pub fn into_tree(self, root_id: &str) -> Option<NodeTree<N>> {
        let root = *self.index.get(root_id)?;
        Some(NodeTree { forest: self, root })
    }
}

impl<N: TreeNode> From<N> for Forest<N> {
    fn from(node: N) -> Self {
        Forest::build(std::iter::once(node))
    }
}

impl<N: TreeNode> From<Vec<N>> for Forest<N> {
    fn from(nodes: Vec<N>) -> Self {
        Forest::build(nodes)
    }
}

impl<N: TreeNode> FromIterator<N> for Forest<N> {
    fn from_iter<I: IntoIterator<Item = N>>(iter: I) -> Self {
        Forest::build(iter)
    }
}

/// Borrowed cursor into a [`Forest`]
pub struct NodeRef<'a, N> {
    forest: &'a Forest<N>,
    idx: usize,
}

impl<N> Clone for NodeRef<'_, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N> Copy for NodeRef<'_, N> {}

impl<'a, N: TreeNode> NodeRef<'a, N> {
    pub fn node(&self) -> &'a N {
        &self.forest.entries[self.idx].node
    }

    pub fn id(&self) -> &'a str {
        self.node().id()
    }

    /// Parent within this forest (not necessarily the stored parent)
    pub fn parent(&self) -> Option<NodeRef<'a, N>> {
        let forest = self.forest;
        forest.entries[self.idx]
            .parent
            .map(|idx| NodeRef { forest, idx })
    }

    /// Direct children within this forest, in input order
    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a, N>> + 'a {
        let forest = self.forest;
        forest.entries[self.idx]
            .children
            .iter()
            .map(move |&idx| NodeRef { forest, idx })
    }

    pub fn child_count(&self) -> usize {
        self.forest.entries[self.idx].children.len()
    }

    pub fn is_root(&self) -> bool {
        self.forest.entries[self.idx].parent.is_none()
    }

    /// Every node below this one, pre-order
    pub fn descendants(&self) -> Vec<NodeRef<'a, N>> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeRef<'a, N>> = self.children().collect();
        stack.reverse();

        while let Some(next) = stack.pop() {
            out.push(next);
            let mut children: Vec<_> = next.children().collect();
            children.reverse();
            stack.extend(children);
        }
        out
    }

    /// Number of links between this node and its forest root
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut cursor = self.parent();
        while let Some(parent) = cursor {
            depth += 1;
            cursor = parent.parent();
        }
        depth
    }

    /// Render this subtree as nested JSON with a `children` array per node
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error>
    where
        N: Serialize,
    {
        let mut value = serde_json::to_value(self.node())?;
        let children = self
            .children()
            .map(|child| child.to_json())
            .collect::<Result<Vec<_>, _>>()?;

        if let serde_json::Value::Object(ref mut map) = value {
            map.insert("children".to_string(), serde_json::Value::Array(children));
        }
        Ok(value)
    }
}

impl<N: TreeNode + std::fmt::Debug> std::fmt::Debug for NodeRef<'_, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id())
            .field("children", &self.child_count())
            .finish()
    }
}

/// A forest viewed from one designated root
///
/// Returned by the descendant/children tree helpers and by subtree copies.
#[derive(Debug, Clone)]
pub struct NodeTree<N> {
    forest: Forest<N>,
    root: usize,
}

impl<N: TreeNode> NodeTree<N> {
    pub fn root(&self) -> NodeRef<'_, N> {
        NodeRef {
            forest: &self.forest,
            idx: self.root,
        }
    }

    pub fn forest(&self) -> &Forest<N> {
        &self.forest
    }

    pub fn into_forest(self) -> Forest<N> {
        self.forest
    }

    /// Root plus every node reachable below it
    pub fn len(&self) -> usize {
        1 + self.root().descendants().len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}
