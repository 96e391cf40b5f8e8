//! Tree Service - Subtree Queries and Tree Assembly
//!
//! This module provides the entry point of the engine, `TreeService`, and its
//! read-side operations:
//!
//! - Descendant lookup (segment-wise path prefix)
//! - Children lookup (`parentId` equality)
//! - Bulk removal of descendants / whole subtrees
//! - Ancestor and parent lookup
//! - Descendant/children trees assembled with [`Forest`]
//!
//! Structural mutations live in sibling modules as further `impl` blocks:
//! `subtree_mover` (attach/detach), `ancestor_assembler` and
//! `subtree_cloner` (copy).
//!
//! # Examples
//!
//! ```rust
//! use mpath_core::db::MemoryStore;
//! use mpath_core::models::Node;
//! use mpath_core::services::TreeService;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), mpath_core::services::TreeError> {
//! let service = TreeService::new(Arc::new(MemoryStore::<Node>::new()));
//!
//! let root = service.attach(Node::new("Root", json!({})), None, true).await?;
//! let child = service.attach(Node::new("Child", json!({})), Some(&root), true).await?;
//!
//! let children = service.get_children(&root, None, None).await?;
//! assert_eq!(children[0].id, child.id);
//! # Ok(())
//! # }
//! ```

use crate::config::TreeConfig;
use crate::db::{DeleteResult, Filter, NodeStore, Projection};
use crate::models::{parse_ancestor_ids, Forest, MaterializedPath, NodeTree, TreeNode};
use crate::services::error::TreeError;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

/// Materialized-path tree engine for one record type
///
/// Holds the store and the explicit field configuration. Cheap to clone
/// (the store is shared through an `Arc`).
pub struct TreeService<N, S> {
    /// Record store for all persistence operations
    pub(crate) store: Arc<S>,

    /// Field names and index flags
    pub(crate) config: TreeConfig,

    _node: PhantomData<fn() -> N>,
}

// Manual Clone implementation because neither N nor S needs to be Clone
impl<N, S> Clone for TreeService<N, S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            config: self.config.clone(),
            _node: PhantomData,
        }
    }
}

impl<N, S> TreeService<N, S>
where
    N: TreeNode,
    S: NodeStore<N> + 'static,
{
    /// Create a service with the default field configuration
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            config: TreeConfig::default(),
            _node: PhantomData,
        }
    }

    /// Create a service with explicit field names
    ///
    /// # Errors
    ///
    /// `TreeError::InvalidConfig` if `config` fails validation.
    pub fn with_config(store: Arc<S>, config: TreeConfig) -> Result<Self, TreeError> {
        config.validate().map_err(TreeError::invalid_config)?;
        Ok(Self {
            store,
            config,
            _node: PhantomData,
        })
    }

    /// Get access to the underlying store
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Register the `mpath`/`parentId` fields (and their indexes) with the store
    pub async fn enable(&self) -> Result<(), TreeError> {
        let fields = self.config.field_definitions();
        self.store.register_fields(&fields).await?;
        tracing::info!(
            "Registered tree fields '{}' and '{}'",
            self.config.mpath_field,
            self.config.parent_id_field
        );
        Ok(())
    }

    /// Predicate selecting every descendant of `root`
    pub(crate) fn descendant_filter(&self, root: &N) -> Filter {
        Filter::path_prefix(
            self.config.mpath_field.clone(),
            MaterializedPath::child_of(Some(root)),
        )
    }

    /// Predicate selecting the direct children of `root`
    pub(crate) fn children_filter(&self, root: &N) -> Filter {
        Filter::eq(self.config.parent_id_field.clone(), root.id())
    }

    pub(crate) fn id_filter(&self, id: &str) -> Filter {
        Filter::eq(self.config.id_field.clone(), id)
    }

    /// Caller projection plus the fields tree assembly depends on
    fn structural_projection(&self, projection: Option<&Projection>) -> Option<Projection> {
        projection.map(|p| p.clone().with_fields(self.config.structural_fields()))
    }

    /// Find all descendants of `root`
    ///
    /// Returns the records whose path starts, segment by segment, with the
    /// path `root`'s children carry. This is a flat list in store order, not a
    /// tree; see [`TreeService::build_descendant_tree`].
    ///
    /// # Arguments
    ///
    /// * `root` - Subtree root (need not be a store-level root)
    /// * `extra` - Additional predicate ANDed with the path match
    /// * `projection` - Optional field selection (structural fields are always kept)
    pub async fn get_descendants(
        &self,
        root: &N,
        extra: Option<&Filter>,
        projection: Option<&Projection>,
    ) -> Result<Vec<N>, TreeError> {
        let filter = self.descendant_filter(root).and_maybe(extra);
        let projection = self.structural_projection(projection);

        let descendants = self.store.find(&filter, projection.as_ref()).await?;
        tracing::debug!("Found {} descendant(s) of {}", descendants.len(), root.id());
        Ok(descendants)
    }

    /// Find the direct children of `root` (one level only)
    pub async fn get_children(
        &self,
        root: &N,
        extra: Option<&Filter>,
        projection: Option<&Projection>,
    ) -> Result<Vec<N>, TreeError> {
        let filter = self.children_filter(root).and_maybe(extra);
        let projection = self.structural_projection(projection);

        let children = self.store.find(&filter, projection.as_ref()).await?;
        tracing::debug!("Found {} child(ren) of {}", children.len(), root.id());
        Ok(children)
    }

    /// Delete exactly the records `get_descendants(root, extra)` would return
    ///
    /// No integrity checks: references to deleted records held elsewhere are
    /// the caller's problem.
    pub async fn remove_descendants(
        &self,
        root: &N,
        extra: Option<&Filter>,
    ) -> Result<DeleteResult, TreeError> {
        let filter = self.descendant_filter(root).and_maybe(extra);
        let result = self.store.remove(&filter).await?;

        tracing::info!(
            "Removed {} descendant(s) of {}",
            result.deleted_count,
            root.id()
        );
        Ok(result)
    }

    /// Delete `root` together with all of its descendants
    ///
    /// Two independent deletes (descendants first); not atomic.
    pub async fn remove_subtree(&self, root: &N) -> Result<DeleteResult, TreeError> {
        let descendants = self.remove_descendants(root, None).await?;
        let own = self.store.remove(&self.id_filter(root.id())).await?;

        Ok(DeleteResult {
            deleted_count: descendants.deleted_count + own.deleted_count,
        })
    }

    /// Fetch the stored parent of `node`, if any
    pub async fn get_parent(&self, node: &N) -> Result<Option<N>, TreeError> {
        match node.parent_id() {
            Some(parent_id) => Ok(self.store.find_one(&self.id_filter(parent_id)).await?),
            None => Ok(None),
        }
    }

    /// Fetch the ancestors encoded in `node`'s path, root first
    ///
    /// Issues a single `IN` lookup. Ancestors missing from the store are
    /// skipped.
    pub async fn get_ancestors(&self, node: &N) -> Result<Vec<N>, TreeError> {
        let ids = parse_ancestor_ids(node.mpath());
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let position: HashMap<&str, usize> = ids
            .iter()
            .enumerate()
            .map(|(pos, id)| (id.as_str(), pos))
            .collect();

        let filter = Filter::any_of(self.config.id_field.clone(), ids.iter().cloned());
        let mut ancestors = self.store.find(&filter, None).await?;
        ancestors.sort_by_key(|ancestor| {
            position
                .get(ancestor.id())
                .copied()
                .unwrap_or(usize::MAX)
        });

        Ok(ancestors)
    }

    /// Get all descendants of `root` structured as a tree
    ///
    /// `Forest::build({root} ∪ get_descendants(root))`, viewed from `root`.
    pub async fn build_descendant_tree(&self, root: &N) -> Result<NodeTree<N>, TreeError> {
        let descendants = self.get_descendants(root, None, None).await?;
        Self::assemble(root, descendants)
    }

    /// Get the direct children of `root` structured as a one-level tree
    pub async fn build_children_tree(&self, root: &N) -> Result<NodeTree<N>, TreeError> {
        let children = self.get_children(root, None, None).await?;
        Self::assemble(root, children)
    }

    fn assemble(root: &N, nodes: Vec<N>) -> Result<NodeTree<N>, TreeError> {
        let forest: Forest<N> = std::iter::once(root.clone()).chain(nodes).collect();
        forest
            .into_tree(root.id())
            .ok_or_else(|| TreeError::node_not_found(root.id()))
    }
}

#[cfg(test)]
#[path = "tree_service_test.rs"]
mod tree_service_test;
