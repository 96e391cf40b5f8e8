//! Subtree Cloner
//!
//! Deep-copies a subtree into brand-new records and attaches the copy next to
//! the original (same external parent). The copies are written with a single
//! bulk insert, which skips the store's per-record validation, then the new
//! root is reloaded and its tree rebuilt from the store.

use crate::db::NodeStore;
use crate::models::{is_valid_segment, NodeRef, NodeTree, Placement, TreeNode};
use crate::services::error::TreeError;
use crate::services::tree_service::TreeService;
use uuid::Uuid;

/// Produces the copy of one record (must assign a fresh id)
pub type CloneFn<N> = Box<dyn Fn(&N) -> N + Send + Sync>;

/// Decides whether a child (and its whole subtree) is copied
pub type ChildFilter<N> = Box<dyn Fn(&N) -> bool + Send + Sync>;

/// Options for [`TreeService::copy`]
///
/// # Examples
///
/// ```rust
/// # use mpath_core::models::Node;
/// # use mpath_core::services::CopyOptions;
/// let options = CopyOptions::<Node>::new()
///     .filter_child(|child| child.properties["archived"] != true)
///     .clone_with(|node| {
///         let mut copy = node.clone();
///         copy.id = format!("{}-copy", node.id);
///         copy
///     });
/// ```
pub struct CopyOptions<N> {
    clone_fn: Option<CloneFn<N>>,
    filter_child: ChildFilter<N>,
}

impl<N: TreeNode> Default for CopyOptions<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: TreeNode> CopyOptions<N> {
    /// Copy every descendant, with UUID v4 ids
    pub fn new() -> Self {
        Self {
            clone_fn: None,
            filter_child: Box::new(|_| true),
        }
    }

    /// Replace the default clone (field copy + UUID v4 id)
    pub fn clone_with<F>(mut self, clone_fn: F) -> Self
    where
        F: Fn(&N) -> N + Send + Sync + 'static,
    {
        self.clone_fn = Some(Box::new(clone_fn));
        self
    }

    /// Only copy children for which `filter` returns true
    pub fn filter_child<F>(mut self, filter: F) -> Self
    where
        F: Fn(&N) -> bool + Send + Sync + 'static,
    {
        self.filter_child = Box::new(filter);
        self
    }

    fn make_copy(&self, node: &N) -> N {
        match &self.clone_fn {
            Some(clone_fn) => clone_fn(node),
            None => node.clone_with_id(Uuid::new_v4().to_string()),
        }
    }

    fn includes(&self, child: &N) -> bool {
        (self.filter_child)(child)
    }
}

impl<N, S> TreeService<N, S>
where
    N: TreeNode,
    S: NodeStore<N> + 'static,
{
    /// Make a copy of the subtree rooted at `root`, under `root`'s own parent
    ///
    /// `root` does not need to be a store-level root. Children rejected by
    /// the options' filter are skipped along with all of their descendants.
    ///
    /// # Returns
    ///
    /// The copy's root reloaded from the store, with its descendant tree.
    ///
    /// # Errors
    ///
    /// - `Store` if a read or the bulk insert fails (a failed unordered insert
    ///   may still have written part of the copy)
    /// - `InvalidId` if a cloned parent's id cannot be a path segment
    /// - `NodeNotFound` if the inserted root cannot be reloaded
    pub async fn copy(
        &self,
        root: &N,
        options: &CopyOptions<N>,
    ) -> Result<NodeTree<N>, TreeError> {
        let original = self.build_descendant_tree(root).await?;
        let copies = Self::copy_records(original.root(), options)?;
        let root_copy_id = copies
            .first()
            .map(|copy| copy.id().to_string())
            .ok_or_else(|| TreeError::node_not_found(root.id()))?;

        let inserted = self.store.insert_many(copies).await?;
        tracing::debug!(
            "Bulk inserted {} record(s) copying subtree {}",
            inserted.len(),
            root.id()
        );

        let root_copy = self
            .store
            .find_one(&self.id_filter(&root_copy_id))
            .await?
            .ok_or_else(|| TreeError::node_not_found(&root_copy_id))?;

        let tree = self.build_descendant_tree(&root_copy).await?;
        tracing::info!(
            "Copied subtree {} to {} ({} node(s))",
            root.id(),
            root_copy_id,
            tree.len()
        );
        Ok(tree)
    }

    /// Clone the tree top-down into a flat list, root copy first
    ///
    /// The root copy keeps the original root's placement; every other copy is
    /// placed under its copied parent.
    fn copy_records(
        source_root: NodeRef<'_, N>,
        options: &CopyOptions<N>,
    ) -> Result<Vec<N>, TreeError> {
        let mut root_copy = options.make_copy(source_root.node());
        root_copy.set_placement(source_root.node().placement());

        let mut copies = vec![root_copy];
        let mut pending = Self::included_children(source_root, 0, options);

        while let Some((source, parent_pos)) = pending.pop() {
            let parent_copy = &copies[parent_pos];
            if !is_valid_segment(parent_copy.id()) {
                return Err(TreeError::invalid_id(parent_copy.id()));
            }
            let placement = Placement::under(Some(parent_copy));

            let mut copy = options.make_copy(source.node());
            copy.set_placement(placement);

            let pos = copies.len();
            copies.push(copy);
            pending.extend(Self::included_children(source, pos, options));
        }

        Ok(copies)
    }

    /// Children of `source` passing the filter, reversed for stack order
    fn included_children<'a>(
        source: NodeRef<'a, N>,
        parent_pos: usize,
        options: &CopyOptions<N>,
    ) -> Vec<(NodeRef<'a, N>, usize)> {
        let mut children: Vec<_> = source
            .children()
            .filter(|child| options.includes(child.node()))
            .map(|child| (child, parent_pos))
            .collect();
        children.reverse();
        children
    }
}
