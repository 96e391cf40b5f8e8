//! Subtree Mover - Attach / Detach
//!
//! Moving a node rewrites its own placement and the path prefix of every
//! descendant. The descendant set is read with the node's pre-move path, before
//! anything is mutated, and all writes are then issued concurrently.
//!
//! # Batch Semantics
//!
//! - Each write runs in its own `tokio` task
//! - The operation succeeds once every write has resolved
//! - It fails as soon as one write fails; writes already issued keep running
//!   and are not rolled back, so a failure can leave the subtree partially
//!   rewritten
//!
//! Callers must serialize structural mutations on overlapping subtrees.

use crate::db::{NodeStore, StoreError};
use crate::models::{is_valid_segment, MaterializedPath, Placement, TreeNode};
use crate::services::error::TreeError;
use crate::services::tree_service::TreeService;
use futures::future::try_join_all;
use std::sync::Arc;
use tokio::task::JoinHandle;

impl<N, S> TreeService<N, S>
where
    N: TreeNode,
    S: NodeStore<N> + 'static,
{
    /// Attach `child` under `parent`, or make it a root when `parent` is `None`
    ///
    /// # Arguments
    ///
    /// * `child` - Node to attach (its current placement is the "old" one)
    /// * `parent` - New parent, `None` to make `child` a root
    /// * `is_leaf` - Caller asserts `child` has no descendants; skips the
    ///   descendant scan and saves `child` alone
    ///
    /// # Returns
    ///
    /// The persisted `child`.
    ///
    /// # Errors
    ///
    /// - `CircularReference` if `parent` is `child` or one of its descendants
    /// - `InvalidId` if `parent`'s id cannot be a path segment
    /// - `HierarchyViolation` if a fetched descendant does not carry the old
    ///   prefix (nothing has been written at that point)
    /// - `Store` for the first failed read or write
    pub async fn attach(
        &self,
        mut child: N,
        parent: Option<&N>,
        is_leaf: bool,
    ) -> Result<N, TreeError> {
        if let Some(parent) = parent {
            Self::check_attachable(&child, parent)?;
        }
        let placement = Placement::under(parent);

        if is_leaf {
            child.set_placement(placement);
            let saved = self.store.save(child).await?;
            tracing::debug!("Attached leaf {} at '{}'", saved.id(), saved.mpath());
            return Ok(saved);
        }

        let old_prefix = child.path();
        let new_prefix = MaterializedPath::parse(&placement.mpath);
        let descendants = self.get_descendants(&child, None, None).await?;

        let mut batch = Vec::with_capacity(descendants.len() + 1);
        for mut descendant in descendants {
            let rebased = descendant
                .path()
                .rebase(&old_prefix, &new_prefix)
                .ok_or_else(|| {
                    TreeError::hierarchy_violation(format!(
                        "descendant {} of {} has path '{}' outside '{}'",
                        descendant.id(),
                        child.id(),
                        descendant.mpath(),
                        old_prefix
                    ))
                })?;

            let parent_id = descendant.parent_id().map(str::to_string);
            descendant.set_placement(Placement {
                mpath: rebased.to_string(),
                parent_id,
            });
            batch.push(descendant);
        }

        child.set_placement(placement);
        batch.push(child);

        let rewritten = batch.len() - 1;
        let mut saved = self.persist_concurrently(batch).await?;
        let child = saved
            .pop()
            .ok_or_else(|| TreeError::write_task_failed("batch write returned no records"))?;

        tracing::info!(
            "Attached {} at '{}' ({} descendant path(s) rewritten)",
            child.id(),
            child.mpath(),
            rewritten
        );
        Ok(child)
    }

    /// Make `child` a root; descendants lose the former prefix
    pub async fn detach(&self, child: N) -> Result<N, TreeError> {
        self.attach(child, None, false).await
    }

    fn check_attachable(child: &N, parent: &N) -> Result<(), TreeError> {
        if !is_valid_segment(parent.id()) {
            return Err(TreeError::invalid_id(parent.id()));
        }
        if parent.id() == child.id() || parent.path().contains(child.id()) {
            return Err(TreeError::circular_reference(format!(
                "Cannot attach node {} under {} (its own subtree)",
                child.id(),
                parent.id()
            )));
        }
        Ok(())
    }

    /// Save every record concurrently, results in input order
    ///
    /// Fails with the first error. Remaining tasks are detached, not aborted.
    pub(crate) async fn persist_concurrently(&self, batch: Vec<N>) -> Result<Vec<N>, TreeError> {
        let handles: Vec<JoinHandle<Result<N, StoreError>>> = batch
            .into_iter()
            .map(|record| {
                let store = Arc::clone(&self.store);
                tokio::spawn(async move { store.save(record).await })
            })
            .collect();

        let size = handles.len();
        let writes = handles.into_iter().map(|handle| async move {
            match handle.await {
                Ok(result) => result.map_err(TreeError::from),
                Err(join_error) => Err(TreeError::write_task_failed(join_error.to_string())),
            }
        });

        try_join_all(writes).await.map_err(|e| {
            tracing::warn!(
                "Batch of {} write(s) failed; writes already accepted are not rolled back: {}",
                size,
                e
            );
            e
        })
    }
}
