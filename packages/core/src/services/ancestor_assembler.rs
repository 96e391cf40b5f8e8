//! Ancestor Assembler
//!
//! Builds the smallest forest spanning a set of documents, their ancestors
//! and whatever descendants are already linked to them. Documents that share an
//! ancestor end up in the same tree; ancestors' other children are never
//! fetched.

use crate::db::{Filter, NodeStore};
use crate::models::{parse_ancestor_ids, Forest, TreeNode};
use crate::services::error::TreeError;
use crate::services::tree_service::TreeService;
use std::collections::HashSet;

impl<N, S> TreeService<N, S>
where
    N: TreeNode,
    S: NodeStore<N> + 'static,
{
    /// Get all ancestors of `documents` structured as a set of trees
    ///
    /// `documents` may be a single node, a `Vec` of nodes, or a [`Forest`]
    /// whose links are reused as the known descendants (no queries are issued
    /// for them). The documents are the roots of that input forest.
    ///
    /// One batched `id IN (...)` lookup fetches the ancestor ids parsed from the
    /// documents' paths, minus ids already present in the input. Input nodes
    /// take precedence over fetched records with the same id.
    ///
    /// # Returns
    ///
    /// The assembled forest; empty (without touching the store) for empty input.
    pub async fn build_ancestor_tree<D>(&self, documents: D) -> Result<Forest<N>, TreeError>
    where
        D: Into<Forest<N>>,
    {
        let input: Forest<N> = documents.into();
        if input.is_empty() {
            return Ok(Forest::new());
        }

        let mut seen = HashSet::new();
        let mut wanted = Vec::new();
        for document in input.roots() {
            for id in parse_ancestor_ids(document.node().mpath()) {
                if !input.contains(&id) && seen.insert(id.clone()) {
                    wanted.push(id);
                }
            }
        }

        let ancestors = if wanted.is_empty() {
            Vec::new()
        } else {
            let filter = Filter::any_of(self.config.id_field.clone(), wanted.iter().cloned());
            self.store.find(&filter, None).await?
        };

        tracing::debug!(
            "Assembling ancestor forest from {} input node(s) and {}/{} fetched ancestor(s)",
            input.len(),
            ancestors.len(),
            wanted.len()
        );

        let forest = Forest::build(input.into_nodes().into_iter().chain(ancestors));
        Ok(forest)
    }
}
