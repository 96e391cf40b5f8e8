//! NodeStore Trait - Record Store Abstraction
//!
//! This module defines the `NodeStore` trait: the primitive operations the
//! tree engine composes. The engine never talks to a database directly, so any
//! backend that can evaluate a [`Filter`] can host tree-enabled records.
//!
//! # Design Decisions
//!
//! 1. **Async-First**: All methods are async so both embedded and networked
//!    backends fit
//! 2. **Ownership Semantics**: Writes take records by value and return the
//!    persisted form
//! 3. **Native Errors**: Failures are reported as [`StoreError`] and reach
//!    engine callers unchanged
//! 4. **No Transactions**: Multi-record mutations are independent writes
//!
//! # Examples
//!
//! ```rust
//! use mpath_core::db::{Filter, MemoryStore, NodeStore};
//! use mpath_core::models::Node;
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let store = MemoryStore::<Node>::new();
//! store.save(Node::new_with_id("r", "Root", json!({}))).await?;
//!
//! let found = store.find_one(&Filter::eq("id", "r")).await?;
//! assert!(found.is_some());
//! # Ok::<(), mpath_core::db::StoreError>(())
//! # }).unwrap();
//! ```

use crate::config::FieldDefinition;
use crate::db::error::StoreError;
use crate::db::filter::{Filter, Projection};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result of a bulk delete
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub deleted_count: usize,
}

/// Abstraction layer for record persistence
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`: batched writes are issued from
/// spawned tasks sharing one `Arc` of the store.
///
/// # Method Categories
///
/// - **Reads**: `find`, `find_one`
/// - **Writes**: `save` (validated), `insert_many` (bulk, unvalidated)
/// - **Deletes**: `remove`
/// - **Schema**: `register_fields`
#[async_trait]
pub trait NodeStore<N>: Send + Sync
where
    N: Send + 'static,
{
    /// Find every record matching `filter`
    ///
    /// With a projection, only the listed fields are populated; the rest take
    /// their default values. Result order is unspecified.
    async fn find(
        &self,
        filter: &Filter,
        projection: Option<&Projection>,
    ) -> Result<Vec<N>, StoreError>;

    /// Find a single record matching `filter`
    ///
    /// - `Ok(Some(record))` if one matches
    /// - `Ok(None)` if none does (not an error)
    async fn find_one(&self, filter: &Filter) -> Result<Option<N>, StoreError>;

    /// Delete every record matching `filter`
    async fn remove(&self, filter: &Filter) -> Result<DeleteResult, StoreError>;

    /// Bulk insert
    ///
    /// Unordered: a rejected record does not stop the others from being
    /// inserted, but the call still reports the failure. Per-record validation
    /// applied by [`NodeStore::save`] is skipped.
    async fn insert_many(&self, records: Vec<N>) -> Result<Vec<N>, StoreError>;

    /// Insert or replace one record, applying normal validation
    async fn save(&self, record: N) -> Result<N, StoreError>;

    /// Declare the extra tree fields (and their indexes) for this record type
    async fn register_fields(&self, _fields: &[FieldDefinition]) -> Result<(), StoreError> {
        Ok(())
    }
}
