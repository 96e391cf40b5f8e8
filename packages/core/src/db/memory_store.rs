//! MemoryStore - In-Process NodeStore Implementation
//!
//! Keeps records in insertion order behind a `tokio::sync::RwLock` and
//! evaluates [`Filter`]s against each record's serde JSON form, so any
//! `Serialize + DeserializeOwned` tree record works without extra glue.
//!
//! # Behavior
//!
//! - **save**: upsert by id, runs every registered validator first
//! - **insert_many**: unordered bulk insert, skips validators, rejects
//!   duplicate ids (the non-duplicates are still inserted)
//! - **find with projection**: serialize, keep the projected fields,
//!   deserialize back (unprojected fields take their serde defaults)
//!
//! Used by the test suites and benchmarks, and suitable for embedding
//! applications that keep a hierarchy in memory.

use crate::config::FieldDefinition;
use crate::db::error::StoreError;
use crate::db::filter::{Filter, Projection};
use crate::db::node_store::{DeleteResult, NodeStore};
use crate::models::TreeNode;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Save-time validation hook: `Err(reason)` rejects the write
pub type Validator<N> = Arc<dyn Fn(&N) -> Result<(), String> + Send + Sync>;

/// In-memory record store
pub struct MemoryStore<N> {
    records: RwLock<Vec<N>>,
    validators: Vec<Validator<N>>,
    registered_fields: RwLock<Vec<FieldDefinition>>,
}

impl<N> Default for MemoryStore<N> {
    fn default() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            validators: Vec::new(),
            registered_fields: RwLock::new(Vec::new()),
        }
    }
}

impl<N> MemoryStore<N>
where
    N: TreeNode + Serialize + DeserializeOwned,
{
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a validation hook applied by `save` (not by `insert_many`)
    ///
    /// ```rust
    /// # use mpath_core::db::{MemoryStore, NodeStore};
    /// # use mpath_core::models::Node;
    /// # use serde_json::json;
    /// # tokio_test::block_on(async {
    /// let store = MemoryStore::<Node>::new().with_validator(|node: &Node| {
    ///     if node.name.is_empty() {
    ///         Err("name is required".to_string())
    ///     } else {
    ///         Ok(())
    ///     }
    /// });
    ///
    /// assert!(store.save(Node::new("", json!({}))).await.is_err());
    /// assert!(store.insert_many(vec![Node::new("", json!({}))]).await.is_ok());
    /// # });
    /// ```
    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&N) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validators.push(Arc::new(validator));
        self
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Fetch a record by id, bypassing filters
    pub async fn get(&self, id: &str) -> Option<N> {
        self.records
            .read()
            .await
            .iter()
            .find(|record| record.id() == id)
            .cloned()
    }

    /// Snapshot of every record, in insertion order
    pub async fn all(&self) -> Vec<N> {
        self.records.read().await.clone()
    }

    /// Field definitions passed to `register_fields`
    pub async fn registered_fields(&self) -> Vec<FieldDefinition> {
        self.registered_fields.read().await.clone()
    }

    fn validate(&self, record: &N) -> Result<(), StoreError> {
        for validator in &self.validators {
            validator(record).map_err(|reason| StoreError::write_rejected(record.id(), reason))?;
        }
        Ok(())
    }
}

#[async_trait]
impl<N> NodeStore<N> for MemoryStore<N>
where
    N: TreeNode + Serialize + DeserializeOwned,
{
    async fn find(
        &self,
        filter: &Filter,
        projection: Option<&Projection>,
    ) -> Result<Vec<N>, StoreError> {
        let records = self.records.read().await;
        let mut found = Vec::new();

        for record in records.iter() {
            let value = serde_json::to_value(record)?;
            if !filter.matches(&value) {
                continue;
            }
            match projection {
                Some(projection) => found.push(serde_json::from_value(projection.apply(value))?),
                None => found.push(record.clone()),
            }
        }

        tracing::debug!("MemoryStore find matched {} record(s)", found.len());
        Ok(found)
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<N>, StoreError> {
        let records = self.records.read().await;
        for record in records.iter() {
            if filter.matches(&serde_json::to_value(record)?) {
                return Ok(Some(record.clone()));
            }
        }
        Ok(None)
    }

    async fn remove(&self, filter: &Filter) -> Result<DeleteResult, StoreError> {
        let mut records = self.records.write().await;

        let doomed = records
            .iter()
            .map(|record| serde_json::to_value(record).map(|value| filter.matches(&value)))
            .collect::<Result<Vec<bool>, _>>()?;

        let mut flags = doomed.iter();
        records.retain(|_| !flags.next().copied().unwrap_or(false));

        let deleted_count = doomed.iter().filter(|&&hit| hit).count();
        tracing::debug!("MemoryStore removed {} record(s)", deleted_count);
        Ok(DeleteResult { deleted_count })
    }

    async fn insert_many(&self, batch: Vec<N>) -> Result<Vec<N>, StoreError> {
        let mut records = self.records.write().await;
        let mut inserted = Vec::with_capacity(batch.len());
        let mut first_duplicate: Option<String> = None;

        for record in batch {
            if records.iter().any(|existing| existing.id() == record.id()) {
                tracing::warn!("MemoryStore rejected duplicate id {}", record.id());
                first_duplicate.get_or_insert_with(|| record.id().to_string());
                continue;
            }
            records.push(record.clone());
            inserted.push(record);
        }

        match first_duplicate {
            Some(id) => Err(StoreError::duplicate_key(id)),
            None => Ok(inserted),
        }
    }

    async fn save(&self, record: N) -> Result<N, StoreError> {
        self.validate(&record)?;

        let mut records = self.records.write().await;
        match records.iter_mut().find(|existing| existing.id() == record.id()) {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }
        Ok(record)
    }

    async fn register_fields(&self, fields: &[FieldDefinition]) -> Result<(), StoreError> {
        let mut registered = self.registered_fields.write().await;
        for field in fields {
            match registered.iter_mut().find(|existing| existing.name == field.name) {
                Some(existing) => *existing = field.clone(),
                None => registered.push(field.clone()),
            }
        }
        Ok(())
    }
}
