//! Service Layer Error Types
//!
//! This module defines the error type returned by every tree operation.
//! Store failures are carried transparently: callers see the store's own
//! [`StoreError`] message and source, never a re-worded copy.

use crate::db::StoreError;
use thiserror::Error;

/// Tree operation errors
#[derive(Error, Debug)]
pub enum TreeError {
    /// Read or write failure reported by the record store
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Node not found by ID
    #[error("Node not found: {id}")]
    NodeNotFound { id: String },

    /// Move would make a node its own ancestor
    #[error("Circular reference detected: {context}")]
    CircularReference { context: String },

    /// Stored paths disagree with the hierarchy being rewritten
    #[error("Hierarchy constraint violated: {0}")]
    HierarchyViolation(String),

    /// Identifier cannot be embedded in a materialized path
    #[error("Invalid node id for a path segment: {id:?}")]
    InvalidId { id: String },

    /// Configuration rejected by `TreeConfig::validate`
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A spawned write task panicked or was cancelled
    #[error("Write task failed: {0}")]
    WriteTaskFailed(String),
}

impl TreeError {
    /// Create a node not found error
    pub fn node_not_found(id: impl Into<String>) -> Self {
        Self::NodeNotFound { id: id.into() }
    }

    /// Create a circular reference error
    pub fn circular_reference(context: impl Into<String>) -> Self {
        Self::CircularReference {
            context: context.into(),
        }
    }

    /// Create a hierarchy violation error
    pub fn hierarchy_violation(msg: impl Into<String>) -> Self {
        Self::HierarchyViolation(msg.into())
    }

    /// Create an invalid id error
    pub fn invalid_id(id: impl Into<String>) -> Self {
        Self::InvalidId { id: id.into() }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a write task failure
    pub fn write_task_failed(msg: impl Into<String>) -> Self {
        Self::WriteTaskFailed(msg.into())
    }

    /// The underlying store error, if this failure came from the store
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}
