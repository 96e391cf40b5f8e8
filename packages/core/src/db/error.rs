//! Store Error Types
//!
//! This module defines the failure signal every [`NodeStore`](super::NodeStore)
//! implementation reports. The tree engine passes these through to callers
//! unchanged.

use thiserror::Error;

/// Record store operation errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// A single write was rejected (validation hook, constraint violation)
    #[error("Write rejected for record {id}: {reason}")]
    WriteRejected { id: String, reason: String },

    /// Insert of an id that already exists
    #[error("Duplicate key: {id}")]
    DuplicateKey { id: String },

    /// A find/remove could not be executed
    #[error("Read failed: {0}")]
    ReadFailed(String),

    /// Record could not be converted to or from its stored form
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Create a write rejected error
    pub fn write_rejected(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::WriteRejected {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Create a duplicate key error
    pub fn duplicate_key(id: impl Into<String>) -> Self {
        Self::DuplicateKey { id: id.into() }
    }

    /// Create a read failed error
    pub fn read_failed(msg: impl Into<String>) -> Self {
        Self::ReadFailed(msg.into())
    }

    /// Whether this error came from a write
    pub fn is_write_failure(&self) -> bool {
        matches!(self, Self::WriteRejected { .. } | Self::DuplicateKey { .. })
    }
}
