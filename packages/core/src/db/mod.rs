//! Record Store Layer
//!
//! This module defines what the tree engine needs from persistence:
//!
//! - [`NodeStore`] - find / find_one / remove / insert_many / save
//! - [`Filter`] and [`Projection`] - predicate language (exact match, `IN`,
//!   segment-wise path prefix, AND) and field selection
//! - [`StoreError`] - native failure signal, passed through unchanged
//! - [`MemoryStore`] - in-process implementation
//!
//! # Architecture
//!
//! The engine only composes these primitives. Connection management, query
//! planning and transactions belong to the backend.

mod error;
pub mod filter;
pub mod memory_store;
mod node_store;

pub use error::StoreError;
pub use filter::{Filter, Projection};
pub use memory_store::{MemoryStore, Validator};
pub use node_store::{DeleteResult, NodeStore};
