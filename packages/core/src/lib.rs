//! Mpath Core - Materialized-Path Tree Engine
//!
//! This crate maintains tree-shaped hierarchies inside a flat record store.
//! Every record carries its ancestor chain as a materialized path (`mpath`)
//! plus a direct `parentId`; subtree queries become path-prefix lookups.
//!
//! # Architecture
//!
//! - **Path encoding**: Pure, segment-aware path functions (no regex matching)
//! - **Arena forests**: Parent/child links rebuilt per query as arena indices
//! - **Store abstraction**: The engine composes find / insert / remove / save
//! - **Explicit configuration**: Field names are passed in, never registered globally
//!
//! # Modules
//!
//! - [`models`] - Paths, capability traits, the `Node` record, forests
//! - [`db`] - `NodeStore` trait, predicates, `MemoryStore`
//! - [`services`] - `TreeService` (queries, attach/detach, ancestor trees, copy)
//! - [`config`] - `TreeConfig` field configuration

pub mod config;
pub mod db;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use config::TreeConfig;
pub use db::{DeleteResult, Filter, MemoryStore, NodeStore, Projection, StoreError};
pub use models::*;
pub use services::*;
