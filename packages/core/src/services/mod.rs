//! Tree Services
//!
//! This module contains the tree engine, split by concern into `impl` blocks of
//! a single [`TreeService`]:
//!
//! - `tree_service` - Construction, subtree queries, removal, tree assembly
//! - `subtree_mover` - `attach` / `detach` with path rewriting
//! - `ancestor_assembler` - Minimal ancestor forest for a set of documents
//! - `subtree_cloner` - Deep copy of a subtree via bulk insert
//!
//! Services coordinate between the record store and application code; they
//! hold no locks and keep no state beyond the store handle and configuration.

mod ancestor_assembler;
pub mod error;
mod subtree_cloner;
mod subtree_mover;
pub mod tree_service;

pub use error::TreeError;
pub use subtree_cloner::{ChildFilter, CloneFn, CopyOptions};
pub use tree_service::TreeService;
