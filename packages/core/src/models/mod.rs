//! Data Models
//!
//! This module contains the data structures the tree engine operates on:
//!
//! - [`path`] - Materialized path encoding (`child_path`, `parse_ancestor_ids`)
//! - [`node`] - Capability traits (`TreeNode`) and the concrete `Node` record
//! - [`forest`] - Arena-based forest rebuilt from flat query results
//!
//! Transient parent/child links only ever live in a [`Forest`]; records
//! themselves carry just `mpath` and `parentId`.

pub mod forest;
pub mod node;
pub mod path;

pub use forest::{Forest, NodeRef, NodeTree};
pub use node::{Cloneable, HasId, HasMpath, HasParentId, Node, Placeable, TreeNode};
pub use path::{
    child_path, is_valid_segment, parse_ancestor_ids, MaterializedPath, Placement, PATH_SEPARATOR,
};
