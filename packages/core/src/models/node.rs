//! Tree-Enabled Record Types
//!
//! This module defines the capability traits the tree engine is generic over,
//! plus the concrete `Node` record shipped for applications and tests.
//!
//! # Capabilities
//!
//! - **HasId**: Stable, unique identifier
//! - **HasMpath**: Materialized path (root-to-parent chain, own id excluded)
//! - **HasParentId**: Direct parent reference (`None` for roots)
//! - **Placeable**: Writes `mpath` and `parentId` together via [`Placement`]
//! - **Cloneable**: Shallow copy under a new identifier
//!
//! Any type implementing all five (plus `Clone + Send + Sync + 'static`) is a
//! [`TreeNode`] through a blanket implementation.
//!
//! # Examples
//!
//! ```rust
//! use mpath_core::models::{Node, Placement, Placeable, HasMpath};
//! use serde_json::json;
//!
//! let root = Node::new("Root", json!({}));
//! let mut child = Node::new("Child", json!({"status": "open"}));
//!
//! child.set_placement(Placement::under(Some(&root)));
//! assert_eq!(child.mpath(), format!("/{}", root.id));
//! ```

use crate::models::path::{MaterializedPath, Placement};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Record with a unique identifier
pub trait HasId {
    fn id(&self) -> &str;
}

/// Record carrying a materialized path
pub trait HasMpath {
    /// Path string: `""` for roots, otherwise `/root/.../parent`
    fn mpath(&self) -> &str;
}

/// Record carrying a direct parent reference
pub trait HasParentId {
    fn parent_id(&self) -> Option<&str>;
}

/// Record whose tree position can be rewritten
///
/// `mpath` and `parentId` are only ever written together, from one [`Placement`].
pub trait Placeable: HasMpath + HasParentId {
    fn set_placement(&mut self, placement: Placement);
}

/// Record that can be duplicated under a fresh identifier
pub trait Cloneable {
    /// Copy every field, replacing only the identifier
    fn clone_with_id(&self, id: String) -> Self;
}

/// Full capability set required by the tree engine
///
/// Blanket-implemented for every type providing the individual capabilities.
pub trait TreeNode: HasId + Placeable + Cloneable + Clone + Send + Sync + 'static {
    /// Whether this record is a root (empty path)
    fn is_root(&self) -> bool {
        self.mpath().is_empty()
    }

    /// Parsed, segment-aware form of [`HasMpath::mpath`]
    fn path(&self) -> MaterializedPath {
        MaterializedPath::parse(self.mpath())
    }

    /// Current placement of this record
    fn placement(&self) -> Placement {
        Placement {
            mpath: self.mpath().to_string(),
            parent_id: self.parent_id().map(str::to_string),
        }
    }
}

impl<T> TreeNode for T where T: HasId + Placeable + Cloneable + Clone + Send + Sync + 'static {}

/// Default timestamp for records deserialized without one (e.g. projections)
fn default_created_at() -> DateTime<Utc> {
    Utc::now()
}

/// General-purpose tree-enabled record
///
/// # Fields
///
/// - `id`: Unique identifier (UUID v4 unless supplied by the caller)
/// - `mpath`: Materialized path of the ancestor chain
/// - `parent_id`: Direct parent id, `None` for roots
/// - `name`: Human-readable label
/// - `properties`: Arbitrary JSON payload
/// - `created_at`: Creation timestamp (kept by clones)
///
/// Serialized in camelCase so the default [`TreeConfig`](crate::config::TreeConfig)
/// field names (`mpath`, `parentId`) address it directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique identifier
    pub id: String,

    /// Materialized path (`""` for roots)
    #[serde(default)]
    pub mpath: String,

    /// Direct parent reference
    #[serde(default)]
    pub parent_id: Option<String>,

    /// Human-readable label
    #[serde(default)]
    pub name: String,

    /// Entity-specific fields
    #[serde(default)]
    pub properties: serde_json::Value,

    /// Creation timestamp
    #[serde(default = "default_created_at")]
    pub created_at: DateTime<Utc>,
}

impl Node {
    /// Create a detached root node with an auto-generated UUID
    pub fn new(name: impl Into<String>, properties: serde_json::Value) -> Self {
        Self::new_with_id(Uuid::new_v4().to_string(), name, properties)
    }

    /// Create a detached root node with a caller-assigned id
    ///
    /// ```rust
    /// # use mpath_core::models::Node;
    /// # use serde_json::json;
    /// let node = Node::new_with_id("12", "Twelve", json!({}));
    /// assert_eq!(node.id, "12");
    /// assert!(node.mpath.is_empty());
    /// ```
    pub fn new_with_id(
        id: impl Into<String>,
        name: impl Into<String>,
        properties: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            mpath: String::new(),
            parent_id: None,
            name: name.into(),
            properties,
            created_at: Utc::now(),
        }
    }
}

impl HasId for Node {
    fn id(&self) -> &str {
        &self.id
    }
}

impl HasMpath for Node {
    fn mpath(&self) -> &str {
        &self.mpath
    }
}

impl HasParentId for Node {
    fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }
}

impl Placeable for Node {
    fn set_placement(&mut self, placement: Placement) {
        self.mpath = placement.mpath;
        self.parent_id = placement.parent_id;
    }
}

impl Cloneable for Node {
    fn clone_with_id(&self, id: String) -> Self {
        Self { id, ..self.clone() }
    }
}
