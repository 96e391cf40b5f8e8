/// Configuration for a tree-enabled record type
use serde::{Deserialize, Serialize};

/// Kind of value stored in a tree field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    /// Materialized path string (`""` for roots)
    Path,
    /// Identifier that may be absent (roots have no parent)
    NullableId,
}

/// Field a store must persist for tree-enabled records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub name: String,
    pub kind: FieldKind,
    pub indexed: bool,
}

/// Field names and index flags for one tree-enabled record type
///
/// Passed explicitly when constructing a
/// [`TreeService`](crate::services::TreeService); the engine never mutates
/// shared type metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TreeConfig {
    /// Name of the identifier field
    pub id_field: String,

    /// Name of the materialized path field
    pub mpath_field: String,

    /// Name of the parent reference field
    pub parent_id_field: String,

    /// Whether the store should index the path field
    pub index_mpath: bool,

    /// Whether the store should index the parent field
    pub index_parent_id: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            id_field: "id".to_string(),
            mpath_field: "mpath".to_string(),
            parent_id_field: "parentId".to_string(),
            index_mpath: true,
            index_parent_id: true,
        }
    }
}

impl TreeConfig {
    /// The two extra fields every tree-enabled record persists
    pub fn field_definitions(&self) -> Vec<FieldDefinition> {
        vec![
            FieldDefinition {
                name: self.mpath_field.clone(),
                kind: FieldKind::Path,
                indexed: self.index_mpath,
            },
            FieldDefinition {
                name: self.parent_id_field.clone(),
                kind: FieldKind::NullableId,
                indexed: self.index_parent_id,
            },
        ]
    }

    /// Field names a projection must always keep for tree assembly
    pub fn structural_fields(&self) -> [&str; 3] {
        [
            self.id_field.as_str(),
            self.mpath_field.as_str(),
            self.parent_id_field.as_str(),
        ]
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        let fields = self.structural_fields();

        for name in fields {
            if name.is_empty() {
                return Err("field names cannot be empty".to_string());
            }
            if name.contains('.') {
                return Err(format!("field name '{}' cannot contain '.'", name));
            }
        }

        if fields[0] == fields[1] || fields[0] == fields[2] || fields[1] == fields[2] {
            return Err(format!(
                "field names must be distinct (id: '{}', mpath: '{}', parent: '{}')",
                fields[0], fields[1], fields[2]
            ));
        }

        Ok(())
    }
}
