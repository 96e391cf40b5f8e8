//! Materialized Path Encoding
//!
//! Pure functions and value types for the path column:
//!
//! - [`child_path`] - Path a child gets when attached under a parent
//! - [`parse_ancestor_ids`] - Ancestor ids encoded in a path, root first
//! - [`MaterializedPath`] - Segment-wise representation used for prefix
//!   matching and rebasing
//! - [`Placement`] - The `(mpath, parentId)` pair, always computed together
//!
//! # Path Format
//!
//! - Root: `""`
//! - Child of root `r`: `"/r"`
//! - Child of `a` under `r`: `"/r/a"`
//!
//! Prefix comparisons are done on whole segments, never on raw text, so the
//! subtree of `"12"` does not contain the subtree of `"120"`.

use crate::models::node::{HasId, HasMpath};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Separator between path segments
pub const PATH_SEPARATOR: char = '/';

/// Compute the path of a node attached under `parent`
///
/// # Examples
///
/// ```rust
/// # use mpath_core::models::{child_path, Node};
/// # use serde_json::json;
/// let mut a = Node::new_with_id("a", "A", json!({}));
/// assert_eq!(child_path::<Node>(None), "");
/// assert_eq!(child_path(Some(&a)), "/a");
///
/// a.mpath = "/r".to_string();
/// assert_eq!(child_path(Some(&a)), "/r/a");
/// ```
pub fn child_path<N>(parent: Option<&N>) -> String
where
    N: HasId + HasMpath,
{
    match parent {
        None => String::new(),
        Some(parent) if parent.mpath().is_empty() => format!("{}{}", PATH_SEPARATOR, parent.id()),
        Some(parent) => format!("{}{}{}", parent.mpath(), PATH_SEPARATOR, parent.id()),
    }
}

/// Parse a path into its ancestor ids, root first
///
/// Empty segments are discarded, so `""` yields no ids.
pub fn parse_ancestor_ids(mpath: &str) -> Vec<String> {
    mpath
        .split(PATH_SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether `id` can be stored as a single path segment
pub fn is_valid_segment(id: &str) -> bool {
    !id.is_empty() && !id.contains(PATH_SEPARATOR)
}

/// Ordered segment representation of a materialized path
///
/// Serialized as its string form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MaterializedPath {
    segments: Vec<String>,
}

impl MaterializedPath {
    /// The empty path of a root node
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse the string form (see [`parse_ancestor_ids`])
    pub fn parse(mpath: &str) -> Self {
        Self {
            segments: parse_ancestor_ids(mpath),
        }
    }

    /// Build a path from already-split segments
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Path a child receives under `parent` (segment form of [`child_path`])
    pub fn child_of<N>(parent: Option<&N>) -> Self
    where
        N: HasId + HasMpath,
    {
        match parent {
            None => Self::root(),
            Some(parent) => Self::parse(parent.mpath()).join(parent.id()),
        }
    }

    /// This path extended by one segment
    pub fn join(mut self, id: &str) -> Self {
        self.segments.push(id.to_string());
        self
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Id of the immediate parent (last segment)
    pub fn parent_id(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Segment-wise anchored prefix test
    pub fn starts_with(&self, prefix: &MaterializedPath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Whether `id` occurs as a whole segment
    pub fn contains(&self, id: &str) -> bool {
        self.segments.iter().any(|segment| segment == id)
    }

    /// Replace the leading `old_prefix` segments with `new_prefix`
    ///
    /// Returns `None` when this path does not start with `old_prefix`. Later
    /// occurrences of the same segments are left untouched.
    ///
    /// ```rust
    /// # use mpath_core::models::MaterializedPath;
    /// let path = MaterializedPath::parse("/r/a/r/a");
    /// let moved = path
    ///     .rebase(&MaterializedPath::parse("/r/a"), &MaterializedPath::parse("/x"))
    ///     .unwrap();
    /// assert_eq!(moved.to_string(), "/x/r/a");
    /// ```
    pub fn rebase(
        &self,
        old_prefix: &MaterializedPath,
        new_prefix: &MaterializedPath,
    ) -> Option<MaterializedPath> {
        if !self.starts_with(old_prefix) {
            return None;
        }

        let mut segments = Vec::with_capacity(new_prefix.len() + self.len() - old_prefix.len());
        segments.extend_from_slice(&new_prefix.segments);
        segments.extend_from_slice(&self.segments[old_prefix.len()..]);
        Some(Self { segments })
    }
}

impl fmt::Display for MaterializedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "{}{}", PATH_SEPARATOR, segment)?;
        }
        Ok(())
    }
}

impl FromStr for MaterializedPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl Serialize for MaterializedPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MaterializedPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// Position of a node in the hierarchy: its path and its parent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub mpath: String,
    pub parent_id: Option<String>,
}

impl Placement {
    /// Placement of a root node
    pub fn root() -> Self {
        Self::default()
    }

    /// Placement of a node attached under `parent` (root when `None`)
    pub fn under<N>(parent: Option<&N>) -> Self
    where
        N: HasId + HasMpath,
    {
        Self {
            mpath: child_path(parent),
            parent_id: parent.map(|p| p.id().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Node;
    use serde_json::json;

    fn node(id: &str, mpath: &str) -> Node {
        let mut node = Node::new_with_id(id, id, json!({}));
        node.mpath = mpath.to_string();
        node
    }

    #[test]
    fn test_child_path() {
        assert_eq!(child_path::<Node>(None), "");
        assert_eq!(child_path(Some(&node("r", ""))), "/r");
        assert_eq!(child_path(Some(&node("a", "/r"))), "/r/a");
        assert_eq!(child_path(Some(&node("b", "/r/a"))), "/r/a/b");
    }

    #[test]
    fn test_parse_ancestor_ids() {
        assert!(parse_ancestor_ids("").is_empty());
        assert_eq!(parse_ancestor_ids("/r"), vec!["r"]);
        assert_eq!(parse_ancestor_ids("/r/a/b"), vec!["r", "a", "b"]);
    }

    #[test]
    fn test_parse_inverts_child_path() {
        let b = node("b", "/r/a");
        let path = child_path(Some(&b));
        assert_eq!(parse_ancestor_ids(&path), vec!["r", "a", "b"]);
    }

    #[test]
    fn test_display_round_trips() {
        for raw in ["", "/r", "/r/a/b"] {
            assert_eq!(MaterializedPath::parse(raw).to_string(), raw);
        }
    }

    #[test]
    fn test_child_of_matches_child_path() {
        let a = node("a", "/r");
        assert_eq!(
            MaterializedPath::child_of(Some(&a)).to_string(),
            child_path(Some(&a))
        );
        assert!(MaterializedPath::child_of::<Node>(None).is_empty());
    }

    #[test]
    fn test_starts_with_is_segment_aware() {
        let under_12 = MaterializedPath::parse("/12/5");
        let under_120 = MaterializedPath::parse("/120/5");
        let prefix = MaterializedPath::parse("/12");

        assert!(under_12.starts_with(&prefix));
        assert!(!under_120.starts_with(&prefix));
        assert!(under_12.starts_with(&MaterializedPath::root()));
    }

    #[test]
    fn test_rebase_only_replaces_leading_prefix() {
        let path = MaterializedPath::parse("/r/a/b");

        let moved = path
            .rebase(&MaterializedPath::parse("/r"), &MaterializedPath::parse("/x/y"))
            .unwrap();
        assert_eq!(moved.to_string(), "/x/y/a/b");

        let detached = path
            .rebase(&MaterializedPath::parse("/r"), &MaterializedPath::root())
            .unwrap();
        assert_eq!(detached.to_string(), "/a/b");

        assert!(path
            .rebase(&MaterializedPath::parse("/a"), &MaterializedPath::root())
            .is_none());
        assert!(MaterializedPath::parse("/120/a")
            .rebase(&MaterializedPath::parse("/12"), &MaterializedPath::root())
            .is_none());
    }

    #[test]
    fn test_contains_whole_segment() {
        let path = MaterializedPath::parse("/120/7");
        assert!(path.contains("120"));
        assert!(!path.contains("12"));
    }

    #[test]
    fn test_placement_under() {
        assert_eq!(Placement::under::<Node>(None), Placement::root());

        let placement = Placement::under(Some(&node("a", "/r")));
        assert_eq!(placement.mpath, "/r/a");
        assert_eq!(placement.parent_id.as_deref(), Some("a"));
    }

    #[test]
    fn test_valid_segment() {
        assert!(is_valid_segment("abc-123"));
        assert!(!is_valid_segment(""));
        assert!(!is_valid_segment("a/b"));
    }

    #[test]
    fn test_serde_uses_string_form() {
        let path = MaterializedPath::parse("/r/a");
        assert_eq!(serde_json::to_value(&path).unwrap(), json!("/r/a"));

        let back: MaterializedPath = serde_json::from_value(json!("/r/a")).unwrap();
        assert_eq!(back, path);
    }
}
