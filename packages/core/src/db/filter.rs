//! Store Predicates and Projections
//!
//! The predicate language the tree engine needs from a record store:
//!
//! - `Eq` - exact match on a field
//! - `In` - field value is one of a set
//! - `PathPrefix` - segment-wise anchored prefix match on a path field
//! - `And` - logical AND
//!
//! Predicates are plain data (serde-serializable), so a store can translate
//! them into its own query language. [`Filter::matches`] evaluates them against
//! a record's JSON form for in-process stores.
//!
//! Path prefixes are carried as [`MaterializedPath`] values, never interpolated
//! into a pattern string, so ids containing pattern metacharacters behave like
//! any other id.

use crate::models::MaterializedPath;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Record predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Filter {
    /// `field == value` (a missing field equals `null`)
    Eq { field: String, value: Value },

    /// `field` is one of `values`
    In { field: String, values: Vec<Value> },

    /// `field`, read as a path, starts with `prefix` segment by segment
    PathPrefix {
        field: String,
        prefix: MaterializedPath,
    },

    /// Every inner predicate holds (empty = always true)
    And { filters: Vec<Filter> },
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn any_of<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn path_prefix(field: impl Into<String>, prefix: MaterializedPath) -> Self {
        Self::PathPrefix {
            field: field.into(),
            prefix,
        }
    }

    /// Combine with `other`, flattening nested `And`s
    pub fn and(self, other: Filter) -> Self {
        let mut filters = match self {
            Self::And { filters } => filters,
            single => vec![single],
        };
        match other {
            Self::And { filters: more } => filters.extend(more),
            single => filters.push(single),
        }
        Self::And { filters }
    }

    /// Combine with an optional extra filter
    pub fn and_maybe(self, extra: Option<&Filter>) -> Self {
        match extra {
            Some(extra) => self.and(extra.clone()),
            None => self,
        }
    }

    /// Evaluate against the JSON form of a record
    ///
    /// Only top-level fields are addressed.
    pub fn matches(&self, record: &Value) -> bool {
        match self {
            Self::Eq { field, value } => field_value(record, field) == value,
            Self::In { field, values } => {
                let actual = field_value(record, field);
                values.iter().any(|candidate| candidate == actual)
            }
            Self::PathPrefix { field, prefix } => match field_value(record, field) {
                Value::String(raw) => MaterializedPath::parse(raw).starts_with(prefix),
                Value::Null => prefix.is_empty(),
                _ => false,
            },
            Self::And { filters } => filters.iter().all(|filter| filter.matches(record)),
        }
    }
}

fn field_value<'a>(record: &'a Value, field: &str) -> &'a Value {
    record.get(field).unwrap_or(&Value::Null)
}

/// Field selection applied to find results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    fields: Vec<String>,
}

impl Projection {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::default().with_fields(fields)
    }

    /// Add fields not already selected
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for field in fields {
            let field = field.into();
            if !self.fields.contains(&field) {
                self.fields.push(field);
            }
        }
        self
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    /// Keep only the selected top-level fields of a JSON record
    pub fn apply(&self, record: Value) -> Value {
        match record {
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .filter(|(key, _)| self.contains(key))
                    .collect(),
            ),
            other => other,
        }
    }
}
