//! Metadata filters for dense-store queries.
//!
//! A coarse pre-filter applied before ranking, never a relevance filter.

use serde_json::Value;

use crate::document::Metadata;

/// Equality/contains predicate over indexed metadata fields.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataFilter {
    /// Field must equal the given scalar.
    Eq { field: String, value: Value },
    /// Field must equal one of the given scalars.
    In { field: String, values: Vec<Value> },
    /// All sub-filters must match.
    All(Vec<MetadataFilter>),
}

impl MetadataFilter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn any_of(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::In {
            field: field.into(),
            values,
        }
    }

    /// Whether the given metadata passes this filter.
    pub fn matches(&self, metadata: &Metadata) -> bool {
        match self {
            Self::Eq { field, value } => metadata.get(field) == Some(value),
            Self::In { field, values } => metadata
                .get(field)
                .map(|v| values.contains(v))
                .unwrap_or(false),
            Self::All(filters) => filters.iter().all(|f| f.matches(metadata)),
        }
    }
}
