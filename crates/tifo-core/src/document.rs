use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Document metadata: a flat map of scalar fields.
///
/// Keys the pipeline reads: `source`, `date`/`source_date`, `valid_from`,
/// `valid_to`, `season`, `player_id`, `team`, `title`.
pub type Metadata = Map<String, Value>;

/// A corpus document. Immutable once embedded; re-ingestion either creates
/// a new id or overwrites by id (upsert semantics).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata,
        }
    }
}

/// Read a metadata field as a string slice, if present and a string.
pub fn meta_str<'a>(metadata: &'a Metadata, key: &str) -> Option<&'a str> {
    metadata.get(key).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_metadata() -> Metadata {
        let mut m = Metadata::new();
        m.insert("team".to_string(), json!("Inter"));
        m.insert("season".to_string(), json!("2025-26"));
        m.insert("appearances".to_string(), json!(12));
        m
    }

    #[test]
    fn meta_str_reads_string_fields() {
        let m = sample_metadata();
        assert_eq!(meta_str(&m, "team"), Some("Inter"));
        assert_eq!(meta_str(&m, "missing"), None);
        // Non-string values are not coerced.
        assert_eq!(meta_str(&m, "appearances"), None);
    }

    #[test]
    fn document_deserializes_without_metadata() {
        let doc: Document = serde_json::from_str(r#"{"id":"d1","text":"hello"}"#).unwrap();
        assert_eq!(doc.id, "d1");
        assert!(doc.metadata.is_empty());
    }
}
