//! Ingestion entry points.
//!
//! Documents arrive as `{id, text, metadata}` triples from the external
//! ETL jobs. Single upserts refresh the dense store only; the bulk path
//! embeds in batches, upserts everything, then rebuilds the sparse index
//! once at the end.

use tracing::{debug, info};

use tifo_core::constants::FAR_FUTURE_VALID_TO;
use tifo_core::document::{Document, Metadata};
use tifo_core::errors::{EmbeddingError, TifoResult};

use crate::engine::RetrievalEngine;

/// Derive a stable content-addressed id for a document without one.
pub fn content_id(text: &str) -> String {
    let digest = blake3::hash(text.as_bytes()).to_hex();
    format!("doc-{}", &digest.as_str()[..16])
}

/// Stamp the far-future validity sentinel when the producer sent none.
/// Downstream freshness fails closed on a missing `valid_to`, so "valid
/// forever" must be made explicit here.
fn normalize_metadata(metadata: &mut Metadata) {
    if !metadata.contains_key("valid_to") {
        metadata.insert(
            "valid_to".to_string(),
            serde_json::Value::String(FAR_FUTURE_VALID_TO.to_string()),
        );
    }
}

impl RetrievalEngine {
    /// Upsert a single document: embed as a passage and write it to the
    /// dense store. The sparse index is not touched; callers batching
    /// many upserts rebuild it once via [`Self::rebuild_sparse`].
    pub fn upsert_document(&self, doc: Document) -> TifoResult<String> {
        let Document {
            id,
            text,
            mut metadata,
        } = doc;
        let id = if id.is_empty() { content_id(&text) } else { id };
        normalize_metadata(&mut metadata);

        let embedding = self.embeddings.embed_one(&text, false)?;
        self.store.upsert(&id, &text, &metadata, &embedding)?;
        debug!(id = %id, "document upserted");
        Ok(id)
    }

    /// Bulk-ingest documents, then rebuild the sparse index from the new
    /// corpus snapshot. Returns the number of documents ingested.
    pub fn ingest(&self, docs: Vec<Document>) -> TifoResult<usize> {
        if docs.is_empty() {
            self.rebuild_sparse()?;
            return Ok(0);
        }

        let texts: Vec<String> = docs.iter().map(|d| d.text.clone()).collect();
        let embeddings = self.embeddings.embed(&texts, false)?;
        if embeddings.len() != docs.len() {
            return Err(EmbeddingError::UnexpectedShape {
                detail: format!(
                    "{} embeddings for {} documents",
                    embeddings.len(),
                    docs.len()
                ),
            }
            .into());
        }

        let count = docs.len();
        for (doc, embedding) in docs.into_iter().zip(embeddings) {
            let Document {
                id,
                text,
                mut metadata,
            } = doc;
            let id = if id.is_empty() { content_id(&text) } else { id };
            normalize_metadata(&mut metadata);
            self.store.upsert(&id, &text, &metadata, &embedding)?;
        }

        self.rebuild_sparse()?;
        info!(documents = count, "bulk ingestion complete");
        Ok(count)
    }

    /// Rebuild the sparse index from the dense store's current snapshot
    /// and publish it atomically.
    pub fn rebuild_sparse(&self) -> TifoResult<()> {
        let snapshot = self.store.snapshot()?;
        self.sparse.rebuild(&snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_id_is_stable_and_distinct() {
        let a = content_id("lukaku al napoli");
        let b = content_id("lukaku al napoli");
        let c = content_id("thuram all'inter");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("doc-"));
        assert_eq!(a.len(), 4 + 16);
    }

    #[test]
    fn normalize_stamps_the_sentinel_only_when_absent() {
        let mut metadata = Metadata::new();
        normalize_metadata(&mut metadata);
        assert_eq!(
            metadata["valid_to"],
            serde_json::Value::String(FAR_FUTURE_VALID_TO.to_string())
        );

        let mut explicit = Metadata::new();
        explicit.insert(
            "valid_to".to_string(),
            serde_json::Value::String("2026-06-30".to_string()),
        );
        normalize_metadata(&mut explicit);
        assert_eq!(
            explicit["valid_to"],
            serde_json::Value::String("2026-06-30".to_string())
        );
    }
}
