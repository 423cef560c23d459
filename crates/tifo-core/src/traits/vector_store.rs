use crate::document::Metadata;
use crate::errors::TifoResult;
use crate::filter::MetadataFilter;
use crate::models::DenseHit;

/// Nearest-neighbor document store.
pub trait IVectorStore: Send + Sync {
    /// Insert or overwrite a document with its passage embedding.
    fn upsert(
        &self,
        id: &str,
        text: &str,
        metadata: &Metadata,
        embedding: &[f32],
    ) -> TifoResult<()>;

    /// Nearest-neighbor query. `dense_score` on the hits is a distance
    /// (lower = more similar) and must be returned as-is, ascending.
    /// The filter is a coarse pre-filter applied before ranking.
    fn query(
        &self,
        embedding: &[f32],
        filter: Option<&MetadataFilter>,
        top_k: usize,
    ) -> TifoResult<Vec<DenseHit>>;

    /// All (id, text) pairs in stable corpus order, for sparse rebuilds.
    fn snapshot(&self) -> TifoResult<Vec<(String, String)>>;

    /// Number of stored documents.
    fn document_count(&self) -> TifoResult<usize>;
}
