use serde::{Deserialize, Serialize};

use crate::document::Metadata;
use crate::models::{DenseHit, SparseHit};

/// A fused retrieval candidate: produced by rank fusion, reordered by the
/// reranker, judged by the grounding policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalItem {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub metadata: Metadata,
    /// Native score from the dense arm (a distance), when present there.
    pub dense_score: Option<f64>,
    /// Native score from the sparse arm, when present there.
    pub bm25_score: Option<f64>,
    /// Summed reciprocal-rank score; higher = more relevant.
    pub fused_score: f64,
}

impl From<DenseHit> for RetrievalItem {
    fn from(hit: DenseHit) -> Self {
        Self {
            id: hit.id,
            text: hit.text,
            metadata: hit.metadata,
            dense_score: Some(hit.dense_score),
            bm25_score: None,
            fused_score: 0.0,
        }
    }
}

impl From<SparseHit> for RetrievalItem {
    fn from(hit: SparseHit) -> Self {
        Self {
            id: hit.id,
            text: hit.text,
            metadata: Metadata::new(),
            dense_score: None,
            bm25_score: Some(hit.bm25_score),
            fused_score: 0.0,
        }
    }
}
