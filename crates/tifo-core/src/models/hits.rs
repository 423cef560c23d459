use serde::{Deserialize, Serialize};

use crate::document::Metadata;

/// A hit from the dense (vector) retrieval arm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseHit {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub metadata: Metadata,
    /// Cosine distance; lower = more similar. The fusion stage is the only
    /// consumer allowed to reinterpret this.
    pub dense_score: f64,
}

/// A hit from the sparse (BM25) retrieval arm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SparseHit {
    pub id: String,
    pub text: String,
    pub bm25_score: f64,
}
