use crate::errors::TifoResult;

/// Remote embedding backend.
///
/// Implementations return exactly one vector per input text, pooled to a
/// single vector and L2-normalized, or fail the whole batch — partial
/// results are never returned.
pub trait IEmbeddingProvider: Send + Sync {
    /// Embed a batch of texts. Role prefixes are already applied by the
    /// caller; the provider sees final input strings.
    fn embed_batch(&self, texts: &[String]) -> TifoResult<Vec<Vec<f32>>>;

    /// Model identifier, used for cache keying.
    fn model(&self) -> &str;
}
