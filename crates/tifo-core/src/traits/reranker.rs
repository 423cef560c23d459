use crate::errors::TifoResult;
use crate::models::RetrievalItem;

/// Second-stage scorer over the fused candidate list.
///
/// Implementations strictly reorder and truncate their input to `top_k`;
/// they must not invent, drop, or mutate item metadata. A no-op
/// implementation is always available so the pipeline functions without a
/// loaded cross-encoder model.
pub trait IReranker: Send + Sync {
    fn rerank(
        &self,
        query: &str,
        items: Vec<RetrievalItem>,
        top_k: usize,
    ) -> TifoResult<Vec<RetrievalItem>>;

    /// Human-readable implementation name.
    fn name(&self) -> &str;
}
