//! Hybrid retrieval and grounding pipeline.
//!
//! Answers "what evidence do we have for this question?" over a corpus of
//! short factual documents (transfers, rosters, match notes), refusing to
//! claim grounding when evidence is stale, contradictory, or too thin.
//!
//! Stages, composed by [`RetrievalEngine`]:
//! 1. query embedding ([`tifo_embeddings::EmbeddingService`])
//! 2. dense nearest-neighbor and sparse BM25 candidate pools
//! 3. reciprocal rank fusion ([`fusion`])
//! 4. optional reranking ([`rerank`])
//! 5. grounding judgment ([`grounding`])

pub mod engine;
pub mod fusion;
pub mod grounding;
pub mod ingest;
pub mod rerank;

pub use engine::RetrievalEngine;
pub use grounding::GroundingPolicy;
pub use rerank::NoOpReranker;

#[cfg(feature = "reranker")]
pub use rerank::CrossEncoderReranker;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install the global tracing subscriber, honoring `RUST_LOG`. Safe to
/// call more than once; later calls are no-ops.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    });
}
