//! Second-stage rerankers.
//!
//! Two implementations behind [`IReranker`]: the identity-truncation
//! default, and a fastembed cross-encoder behind the `reranker` feature.
//! The variant is chosen at construction time; the pipeline never inspects
//! which one it holds.

use tifo_core::errors::TifoResult;
use tifo_core::models::RetrievalItem;
use tifo_core::traits::IReranker;

/// Identity reranker: keeps fused order, truncates to `top_k`.
#[derive(Debug, Default)]
pub struct NoOpReranker;

impl IReranker for NoOpReranker {
    fn rerank(
        &self,
        _query: &str,
        mut items: Vec<RetrievalItem>,
        top_k: usize,
    ) -> TifoResult<Vec<RetrievalItem>> {
        items.truncate(top_k);
        Ok(items)
    }

    fn name(&self) -> &str {
        "noop"
    }
}

#[cfg(feature = "reranker")]
pub use cross_encoder::CrossEncoderReranker;

#[cfg(feature = "reranker")]
mod cross_encoder {
    use std::sync::Mutex;

    use fastembed::{RerankInitOptions, RerankerModel, TextRerank};
    use tracing::{debug, info};

    use tifo_core::errors::{EmbeddingError, TifoResult};
    use tifo_core::models::RetrievalItem;
    use tifo_core::traits::IReranker;

    /// Cross-encoder reranker over a local fastembed model. Scoring needs
    /// `&mut` access to the model, so calls are serialized internally.
    pub struct CrossEncoderReranker {
        model: Mutex<TextRerank>,
    }

    impl CrossEncoderReranker {
        pub fn new() -> TifoResult<Self> {
            let model = TextRerank::try_new(RerankInitOptions::new(
                RerankerModel::BGERerankerBase,
            ))
            .map_err(|e| EmbeddingError::Unavailable {
                attempts: 0,
                reason: format!("cross-encoder model load failed: {e}"),
            })?;
            info!("cross-encoder reranker loaded");
            Ok(Self {
                model: Mutex::new(model),
            })
        }
    }

    impl IReranker for CrossEncoderReranker {
        fn rerank(
            &self,
            query: &str,
            items: Vec<RetrievalItem>,
            top_k: usize,
        ) -> TifoResult<Vec<RetrievalItem>> {
            if items.is_empty() {
                return Ok(items);
            }

            let documents: Vec<&str> = items.iter().map(|i| i.text.as_str()).collect();
            let mut model = self.model.lock().map_err(|e| EmbeddingError::Unavailable {
                attempts: 0,
                reason: format!("reranker lock poisoned: {e}"),
            })?;
            let ranking = model
                .rerank(query, documents, false, None)
                .map_err(|e| EmbeddingError::Unavailable {
                    attempts: 0,
                    reason: format!("cross-encoder scoring failed: {e}"),
                })?;
            debug!(candidates = items.len(), top_k, "cross-encoder rerank");

            // Reorder the original items by returned index so metadata and
            // fused scores ride along untouched.
            let mut slots: Vec<Option<RetrievalItem>> = items.into_iter().map(Some).collect();
            let mut out = Vec::with_capacity(top_k.min(slots.len()));
            for result in ranking {
                if out.len() == top_k {
                    break;
                }
                if let Some(item) = slots.get_mut(result.index).and_then(Option::take) {
                    out.push(item);
                }
            }
            Ok(out)
        }

        fn name(&self) -> &str {
            "cross-encoder"
        }
    }
}
