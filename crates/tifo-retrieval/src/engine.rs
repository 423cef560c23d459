//! Retrieval orchestrator.
//!
//! One `retrieve` call runs the fixed stage order: embed the query, query
//! the dense and sparse arms, fuse, rerank, then judge grounding on the
//! final truncated list. Each call is a pure function of the query, the
//! corpus snapshots, and the current date; the embedding cache is the only
//! shared mutable state underneath.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

use tifo_core::config::RetrievalConfig;
use tifo_core::errors::{IndexError, TifoResult};
use tifo_core::filter::MetadataFilter;
use tifo_core::models::{DenseHit, RetrievalItem, RetrievalResult};
use tifo_core::traits::{IReranker, IVectorStore};
use tifo_embeddings::EmbeddingService;
use tifo_index::SparseIndex;

use crate::fusion::reciprocal_rank_fusion;
use crate::grounding::GroundingPolicy;

pub struct RetrievalEngine {
    pub(crate) embeddings: EmbeddingService,
    pub(crate) store: Arc<dyn IVectorStore>,
    pub(crate) sparse: Arc<SparseIndex>,
    reranker: Box<dyn IReranker>,
    policy: GroundingPolicy,
    config: RetrievalConfig,
}

impl RetrievalEngine {
    pub fn new(
        embeddings: EmbeddingService,
        store: Arc<dyn IVectorStore>,
        reranker: Box<dyn IReranker>,
        config: RetrievalConfig,
    ) -> Self {
        info!(
            reranker = reranker.name(),
            rrf_k = config.rrf_k,
            final_k = config.final_k,
            min_sources = config.min_sources,
            "retrieval engine initialized"
        );
        Self {
            embeddings,
            store,
            sparse: Arc::new(SparseIndex::new()),
            policy: GroundingPolicy::new(config.min_sources),
            reranker,
            config,
        }
    }

    /// Retrieve evidence for `query`, judged against today's date.
    pub fn retrieve(
        &self,
        query: &str,
        filter: Option<&MetadataFilter>,
    ) -> TifoResult<RetrievalResult> {
        self.retrieve_at(query, filter, self.config.final_k, Utc::now().date_naive())
    }

    /// Full-control variant: explicit result count and reference date.
    pub fn retrieve_at(
        &self,
        query: &str,
        filter: Option<&MetadataFilter>,
        final_k: usize,
        today: NaiveDate,
    ) -> TifoResult<RetrievalResult> {
        // Neither arm has anything to search: retryable, not "no results".
        if !self.sparse.is_ready() && self.store.document_count()? == 0 {
            return Err(IndexError::NotReady.into());
        }

        // Embedding failure is fatal for the call; the caller must be able
        // to distinguish "backend down" from "nothing found".
        let embedding = self.embeddings.embed_one(query, true)?;

        let dense_k = self.config.candidate_pool.max(final_k);
        let mut dense_hits = self.dense_query(&embedding, filter, dense_k)?;
        if dense_hits.is_empty() && filter.is_some() {
            // A too-narrow filter starves the pipeline; retry unfiltered
            // and let fusion plus grounding sort relevance out.
            debug!("metadata filter matched nothing, retrying unfiltered");
            dense_hits = self.dense_query(&embedding, None, dense_k)?;
        }

        let sparse_hits = if self.sparse.is_ready() {
            self.sparse.search(query, self.config.candidate_pool)?
        } else {
            Vec::new()
        };
        debug!(
            dense = dense_hits.len(),
            sparse = sparse_hits.len(),
            "candidate pools fetched"
        );

        let fused = reciprocal_rank_fusion(
            vec![
                dense_hits.into_iter().map(RetrievalItem::from).collect(),
                sparse_hits.into_iter().map(RetrievalItem::from).collect(),
            ],
            self.config.rrf_k,
        );

        let ranked = self.reranker.rerank(query, fused, final_k)?;
        let result = self.policy.evaluate(ranked, today);
        info!(
            results = result.results.len(),
            citations = result.citations.len(),
            grounded = result.grounded,
            has_conflict = result.has_conflict,
            "retrieve complete"
        );
        Ok(result)
    }

    /// Dense arm query. A store failure degrades to sparse-only when the
    /// sparse index can carry the call; without it the error propagates.
    fn dense_query(
        &self,
        embedding: &[f32],
        filter: Option<&MetadataFilter>,
        top_k: usize,
    ) -> TifoResult<Vec<DenseHit>> {
        match self.store.query(embedding, filter, top_k) {
            Ok(hits) => Ok(hits),
            Err(e) if self.sparse.is_ready() => {
                warn!(error = %e, "dense query failed, degrading to sparse-only");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }
}
