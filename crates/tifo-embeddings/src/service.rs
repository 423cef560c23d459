//! EmbeddingService — cache-first batched embedding generation.
//!
//! Determines the role prefix, looks every text up in the cache, sends only
//! the misses to the remote provider in bounded batches, and writes new
//! vectors through the cache before returning. A remote failure fails the
//! whole call; partial results are never returned.

use tracing::{debug, info};

use tifo_core::config::EmbeddingConfig;
use tifo_core::errors::{EmbeddingError, TifoResult};
use tifo_core::traits::IEmbeddingProvider;

use crate::cache::CacheCoordinator;
use crate::providers::HttpProvider;

/// Role prefixes for instruction-tuned (e5-family) models.
const QUERY_PREFIX: &str = "query: ";
const PASSAGE_PREFIX: &str = "passage: ";

pub struct EmbeddingService {
    provider: Box<dyn IEmbeddingProvider>,
    cache: CacheCoordinator,
    batch_size: usize,
    use_role_prefixes: bool,
}

/// Only e5-family models expect instruction prefixes.
fn uses_role_prefixes(model: &str) -> bool {
    model.to_lowercase().contains("e5")
}

impl EmbeddingService {
    pub fn new(
        provider: Box<dyn IEmbeddingProvider>,
        cache: CacheCoordinator,
        batch_size: usize,
    ) -> Self {
        let use_role_prefixes = uses_role_prefixes(provider.model());
        info!(
            model = provider.model(),
            batch_size,
            role_prefixes = use_role_prefixes,
            "embedding service initialized"
        );
        Self {
            provider,
            cache,
            batch_size: batch_size.max(1),
            use_role_prefixes,
        }
    }

    /// Wire the production HTTP provider and durable cache from config.
    pub fn from_config(config: &EmbeddingConfig) -> TifoResult<Self> {
        let provider = HttpProvider::new(config)?;
        let cache = CacheCoordinator::open(&config.cache_path, config.l1_cache_size)?;
        Ok(Self::new(Box::new(provider), cache, config.batch_size))
    }

    /// Embed texts, reading and writing the cache. Only cache misses reach
    /// the remote provider.
    pub fn embed(&self, texts: &[String], is_query: bool) -> TifoResult<Vec<Vec<f32>>> {
        let prefix = self.prefix(is_query);
        let model = self.provider.model().to_string();

        let mut out: Vec<Option<Vec<f32>>> = vec![None; texts.len()];
        let mut misses: Vec<usize> = Vec::new();
        for (i, text) in texts.iter().enumerate() {
            match self.cache.get(&model, text, prefix)? {
                Some(vector) => out[i] = Some(vector),
                None => misses.push(i),
            }
        }
        debug!(
            total = texts.len(),
            misses = misses.len(),
            "embedding cache lookup"
        );

        for chunk in misses.chunks(self.batch_size) {
            let batch: Vec<String> = chunk
                .iter()
                .map(|&i| format!("{prefix}{}", texts[i]))
                .collect();
            let vectors = self.provider.embed_batch(&batch)?;
            if vectors.len() != chunk.len() {
                return Err(EmbeddingError::UnexpectedShape {
                    detail: format!(
                        "provider returned {} vectors for {} texts",
                        vectors.len(),
                        chunk.len()
                    ),
                }
                .into());
            }
            for (&i, vector) in chunk.iter().zip(vectors.iter()) {
                self.cache.set(&model, &texts[i], prefix, vector)?;
                out[i] = Some(vector.clone());
            }
        }

        out.into_iter()
            .map(|slot| {
                slot.ok_or_else(|| {
                    EmbeddingError::UnexpectedShape {
                        detail: "unfilled embedding slot".to_string(),
                    }
                    .into()
                })
            })
            .collect()
    }

    /// Embed a single text.
    pub fn embed_one(&self, text: &str, is_query: bool) -> TifoResult<Vec<f32>> {
        let mut vectors = self.embed(&[text.to_string()], is_query)?;
        vectors.pop().ok_or_else(|| {
            EmbeddingError::UnexpectedShape {
                detail: "provider returned no vector for a single input".to_string(),
            }
            .into()
        })
    }

    fn prefix(&self, is_query: bool) -> &'static str {
        if !self.use_role_prefixes {
            return "";
        }
        if is_query {
            QUERY_PREFIX
        } else {
            PASSAGE_PREFIX
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Deterministic provider that records every batch it is asked for.
    /// Batch history is shared so tests keep a handle after boxing.
    struct RecordingProvider {
        model: String,
        batches: Arc<Mutex<Vec<Vec<String>>>>,
    }

    impl RecordingProvider {
        fn new(model: &str) -> (Self, Arc<Mutex<Vec<Vec<String>>>>) {
            let batches = Arc::new(Mutex::new(Vec::new()));
            let provider = Self {
                model: model.to_string(),
                batches: Arc::clone(&batches),
            };
            (provider, batches)
        }
    }

    impl IEmbeddingProvider for RecordingProvider {
        fn embed_batch(&self, texts: &[String]) -> TifoResult<Vec<Vec<f32>>> {
            self.batches.lock().unwrap().push(texts.to_vec());
            Ok(texts
                .iter()
                .map(|t| {
                    let mut v = vec![t.len() as f32, 1.0, 2.0];
                    crate::pooling::l2_normalize(&mut v);
                    v
                })
                .collect())
        }

        fn model(&self) -> &str {
            &self.model
        }
    }

    struct FailingProvider;

    impl IEmbeddingProvider for FailingProvider {
        fn embed_batch(&self, _texts: &[String]) -> TifoResult<Vec<Vec<f32>>> {
            Err(EmbeddingError::Unavailable {
                attempts: 4,
                reason: "endpoint down".to_string(),
            }
            .into())
        }

        fn model(&self) -> &str {
            "offline-model"
        }
    }

    fn service_with(provider: Box<dyn IEmbeddingProvider>, batch_size: usize) -> EmbeddingService {
        EmbeddingService::new(provider, CacheCoordinator::in_memory(64).unwrap(), batch_size)
    }

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn second_call_is_served_from_cache() {
        let (provider, batches) = RecordingProvider::new("plain-model");
        let service = service_with(Box::new(provider), 64);

        let first = service.embed(&texts(&["lukaku joined napoli"]), false).unwrap();
        let second = service.embed(&texts(&["lukaku joined napoli"]), false).unwrap();

        // Bit-identical after the first cache write.
        assert_eq!(first, second);
        assert_eq!(batches.lock().unwrap().len(), 1);
    }

    #[test]
    fn only_misses_go_remote() {
        let (provider, batches) = RecordingProvider::new("plain-model");
        let service = service_with(Box::new(provider), 64);
        service.embed(&texts(&["a", "b"]), false).unwrap();
        // "b" is cached; only "c" should be sent now.
        let out = service.embed(&texts(&["b", "c"]), false).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(batches.lock().unwrap()[1], texts(&["c"]));
    }

    #[test]
    fn batches_are_split_at_batch_size() {
        let (provider, batches) = RecordingProvider::new("plain-model");
        let service = service_with(Box::new(provider), 2);

        let inputs: Vec<String> = (0..5).map(|i| format!("doc {i}")).collect();
        service.embed(&inputs, false).unwrap();

        let sizes: Vec<usize> = batches.lock().unwrap().iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }

    #[test]
    fn e5_models_get_role_prefixes() {
        let (provider, batches) = RecordingProvider::new("intfloat/multilingual-e5-base");
        let service = service_with(Box::new(provider), 64);

        service.embed(&texts(&["chi gioca in porta"]), true).unwrap();
        service.embed(&texts(&["il portiere titolare"]), false).unwrap();

        let batches = batches.lock().unwrap();
        assert_eq!(batches[0][0], "query: chi gioca in porta");
        assert_eq!(batches[1][0], "passage: il portiere titolare");
    }

    #[test]
    fn plain_models_get_no_prefix() {
        let (provider, batches) = RecordingProvider::new("plain-model");
        let service = service_with(Box::new(provider), 64);

        service.embed(&texts(&["some text"]), true).unwrap();

        assert_eq!(batches.lock().unwrap()[0][0], "some text");
    }

    #[test]
    fn query_and_passage_roles_cache_separately_for_e5() {
        let (provider, batches) = RecordingProvider::new("e5-small");
        let service = service_with(Box::new(provider), 64);

        service.embed(&texts(&["same text"]), true).unwrap();
        service.embed(&texts(&["same text"]), false).unwrap();

        // Different role prefixes hash to different cache keys.
        assert_eq!(batches.lock().unwrap().len(), 2);
    }

    #[test]
    fn provider_failure_fails_the_whole_call() {
        let service = service_with(Box::new(FailingProvider), 64);
        let err = service.embed(&texts(&["anything"]), true).unwrap_err();
        assert!(err.to_string().contains("unavailable"));
    }

    #[test]
    fn empty_input_returns_empty_output() {
        let (provider, _batches) = RecordingProvider::new("plain-model");
        let service = service_with(Box::new(provider), 64);
        assert!(service.embed(&[], true).unwrap().is_empty());
    }

    #[test]
    fn vectors_are_unit_norm() {
        let (provider, _batches) = RecordingProvider::new("plain-model");
        let service = service_with(Box::new(provider), 64);
        let out = service.embed(&texts(&["normalize me"]), false).unwrap();
        let norm: f32 = out[0].iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }
}
