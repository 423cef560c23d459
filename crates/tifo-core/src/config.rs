//! Configuration structs with env-driven constructors.
//!
//! Defaults live in [`crate::constants`]; `from_env()` reads the
//! `TIFO_*` environment surface and falls back to those defaults.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants;

/// Embedding backend and cache configuration.
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    /// Remote embedding model name. Model families that require
    /// instruction prefixes (e5) are detected from this name.
    pub model: String,
    /// Feature-extraction endpoint root; the model name is appended.
    pub endpoint: String,
    /// Bearer credential for the endpoint.
    pub api_token: Option<String>,
    /// Path of the durable (L2) embedding cache database.
    pub cache_path: PathBuf,
    /// Maximum texts per remote batch.
    pub batch_size: usize,
    /// Remote request timeout.
    pub request_timeout: Duration,
    /// Remote call retry budget.
    pub max_attempts: u32,
    /// Base backoff delay between retries.
    pub base_delay: Duration,
    /// L1 in-memory cache capacity (entries).
    pub l1_cache_size: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: constants::DEFAULT_EMBED_MODEL.to_string(),
            endpoint: constants::DEFAULT_EMBED_ENDPOINT.to_string(),
            api_token: None,
            cache_path: PathBuf::from("./embedding_cache.sqlite"),
            batch_size: constants::DEFAULT_BATCH_SIZE,
            request_timeout: Duration::from_secs(constants::DEFAULT_REQUEST_TIMEOUT_SECS),
            max_attempts: constants::DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(constants::DEFAULT_BASE_DELAY_MS),
            l1_cache_size: constants::DEFAULT_L1_CACHE_SIZE,
        }
    }
}

impl EmbeddingConfig {
    /// Build from the environment: `TIFO_EMBED_MODEL`, `TIFO_EMBED_ENDPOINT`,
    /// `TIFO_EMBED_TOKEN`, `TIFO_CACHE_PATH`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            model: env_string("TIFO_EMBED_MODEL").unwrap_or(defaults.model),
            endpoint: env_string("TIFO_EMBED_ENDPOINT").unwrap_or(defaults.endpoint),
            api_token: env_string("TIFO_EMBED_TOKEN"),
            cache_path: env_string("TIFO_CACHE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_path),
            ..defaults
        }
    }
}

/// Retrieval and grounding configuration.
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// RRF damping constant `k`.
    pub rrf_k: u32,
    /// Default number of results returned per call.
    pub final_k: usize,
    /// Minimum distinct citations for a grounded answer.
    pub min_sources: usize,
    /// Candidate pool size fetched from each retrieval arm.
    pub candidate_pool: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            rrf_k: constants::DEFAULT_RRF_K,
            final_k: constants::DEFAULT_FINAL_K,
            min_sources: constants::DEFAULT_MIN_SOURCES,
            candidate_pool: constants::CANDIDATE_POOL,
        }
    }
}

impl RetrievalConfig {
    /// Build from the environment: `TIFO_RRF_K`, `TIFO_FINAL_K`,
    /// `TIFO_MIN_SOURCES`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            rrf_k: env_parse("TIFO_RRF_K").unwrap_or(defaults.rrf_k),
            final_k: env_parse("TIFO_FINAL_K").unwrap_or(defaults.final_k),
            min_sources: env_parse("TIFO_MIN_SOURCES").unwrap_or(defaults.min_sources),
            ..defaults
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_string(key).and_then(|v| v.parse().ok())
}
