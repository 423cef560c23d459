//! HTTP feature-extraction provider.
//!
//! Talks to an HF-style inference endpoint: POST a batch of strings, get
//! back per-string vectors (or token-level tensors that need pooling).
//! Bearer-authenticated, explicit request timeout, bounded retry with
//! linear backoff. Exhausted retries surface as `Unavailable` — the batch
//! fails whole, never partially.

use reqwest::blocking::Client;
use serde_json::{json, Value};
use tracing::debug;

use tifo_core::config::EmbeddingConfig;
use tifo_core::errors::{EmbeddingError, TifoResult};
use tifo_core::traits::IEmbeddingProvider;

use crate::pooling;
use crate::retry::RetryPolicy;

pub struct HttpProvider {
    client: Client,
    url: String,
    token: Option<String>,
    model: String,
    retry: RetryPolicy,
}

impl HttpProvider {
    pub fn new(config: &EmbeddingConfig) -> TifoResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| EmbeddingError::Unavailable {
                attempts: 0,
                reason: format!("client build failed: {e}"),
            })?;

        let url = format!(
            "{}/{}",
            config.endpoint.trim_end_matches('/'),
            config.model
        );

        Ok(Self {
            client,
            url,
            token: config.api_token.clone(),
            model: config.model.clone(),
            retry: RetryPolicy::new(config.max_attempts, config.base_delay),
        })
    }

    fn post_batch(&self, texts: &[String]) -> Result<Value, String> {
        let mut request = self.client.post(&self.url).json(&json!({ "inputs": texts }));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().map_err(|e| e.to_string())?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("endpoint returned {status}"));
        }
        response.json::<Value>().map_err(|e| e.to_string())
    }
}

impl IEmbeddingProvider for HttpProvider {
    fn embed_batch(&self, texts: &[String]) -> TifoResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .retry
            .run(|| self.post_batch(texts))
            .map_err(|(attempts, reason)| EmbeddingError::Unavailable { attempts, reason })?;

        let mut vectors = pooling::pool_response(&response, texts.len())?;
        for vector in &mut vectors {
            pooling::l2_normalize(vector);
        }

        debug!(batch = texts.len(), "remote embedding batch complete");
        Ok(vectors)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
