//! # tifo-embeddings
//!
//! Embedding generation for the tifo pipeline: a remote feature-extraction
//! provider with bounded retry, defensive response pooling, and a two-tier
//! (moka + SQLite) embedding cache.

pub mod cache;
pub mod pooling;
pub mod providers;
pub mod retry;
pub mod service;

pub use cache::CacheCoordinator;
pub use providers::HttpProvider;
pub use retry::RetryPolicy;
pub use service::EmbeddingService;
