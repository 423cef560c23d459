//! # tifo-core
//!
//! Foundation crate for the tifo retrieval pipeline.
//! Defines the shared types, traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod document;
pub mod errors;
pub mod filter;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::{EmbeddingConfig, RetrievalConfig};
pub use document::{Document, Metadata};
pub use errors::{TifoError, TifoResult};
pub use filter::MetadataFilter;
pub use models::{Citation, DenseHit, RetrievalItem, RetrievalResult, SparseHit};
