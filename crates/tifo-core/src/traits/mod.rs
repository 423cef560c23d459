//! Trait seams between pipeline stages.

mod embedding;
mod reranker;
mod vector_store;

pub use embedding::IEmbeddingProvider;
pub use reranker::IReranker;
pub use vector_store::IVectorStore;
