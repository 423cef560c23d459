//! Retrieval indexes: the sparse BM25 arm and the dense vector store.
//!
//! `SparseIndex` holds an immutable BM25 snapshot behind an atomic swap, so
//! searches never observe a half-built index. `SqliteVectorStore` is the
//! embedded dense arm: brute-force cosine over SQLite-stored embeddings,
//! good for corpora in the tens of thousands of documents.

pub mod bm25;
pub mod store;

pub use bm25::{Bm25Index, SparseIndex};
pub use store::SqliteVectorStore;
