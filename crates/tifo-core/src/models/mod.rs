//! Data models produced and consumed by the retrieval pipeline.

mod citation;
mod hits;
mod retrieval_item;
mod retrieval_result;

pub use citation::Citation;
pub use hits::{DenseHit, SparseHit};
pub use retrieval_item::RetrievalItem;
pub use retrieval_result::RetrievalResult;
