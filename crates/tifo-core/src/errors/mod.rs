//! Error types for the tifo pipeline, one enum per subsystem.

mod embedding_error;
mod index_error;
mod store_error;

pub use embedding_error::EmbeddingError;
pub use index_error::IndexError;
pub use store_error::StoreError;

/// Top-level error aggregating all subsystem errors.
#[derive(Debug, thiserror::Error)]
pub enum TifoError {
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type TifoResult<T> = Result<T, TifoError>;
