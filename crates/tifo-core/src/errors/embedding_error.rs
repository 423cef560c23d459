/// Embedding subsystem errors.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("embedding backend unavailable after {attempts} attempts: {reason}")]
    Unavailable { attempts: u32, reason: String },

    #[error("unexpected embedding response shape: {detail}")]
    UnexpectedShape { detail: String },

    #[error("embedding cache error: {message}")]
    Cache { message: String },
}
