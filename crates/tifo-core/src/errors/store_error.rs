/// Dense-store subsystem errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("vector store query failed: {reason}")]
    VectorStore { reason: String },

    #[error("SQLite error: {message}")]
    Sqlite { message: String },

    #[error("corrupt stored embedding for document {id}: {detail}")]
    CorruptEmbedding { id: String, detail: String },
}
