/// Sparse-index subsystem errors.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("index not ready: no corpus snapshot has been built yet")]
    NotReady,

    #[error("index rebuild failed: {reason}")]
    RebuildFailed { reason: String },
}
