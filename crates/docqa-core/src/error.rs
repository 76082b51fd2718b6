use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// No index triple has been published yet.
    #[error("Index not ready: upload documents before querying")]
    NotReady,

    #[error("Ingestion failed: {0}")]
    Ingestion(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid vector for chunk {index}: non-finite component")]
    InvalidVector { index: usize },

    #[error("Embedding failed: {0:#}")]
    Embedding(anyhow::Error),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
