use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid dimension {0}: must be positive")]
    InvalidDimension(usize),

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("length mismatch: {texts} texts but {vectors} vectors")]
    LengthMismatch { texts: usize, vectors: usize },

    #[error("i/o error on {}: {source}", path.display())]
    PersistenceIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid text list {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("corrupt index file {}: {reason}", path.display())]
    CorruptIndex { path: PathBuf, reason: String },

    #[error("store files at {} do not belong together: {reason}", prefix.display())]
    PartialPersistence { prefix: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, StoreError>;
