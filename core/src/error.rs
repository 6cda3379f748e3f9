use thiserror::Error;

/// Errors raised by index construction, persistence and query evaluation.
#[derive(Error, Debug)]
pub enum SiftError {
    #[error("term not found in index: {0}")]
    TermNotFound(String),

    #[error("k = {k} exceeds the number of indexed documents ({total})")]
    KTooLarge { k: usize, total: usize },

    #[error("no query loaded")]
    QueryNotLoaded,

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("incompatible snapshot: format version {actual}, expected {expected}")]
    IncompatibleSnapshot { expected: u32, actual: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SiftError>;
