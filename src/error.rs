use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by every stage of the topic pipeline.
/// Nothing is retried or repaired; the caller decides what to do.
#[derive(Error, Debug)]
pub enum TopicError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unsupported factorization method: {0:?} (expected \"SVD\" or \"NMF\")")]
    UnsupportedMethod(String),

    #[error("factorization failed: {0}")]
    Factorization(String),

    #[error("corrupted cache entry at {path}: {reason}")]
    CacheCorruption { path: PathBuf, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TopicError>;

impl TopicError {
    /// Cache corruption for `path`
    pub fn corruption(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        TopicError::CacheCorruption {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<serde_cbor::Error> for TopicError {
    fn from(e: serde_cbor::Error) -> Self {
        TopicError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for TopicError {
    fn from(e: serde_json::Error) -> Self {
        TopicError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for TopicError {
    fn from(e: toml::de::Error) -> Self {
        TopicError::Config(e.to_string())
    }
}
