use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Model error: {0}")]
    Llm(String),

    #[error("Text extraction failed: {0}")]
    Extraction(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Operation failed: {0}")]
    Operation(String),
}

impl Error {
    /// Short, stable name used when counting failures by type.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidConfig(_) => "InvalidConfig",
            Error::InvalidInput(_) => "InvalidInput",
            Error::NotFound(_) => "NotFound",
            Error::Index(_) => "Index",
            Error::Storage(_) => "Storage",
            Error::Llm(_) => "Llm",
            Error::Extraction(_) => "Extraction",
            Error::Timeout(_) => "Timeout",
            Error::Io(_) => "Io",
            Error::Json(_) => "Json",
            Error::Operation(_) => "Operation",
        }
    }

    /// Bad input fails the same way on every attempt.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Error::InvalidInput(_) | Error::InvalidConfig(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
