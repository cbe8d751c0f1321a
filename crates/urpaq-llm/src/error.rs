use thiserror::Error;

use urpaq_core::error::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Model returned no choices")]
    EmptyResponse,
}

impl LlmError {
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 | 403 => LlmError::Authentication(body.to_string()),
            429 => LlmError::RateLimited,
            _ => LlmError::Api { status, message: body.to_string() },
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else if e.is_decode() {
            LlmError::Serialization(e.to_string())
        } else {
            LlmError::Network(e.to_string())
        }
    }
}

impl From<LlmError> for Error {
    fn from(e: LlmError) -> Self {
        Error::Llm(e.to_string())
    }
}
