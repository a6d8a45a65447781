//! Error types for risk synthesis.

use thiserror::Error;

/// Risk synthesis errors.
#[derive(Debug, Error)]
pub enum RiskError {
    /// HTTP transport failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Malformed response body
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Non-success response from the completion API
    #[error("LLM API returned HTTP {status}: {body}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Leading part of the response body
        body: String,
    },

    /// The response carried no completion text
    #[error("LLM returned no completion")]
    EmptyResponse,

    /// No API key was configured
    #[error("Missing LLM API key")]
    MissingApiKey,

    /// Failure reported by a custom generator
    #[error("Generator error: {0}")]
    Generator(String),
}

/// Result type for risk operations.
pub type Result<T> = std::result::Result<T, RiskError>;
