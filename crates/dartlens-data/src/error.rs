//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur during data operations.
#[derive(Debug, Error)]
pub enum DataError {
    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Data parsing error
    #[error("Data parsing error: {0}")]
    Parse(String),

    /// XML parsing error
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    /// Zip archive error
    #[error("Archive error: {0}")]
    Archive(String),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(String),

    /// DART returned a non-success status
    #[error("DART API error {status}: {message}")]
    DartApi {
        /// DART status code (e.g. "020" for rate limit exceeded)
        status: String,
        /// Message returned alongside the status
        message: String,
    },

    /// No corp code matched the company name
    #[error("Corp code not found for company: {0}")]
    CorpNotFound(String),

    /// Naver search API error
    #[error("Naver API error: {0}")]
    NaverApi(String),

    /// A required credential was not configured
    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<zip::result::ZipError> for DataError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Archive(err.to_string())
    }
}

impl From<quick_xml::Error> for DataError {
    fn from(err: quick_xml::Error) -> Self {
        Self::XmlParse(err.to_string())
    }
}
