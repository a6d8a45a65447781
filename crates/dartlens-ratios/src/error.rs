//! Error types for ratio aggregation.
//!
//! Data-quality problems never surface here: an unparsable amount, an
//! account that cannot be found or an unavailable period all degrade to
//! absent values. Only caller-side contract violations are errors.

use thiserror::Error;

/// Result type for ratio operations.
pub type Result<T> = std::result::Result<T, RatioError>;

/// Errors raised at the aggregator entry point.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RatioError {
    /// The requested year list was empty
    #[error("No years were requested")]
    EmptyYears,

    /// The same year appeared more than once in the request
    #[error("Year {0} was requested more than once")]
    DuplicateYear(i32),

    /// A canonical account has an unusable candidate list
    #[error("Invalid candidates for {account}: {reason}")]
    InvalidCandidates {
        /// Canonical account key
        account: String,
        /// What is wrong with the candidate list
        reason: String,
    },

    /// A statement kind has an unusable alias list
    #[error("Invalid statement names for {kind}: {reason}")]
    InvalidStatementNames {
        /// Statement kind key
        kind: String,
        /// What is wrong with the alias list
        reason: String,
    },
}
