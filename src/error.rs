//! Error types for umapi-cli.
//!
//! Two classes of failure exist and never mix:
//! - [`ValidationError`] is raised while an action is being built, before
//!   anything reaches the queue or the network.
//! - [`UmapiError`] covers everything the application itself can fail on
//!   (configuration, transport, parsing, I/O).
//!
//! Remote rejections of individual actions are neither; they are recorded on
//! the action as [`crate::actions::ExecutionError`]s.

use thiserror::Error;

/// Construction-time failure for an action.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Identity type is not one of `adobeID`, `enterpriseID`, `federatedID`.
    #[error("'{0}' is an invalid identity type (expected adobeID, enterpriseID or federatedID)")]
    InvalidIdentityType(String),

    /// Country code is not a two-letter alphabetic code.
    #[error("'{0}' is not a valid two-letter country code")]
    InvalidCountryFormat(String),

    /// A required input was absent or empty.
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    /// An update would not change anything.
    #[error("no changes requested for '{0}'")]
    NoChanges(String),

    /// A yes/no style column held something else.
    #[error("{field} must be Y or N (got '{value}')")]
    InvalidFlag {
        /// Column name.
        field: &'static str,
        /// Offending value.
        value: String,
    },
}

/// Application-level error.
#[derive(Error, Debug)]
pub enum UmapiError {
    /// Configuration is missing or malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An action could not be built from the given input.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// A row of a bulk input file could not be turned into an action.
    #[error("Invalid input on record {record}: {source}")]
    InvalidRecord {
        /// 1-based record number, not counting the CSV header.
        record: usize,
        source: ValidationError,
    },

    /// Token exchange with the identity service failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The HTTP request could not be completed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// The requested user or group does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// JSON could not be read or written.
    #[error("JSON error: {0}")]
    Parse(#[from] serde_json::Error),

    /// CSV could not be read or written.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File or stream I/O failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl UmapiError {
    /// Whether a retry of the same request may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Api { status: 429 | 502 | 503 | 504, .. })
    }
}
