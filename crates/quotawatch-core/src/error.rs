//! Error types for the Quotawatch core library
//!
//! Every terminal failure of the request layer is returned to the caller.
//! The core never swallows or presents errors itself.

use crate::http::RequestFailure;
use thiserror::Error;

/// Main error type for Quotawatch operations
#[derive(Error, Debug)]
pub enum Error {
    /// Terminal failure of the resilient request client, carried verbatim
    #[error("{0}")]
    Request(#[from] RequestFailure),

    /// The identity endpoint answered with a non-success status
    #[error("{message}")]
    Identity {
        message: String,
        status_code: Option<u16>,
    },

    /// Configuration errors (bad host URLs, unusable settings)
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// A required header could not be encoded for the wire
    #[error("Invalid header {name}: {message}")]
    InvalidHeader { name: String, message: String },

    /// The underlying HTTP client could not be constructed
    #[error("HTTP client error: {message}")]
    HttpClient {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Generic internal error with context
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// HTTP status code attached to the failure, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Request(failure) => failure.status_code,
            Error::Identity { status_code, .. } => *status_code,
            _ => None,
        }
    }

    /// The request-layer failure, when this error came from the host loop
    pub fn as_request_failure(&self) -> Option<&RequestFailure> {
        match self {
            Error::Request(failure) => Some(failure),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal {
            message: err.to_string(),
            source: err,
        }
    }
}
