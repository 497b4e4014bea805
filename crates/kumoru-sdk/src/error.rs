//! Error types for the Kumoru client library.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur while configuring, signing, or sending requests.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file or value problem.
    #[error("configuration error: {reason}")]
    Config {
        /// The reason the configuration is unusable.
        reason: String,
    },

    /// A section is missing from the configuration file.
    #[error("section [{section}] not found in {path}")]
    MissingSection {
        /// Section name.
        section: String,
        /// Configuration file path.
        path: String,
    },

    /// The configuration file could not be parsed.
    #[error("invalid configuration file: {0}")]
    Ini(#[from] ini::ParseError),

    /// A request URL could not be parsed.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// Signing failed.
    #[error("signing error: {reason}")]
    Signing {
        /// The reason the request could not be signed.
        reason: String,
    },

    /// Signature verification failed.
    #[error("signature rejected: {reason}")]
    SignatureRejected {
        /// The reason the signature was rejected.
        reason: String,
    },

    /// Errors collected while building a request.
    #[error("invalid request: {}", .0.join("; "))]
    Build(Vec<String>),

    /// Transport-level failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with an error status.
    #[error("{status}: {body}")]
    Api {
        /// HTTP status returned by the service.
        status: StatusCode,
        /// Response body, usually the service's error message.
        body: String,
    },

    /// JSON encoding or decoding failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// HTTP status of an [`Error::Api`] error.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<ini::Error> for Error {
    fn from(err: ini::Error) -> Self {
        match err {
            ini::Error::Io(e) => Self::Io(e),
            ini::Error::Parse(e) => Self::Ini(e),
        }
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;
