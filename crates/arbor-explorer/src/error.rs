// ABOUTME: Error types for explorer operations and query service failures
// ABOUTME: Service failures propagate unchanged to the caller and are never retried

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExplorerError>;

/// Failure reported by a query service implementation
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Request '{method}' failed: {message}")]
    Request { method: String, message: String },

    #[error("Language service is not available")]
    Unavailable,

    #[error("Failed to decode service response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ServiceError {
    /// Create a request failure for `method`
    pub fn request<M: Into<String>, S: Into<String>>(method: M, message: S) -> Self {
        Self::Request {
            method: method.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("Invalid resource URI '{uri}': {source}")]
    InvalidUri {
        uri: String,
        #[source]
        source: url::ParseError,
    },

    #[error("The URI of '{name}' is not available")]
    MissingUri { name: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExplorerError {
    /// Create an invalid URI error
    pub fn invalid_uri<S: Into<String>>(uri: S, source: url::ParseError) -> Self {
        Self::InvalidUri {
            uri: uri.into(),
            source,
        }
    }

    /// Create a missing URI error for the named node
    pub fn missing_uri<S: Into<String>>(name: S) -> Self {
        Self::MissingUri { name: name.into() }
    }

    /// Whether the failure came from the query service
    pub fn is_service_failure(&self) -> bool {
        matches!(self, ExplorerError::Service(_))
    }
}
