//! Error types for registry blob operations

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RegistryError>;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// Connection, DNS, TLS or body read failures
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The request's context was cancelled before it completed
    #[error("Request cancelled")]
    Cancelled,

    /// The request's context deadline passed before it completed
    #[error("Request deadline exceeded")]
    DeadlineExceeded,

    /// A request that completed with a non-success status
    #[error("Registry returned HTTP {status} for {url}")]
    Status { status: StatusCode, url: String },

    /// Malformed URL or header value
    #[error("Parse error: {0}")]
    Parse(String),

    /// Blob content did not decode into the requested type
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid digest '{digest}': {reason}")]
    InvalidDigest { digest: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl RegistryError {
    /// HTTP status carried by a [`RegistryError::Status`] error
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RegistryError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RegistryError::Cancelled | RegistryError::DeadlineExceeded)
    }

    /// Recover a registry error that was carried through an `io::Error`
    /// (blob readers report transport failures that way)
    pub fn from_io(err: std::io::Error) -> Self {
        if !err
            .get_ref()
            .is_some_and(|inner| inner.is::<RegistryError>())
        {
            return RegistryError::Io(err);
        }
        let kind = err.kind();
        match err.into_inner().map(|inner| inner.downcast::<RegistryError>()) {
            Some(Ok(inner)) => *inner,
            _ => RegistryError::Io(std::io::Error::from(kind)),
        }
    }
}

impl From<url::ParseError> for RegistryError {
    fn from(err: url::ParseError) -> Self {
        RegistryError::Parse(err.to_string())
    }
}

impl From<tokio::task::JoinError> for RegistryError {
    fn from(err: tokio::task::JoinError) -> Self {
        RegistryError::Task(err.to_string())
    }
}
