//! Error taxonomy for provider operations
//!
//! Every failure an adapter can hit is a [`ProviderError`]. The framework
//! boundary turns these into user-facing diagnostics; nothing here panics or
//! retries.

use reqwest::StatusCode;
use thiserror::Error;

use crate::framework::Diagnostic;

/// Errors raised while executing a resource or data-source operation
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request payload could not be serialized
    #[error("could not marshal request payload: {0}")]
    Encode(#[source] serde_json::Error),

    /// The response body could not be decoded into the expected shape
    #[error("could not parse response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The request could not be built (bad URL, bad header value, client setup)
    #[error("could not create HTTP request: {0}")]
    Request(String),

    /// Network level failure: DNS, connect, TLS, reading the body
    #[error("could not send HTTP request to {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The operation deadline passed before the response arrived
    #[error("deadline exceeded while waiting for {url}")]
    DeadlineExceeded { url: String },

    /// The caller cancelled the operation
    #[error("request to {url} was cancelled")]
    Cancelled { url: String },

    /// The API answered with a status outside the accepted set
    #[error("failed to {operation}: {status} - {body}")]
    Api {
        operation: String,
        status: StatusCode,
        body: String,
    },

    /// The remote entity does not exist (404)
    #[error("failed to {operation}: 404 Not Found at {url} - {body}")]
    NotFound {
        operation: String,
        url: String,
        body: String,
    },

    /// An import identifier that does not match the resource's identity format
    #[error("import ID must be in the format '{expected}', got: {id}")]
    InvalidImportId { id: String, expected: &'static str },

    /// A plan, state or config document that does not fit the resource model
    #[error("invalid {kind} document: {source}")]
    InvalidDocument {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ProviderError {
    /// Whether this error means the remote entity is gone
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound { .. })
    }

    /// Short diagnostic summary for the error category
    pub fn summary(&self) -> &'static str {
        match self {
            ProviderError::Encode(_) => "Error marshaling request",
            ProviderError::Decode { .. } => "Error parsing response",
            ProviderError::Request(_) => "Error creating HTTP request",
            ProviderError::Transport { .. } => "Error sending HTTP request",
            ProviderError::DeadlineExceeded { .. } => "Request timed out",
            ProviderError::Cancelled { .. } => "Request cancelled",
            ProviderError::Api { .. } => "API Error",
            ProviderError::NotFound { .. } => "Not Found",
            ProviderError::InvalidImportId { .. } => "Invalid Import ID",
            ProviderError::InvalidDocument { .. } => "Invalid Terraform Value",
        }
    }

    /// Convert into an error diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.summary(), self.to_string())
    }
}

impl From<ProviderError> for Diagnostic {
    fn from(err: ProviderError) -> Self {
        err.to_diagnostic()
    }
}

pub type Result<T, E = ProviderError> = std::result::Result<T, E>;
