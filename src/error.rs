//! Errors surfaced by the admin client.

use thiserror::Error;

/// Result type alias for admin operations.
pub type Result<T> = std::result::Result<T, AdminError>;

/// Failures of a single admin API round trip.
#[derive(Debug, Error)]
pub enum AdminError {
    /// The base address or admin path could not form a request target.
    #[error("Invalid URL: {url}")]
    InvalidUrl { url: String },

    /// The transport did not produce a well-formed HTTP response.
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    /// The admin API answered with a non-2xx status.
    #[error("WireMock server error: {status}")]
    ServerError { status: u16 },

    /// A response body could not be decoded into the expected schema.
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// The bounded wait elapsed before the call completed.
    #[error("Timed out after {elapsed_ms}ms waiting for the admin API")]
    Timeout { elapsed_ms: u64 },

    /// The blocking bridge could not run (runtime build failure or misuse).
    #[error("Runtime error: {message}")]
    Runtime { message: String },
}

impl AdminError {
    /// Create a new invalid URL error
    pub fn invalid_url<S: Into<String>>(url: S) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Create a new invalid response error
    pub fn invalid_response<S: Into<String>>(message: S) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Create a new runtime error
    pub fn runtime<S: Into<String>>(message: S) -> Self {
        Self::Runtime {
            message: message.into(),
        }
    }

    /// Whether this is a 404 from the admin API.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ServerError { status: 404 })
    }
}
