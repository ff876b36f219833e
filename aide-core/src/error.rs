//! Error types shared across the aide workspace.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in aide operations.
///
/// The library performs no retries and no provider fallback: every
/// failure propagates to the caller unchanged. Presentation-layer
/// formatting is the caller's responsibility.
#[derive(Debug, Error)]
pub enum AideError {
    /// Missing or invalid configuration (credentials, provider name,
    /// inconsistent builder input).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A failure from a hosted model call: auth, rate limit, network,
    /// or a malformed response.
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// The provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The active provider does not support the requested operation.
    #[error("Provider '{provider}' does not support {operation}")]
    Capability {
        /// The provider lacking the capability.
        provider: String,
        /// The unsupported operation (e.g. "embeddings").
        operation: String,
    },

    /// A failure in the vector store persistence layer.
    #[error("Storage error ({backend}): {message}")]
    Storage {
        /// The storage backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A referenced local file does not exist.
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),
}

/// A convenience result type for aide operations.
pub type Result<T> = std::result::Result<T, AideError>;
