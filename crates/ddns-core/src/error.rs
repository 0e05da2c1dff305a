//! Error types for the DDNS system
//!
//! Every external-call failure inside the reconciliation loop ends up as one
//! of these variants. The engine logs them and moves on; only
//! [`Error::Config`] is treated as fatal, and only at startup.

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS system
#[derive(Error, Debug)]
pub enum Error {
    /// Startup/configuration errors (missing credentials, bad flags,
    /// client construction failure)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Record not found in the provider
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Transport failure, timeout, non-200 status or unusable response body
    #[error("Network error: {0}")]
    Network(String),

    /// Provider-specific error (rejected change, malformed record data)
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether this error is the expected "record does not exist yet" outcome
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
