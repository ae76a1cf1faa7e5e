//! Error types for faqpilot.
//!
//! Library crates use [`FaqPilotError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all faqpilot operations.
#[derive(Debug, thiserror::Error)]
pub enum FaqPilotError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while fetching a remote document.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Malformed binary document container.
    #[error("decode error: {message}")]
    Decode { message: String },

    /// Search index provisioning error (already exists, schema conflict).
    #[error("index provision error: {0}")]
    IndexProvision(String),

    /// A record write rejected by the search engine.
    #[error("index write error: {0}")]
    IndexWrite(String),

    /// Search query failure (engine unreachable, malformed query).
    #[error("query error: {0}")]
    Query(String),

    /// Completion model service error.
    #[error("completion error: {0}")]
    Completion(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (malformed corpus file, invalid format, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, FaqPilotError>;

impl FaqPilotError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a decode error from any displayable message.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
