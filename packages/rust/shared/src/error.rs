//! Error types for MeetingPrep.
//!
//! Library crates use [`MeetingPrepError`] via `thiserror`.
//! App crates (cli/tui) wrap this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all MeetingPrep operations.
#[derive(Debug, thiserror::Error)]
pub enum MeetingPrepError {
    /// Configuration loading, validation, or missing credentials.
    #[error("config error: {message}")]
    Config { message: String },

    /// Transport-level HTTP failure (connect, TLS, body read).
    #[error("network error: {0}")]
    Network(String),

    /// The search service rejected the query or returned an unusable response.
    #[error("search error: {0}")]
    Search(String),

    /// The generation service rejected the prompt or returned an unusable response.
    #[error("generation error: {0}")]
    Generation(String),

    /// An external call exceeded its configured timeout.
    #[error("{service} timed out after {secs}s")]
    Timeout { service: &'static str, secs: u64 },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Form input validation error (duration range, blank company, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Session state was written out of order or twice.
    #[error("state error: {0}")]
    State(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, MeetingPrepError>;

impl MeetingPrepError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
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

    /// True for errors raised before any external call was attempted.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Config { .. } | Self::Validation { .. })
    }
}
