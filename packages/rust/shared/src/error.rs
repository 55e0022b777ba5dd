//! Error types for Lexi.
//!
//! Library crates use [`LexiError`] via `thiserror`.
//! App crates (cli/tui) wrap this with `color-eyre` for rich diagnostics.
//!
//! A query that matches no knowledge record is not an error: it produces the
//! fallback answer.

use std::path::PathBuf;

/// Top-level error type for all Lexi operations.
#[derive(Debug, thiserror::Error)]
pub enum LexiError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Knowledge record validation error (blank keyword, empty keyword list, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// The conversation session has stopped and no longer accepts commands.
    #[error("session error: {0}")]
    Session(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LexiError>;

impl LexiError {
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = LexiError::config("pacing_delay_ms must be a number");
        assert_eq!(err.to_string(), "config error: pacing_delay_ms must be a number");

        let err = LexiError::validation("record 2 has a blank keyword");
        assert!(err.to_string().contains("record 2"));

        let err = LexiError::Session("session closed".into());
        assert_eq!(err.to_string(), "session error: session closed");
    }

    #[test]
    fn io_error_keeps_path() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = LexiError::io("/tmp/judgment.txt", source);
        assert!(err.to_string().contains("judgment.txt"));
    }
}
