//! Error types for Poetry Hub.
//!
//! Library crates use [`PoetryHubError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all Poetry Hub operations.
#[derive(Debug, thiserror::Error)]
pub enum PoetryHubError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while talking to the completion service.
    #[error("network error: {0}")]
    Network(String),

    /// Text or response parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Database or storage layer error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Completion service error (API status, empty reply, bad payload).
    #[error("ai error: {0}")]
    Ai(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (blank input, unknown id, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// The import archive could not be opened or decompressed.
    #[error("archive format error: {message}")]
    ArchiveFormat { message: String },

    /// The import archive does not contain the expected data file.
    #[error("archive missing expected file '{name}'")]
    MissingEntry { name: String },

    /// The tabular data has no header row or no content at all.
    #[error("no readable rows: input is empty or has no header row")]
    EmptyInput,

    /// A single record could not be persisted. Never aborts an import.
    #[error("failed to persist \"{title}\": {message}")]
    RecordPersistence { title: String, message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PoetryHubError>;

impl PoetryHubError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create an archive format error from any displayable message.
    pub fn archive(msg: impl Into<String>) -> Self {
        Self::ArchiveFormat {
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

    /// Whether this error aborts a whole import rather than a single record.
    pub fn is_fatal_for_import(&self) -> bool {
        matches!(
            self,
            Self::ArchiveFormat { .. } | Self::MissingEntry { .. } | Self::EmptyInput
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = PoetryHubError::config("missing API key");
        assert_eq!(err.to_string(), "config error: missing API key");

        let err = PoetryHubError::MissingEntry {
            name: "PoetryFoundationData.csv".into(),
        };
        assert!(err.to_string().contains("PoetryFoundationData.csv"));
    }

    #[test]
    fn fatal_classification() {
        assert!(PoetryHubError::EmptyInput.is_fatal_for_import());
        assert!(PoetryHubError::archive("bad header").is_fatal_for_import());
        assert!(
            !PoetryHubError::RecordPersistence {
                title: "Sonnet".into(),
                message: "locked".into(),
            }
            .is_fatal_for_import()
        );
        assert!(!PoetryHubError::Storage("disk full".into()).is_fatal_for_import());
    }
}
