//! Error types for mesh I/O operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for mesh I/O operations.
pub type IoResult<T> = Result<T, IoError>;

/// Errors that can occur while reading or writing STL files.
#[derive(Debug, Error)]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// The content is neither a text nor a binary STL.
    #[error("unrecognized mesh format: {message}")]
    Format {
        /// Description of what was invalid.
        message: String,
    },

    /// A binary STL declares more triangles than the file holds.
    #[error("truncated STL: header declares {expected} triangles, data holds {available}")]
    Truncated {
        /// Triangle count declared in the header.
        expected: u32,
        /// Complete triangle records actually present.
        available: u64,
    },

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IoError {
    /// Create a `Format` error with the given message.
    #[must_use]
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = IoError::format("file too small");
        assert_eq!(format!("{err}"), "unrecognized mesh format: file too small");

        let err = IoError::Truncated {
            expected: 12,
            available: 3,
        };
        let text = format!("{err}");
        assert!(text.contains("12"));
        assert!(text.contains('3'));
    }
}
