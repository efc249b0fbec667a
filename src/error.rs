//! Linesplice error types.
//!
//! All errors are typed and provide root cause information.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for linesplice operations.
#[derive(Error, Debug)]
pub enum SpliceError {
    /// I/O error during file operations.
    #[error("I/O error for path {path}: {source}")]
    Io {
        /// The file path that caused the I/O error.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// File content is not valid UTF-8.
    #[error("Encoding error in {file}: {source}")]
    Encoding {
        /// The file that failed to decode.
        file: PathBuf,
        /// The underlying decode error.
        #[source]
        source: std::str::Utf8Error,
    },

    /// Splice boundary does not fit the target.
    #[error(
        "Invalid splice boundary [{start}, {end}) in {file}: file has {line_count} lines"
    )]
    InvalidBoundary {
        /// The target file.
        file: PathBuf,
        /// First line index to remove (0-based, inclusive).
        start: usize,
        /// First line index to keep after the cut (0-based, exclusive end).
        end: usize,
        /// Number of lines in the target.
        line_count: usize,
    },

    /// Target content does not match the pinned hash.
    #[error("Hash mismatch for {file}: expected {expected}, found {actual}")]
    HashMismatch {
        /// The target file.
        file: PathBuf,
        /// Hash the caller expected.
        expected: String,
        /// Hash of the content on disk.
        actual: String,
    },

    /// Backup or restore failed.
    #[error("Backup error: {message}")]
    Backup {
        /// What went wrong.
        message: String,
    },

    /// Invalid plan schema.
    #[error("Invalid plan schema: {message}")]
    InvalidPlanSchema {
        /// The schema validation error message.
        message: String,
    },

    /// Plan execution failed at step.
    #[error("Plan execution failed at step {step}: {error}")]
    PlanExecutionFailed {
        /// The step number that failed (1-based).
        step: usize,
        /// The error that occurred.
        error: String,
    },

    /// Generic error with context.
    #[error("{0}")]
    Other(String),
}

impl SpliceError {
    /// Attach a path to an I/O error.
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        SpliceError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Stable identifier for this error variant, used in JSON payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            SpliceError::Io { .. } => "Io",
            SpliceError::Encoding { .. } => "Encoding",
            SpliceError::InvalidBoundary { .. } => "InvalidBoundary",
            SpliceError::HashMismatch { .. } => "HashMismatch",
            SpliceError::Backup { .. } => "Backup",
            SpliceError::InvalidPlanSchema { .. } => "InvalidPlanSchema",
            SpliceError::PlanExecutionFailed { .. } => "PlanExecutionFailed",
            SpliceError::Other(_) => "Other",
        }
    }

    /// File the error refers to, when known.
    pub fn file_path(&self) -> Option<&Path> {
        match self {
            SpliceError::Io { path, .. } => Some(path.as_path()),
            SpliceError::Encoding { file, .. }
            | SpliceError::InvalidBoundary { file, .. }
            | SpliceError::HashMismatch { file, .. } => Some(file.as_path()),
            _ => None,
        }
    }

    /// Remediation hint for the operator.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            SpliceError::InvalidBoundary { .. } => {
                Some("Boundaries must satisfy 0 <= start <= end <= line count of the target")
            }
            SpliceError::HashMismatch { .. } => Some(
                "The target changed since the boundaries were computed; re-inspect the file before splicing",
            ),
            SpliceError::Encoding { .. } => Some("Both files must be valid UTF-8"),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SpliceError {
    fn from(err: std::io::Error) -> Self {
        SpliceError::Io {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

/// Result type alias for linesplice operations.
pub type Result<T> = std::result::Result<T, SpliceError>;
