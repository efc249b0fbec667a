//! Linesplice: line-range splicing for text files.
//!
//! Replaces a half-open range of lines in a target file with the full
//! contents of a replacement file. Boundaries are validated against the
//! loaded target, every line keeps its original terminator, and the result
//! is committed with an atomic rename.

#![warn(missing_docs)]

pub mod cli;
pub mod document;
pub mod error;
pub mod plan;
pub mod splice;

/// Re-export common error types for convenience.
pub use error::{Result, SpliceError};

/// Re-export the text model for convenience.
pub use document::{LineSequence, SpliceBoundary};

/// Linesplice version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
