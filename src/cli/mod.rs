//! Command-line interface for linesplice.
//!
//! This module handles argument parsing and output payloads only.
//! NO file operations are performed here.

use clap::Parser;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

/// Linesplice: replace a line range of a text file with the contents of another file.
#[derive(Parser, Debug)]
#[command(name = "linesplice")]
#[command(author, version, about, long_about = None)]
#[command(subcommand_required = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit machine-readable JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,
}

/// Available linesplice commands.
#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Replace lines [start, end) of a file with the contents of another file.
    Splice {
        /// File to rewrite in place.
        #[arg(short, long)]
        file: PathBuf,

        /// File containing the replacement content.
        #[arg(short = 'w', long = "with", value_name = "FILE")]
        with_: PathBuf,

        /// First line to remove (0-based).
        #[arg(short, long)]
        start: usize,

        /// First line to keep after the removed range (0-based, exclusive).
        #[arg(short, long)]
        end: usize,

        /// Refuse to splice unless the target's SHA-256 matches.
        #[arg(long, value_name = "SHA256")]
        expect_hash: Option<String>,

        /// Report what would change without writing.
        #[arg(long, conflicts_with = "create_backup")]
        preview: bool,

        /// Create a backup before splicing.
        #[arg(long)]
        create_backup: bool,

        /// Optional operation ID for the backup (auto-generated UUID if not provided).
        #[arg(long, requires = "create_backup")]
        operation_id: Option<String>,
    },

    /// Execute a multi-step splice plan.
    Plan {
        /// Path to the plan.json file.
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Undo a previous splice by restoring from a backup manifest.
    Undo {
        /// Path to the backup manifest file.
        #[arg(short, long)]
        manifest: PathBuf,
    },
}

/// Parse command-line arguments.
///
/// Exits the process with clap's usage message on invalid arguments.
pub fn parse_args() -> Cli {
    Cli::parse()
}

/// JSON success payload for CLI responses.
#[derive(Serialize)]
pub struct CliSuccessPayload {
    /// Status indicator ("ok").
    pub status: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Optional structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl CliSuccessPayload {
    /// Construct a payload containing only the message.
    pub fn message_only(message: String) -> Self {
        Self {
            status: "ok",
            message,
            data: None,
        }
    }

    /// Construct a payload with structured data.
    pub fn with_data(message: String, data: Value) -> Self {
        Self {
            status: "ok",
            message,
            data: Some(data),
        }
    }
}

/// JSON error payload for CLI responses.
#[derive(Serialize)]
pub struct CliErrorPayload {
    /// Status indicator ("error").
    pub status: &'static str,
    /// Structured error details.
    pub error: ErrorDetails,
}

/// Details for a CLI error payload.
#[derive(Serialize)]
pub struct ErrorDetails {
    /// Error kind identifier (InvalidBoundary, etc.).
    pub kind: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Optional file context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Optional hint for remediation steps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl CliErrorPayload {
    /// Build payload from a SpliceError instance.
    pub fn from_error(error: &crate::SpliceError) -> Self {
        CliErrorPayload {
            status: "error",
            error: ErrorDetails {
                kind: error.kind(),
                message: error.to_string(),
                file: error
                    .file_path()
                    .map(|path| path.to_string_lossy().to_string()),
                hint: error.hint().map(|h| h.to_string()),
            },
        }
    }
}
