//! Linesplice CLI binary
//!
//! This is the main entry point for the linesplice command-line interface.
//! The CLI is a thin adapter over the library - NO splice logic is implemented here.

use linesplice::cli::{CliErrorPayload, CliSuccessPayload, Commands};
use linesplice::document::SpliceBoundary;
use linesplice::splice::SpliceRequest;
use linesplice::SpliceError;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Text lines for the console plus structured data for `--json`.
struct CommandOutput {
    lines: Vec<String>,
    data: Option<Value>,
}

fn main() -> ExitCode {
    let cli = linesplice::cli::parse_args();

    if cli.verbose {
        env_logger::init();
    }

    let result = match cli.command {
        Commands::Splice {
            file,
            with_: replacement_file,
            start,
            end,
            expect_hash,
            preview,
            create_backup,
            operation_id,
        } => {
            let mut request =
                SpliceRequest::new(file, replacement_file, SpliceBoundary::new(start, end));
            request.expected_hash = expect_hash;
            if preview {
                execute_preview(&request)
            } else {
                execute_splice(request, create_backup, operation_id)
            }
        }

        Commands::Plan { file } => execute_plan(&file),

        Commands::Undo { manifest } => execute_undo(&manifest),
    };

    match result {
        Ok(output) => {
            if cli.json {
                let message = output.lines.last().cloned().unwrap_or_default();
                let payload = match output.data {
                    Some(data) => CliSuccessPayload::with_data(message, data),
                    None => CliSuccessPayload::message_only(message),
                };
                print_json(&payload);
            } else {
                for line in output.lines {
                    println!("{}", line);
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            if cli.json {
                print_json(&CliErrorPayload::from_error(&e));
            } else {
                eprintln!("Error: {}", e);
                if let Some(hint) = e.hint() {
                    eprintln!("Hint: {}", hint);
                }
            }
            ExitCode::from(1)
        }
    }
}

fn print_json<T: serde::Serialize>(payload: &T) {
    match serde_json::to_string_pretty(payload) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error: failed to serialize output: {}", e),
    }
}

fn to_data<T: serde::Serialize>(value: &T) -> Option<Value> {
    serde_json::to_value(value).ok()
}

/// Execute the splice command.
///
/// Prints the first preserved tail line, then the confirmation.
fn execute_splice(
    mut request: SpliceRequest,
    create_backup: bool,
    operation_id: Option<String>,
) -> Result<CommandOutput, SpliceError> {
    use linesplice::splice::{apply_splice, apply_splice_with_backup};

    let (summary, manifest) = if create_backup {
        request.target = std::fs::canonicalize(&request.target)
            .map_err(|e| SpliceError::io(&request.target, e))?;
        let workspace_dir = workspace_dir_for(&request.target)?;
        let (summary, manifest) = apply_splice_with_backup(&request, &workspace_dir, operation_id)?;
        (summary, Some(manifest))
    } else {
        (apply_splice(&request)?, None)
    };

    let end = summary.boundary.end;
    let mut lines = vec![match &summary.tail_line {
        Some(line) => format!("Index {} (line {}): {}", end, end + 1, line),
        None => format!("Index {} (line {}): <end of file>", end, end + 1),
    }];
    if let Some(manifest) = &manifest {
        lines.push(format!("Backup manifest: {}", manifest.display()));
    }
    lines.push(format!("Successfully patched {}", summary.file.display()));

    let mut data = to_data(&summary);
    if let (Some(Value::Object(map)), Some(manifest)) = (data.as_mut(), &manifest) {
        map.insert(
            "backup_manifest".to_string(),
            Value::String(manifest.to_string_lossy().into_owned()),
        );
    }

    Ok(CommandOutput { lines, data })
}

/// Execute the splice command in preview mode.
fn execute_preview(request: &SpliceRequest) -> Result<CommandOutput, SpliceError> {
    let report = linesplice::splice::preview_splice(request)?;

    let tail = report.tail_line.as_deref().unwrap_or("<end of file>");
    let lines = vec![
        format!(
            "Index {} (line {}): {}",
            request.boundary.end,
            request.boundary.end + 1,
            tail
        ),
        format!(
            "Preview {}: lines {}-{} (-{} +{} lines, -{} +{} bytes), {} lines after",
            report.file,
            report.line_start,
            report.line_end,
            report.lines_removed,
            report.lines_added,
            report.bytes_removed,
            report.bytes_added,
            report.lines_after
        ),
    ];

    Ok(CommandOutput {
        lines,
        data: to_data(&report),
    })
}

/// Execute the plan command.
///
/// Relative paths inside the plan resolve against the plan's directory.
fn execute_plan(plan_path: &Path) -> Result<CommandOutput, SpliceError> {
    let workspace_dir = workspace_dir_for(plan_path)?;
    let summaries = linesplice::plan::execute_plan(plan_path, &workspace_dir)?;

    let mut lines: Vec<String> = summaries
        .iter()
        .enumerate()
        .map(|(i, s)| {
            format!(
                "Step {}: patched {} at lines {}",
                i + 1,
                s.file.display(),
                s.boundary
            )
        })
        .collect();
    lines.push(format!(
        "Plan executed successfully: {} steps completed",
        summaries.len()
    ));

    Ok(CommandOutput {
        lines,
        data: to_data(&summaries),
    })
}

/// Execute the undo command.
fn execute_undo(manifest_path: &Path) -> Result<CommandOutput, SpliceError> {
    use linesplice::splice::{restore_from_manifest, workspace_root_for_manifest};

    let manifest_path = std::fs::canonicalize(manifest_path)
        .map_err(|e| SpliceError::io(manifest_path, e))?;
    let workspace_root = workspace_root_for_manifest(&manifest_path)?;
    let restored = restore_from_manifest(&manifest_path, &workspace_root)?;

    Ok(CommandOutput {
        lines: vec![format!("Restored {} file(s) from backup", restored)],
        data: Some(serde_json::json!({ "restored": restored })),
    })
}

fn workspace_dir_for(path: &Path) -> Result<PathBuf, SpliceError> {
    match path.parent() {
        Some(dir) if dir.as_os_str().is_empty() => Ok(PathBuf::from(".")),
        Some(dir) => Ok(dir.to_path_buf()),
        None => Err(SpliceError::Other(format!(
            "Cannot determine workspace directory for {}",
            path.display()
        ))),
    }
}
