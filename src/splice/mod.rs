//! Line-range replacement engine with atomic writes.
//!
//! This module provides the splice operation with:
//! - Boundary validation against the loaded target
//! - Optional pinning of the target to a known SHA-256
//! - Atomic file replacement (write temp + fsync + rename)
//! - File hash reporting (before/after)
//! - Optional backup before the destructive write

mod backup;

use crate::document::{LineSequence, SpliceBoundary};
use crate::error::{Result, SpliceError};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub use backup::{
    restore_from_manifest, workspace_root_for_manifest, BackupEntry, BackupManifest, BackupWriter,
};

/// A single splice to perform.
#[derive(Debug, Clone)]
pub struct SpliceRequest {
    /// File rewritten in place.
    pub target: PathBuf,
    /// File whose full contents are inserted.
    pub replacement: PathBuf,
    /// Lines of the target to drop.
    pub boundary: SpliceBoundary,
    /// SHA-256 the target must have before it is touched.
    pub expected_hash: Option<String>,
}

impl SpliceRequest {
    /// Create a new splice request.
    pub fn new(target: PathBuf, replacement: PathBuf, boundary: SpliceBoundary) -> Self {
        Self {
            target,
            replacement,
            boundary,
            expected_hash: None,
        }
    }

    /// Require the target to hash to `hash` before splicing.
    pub fn with_expected_hash(mut self, hash: impl Into<String>) -> Self {
        self.expected_hash = Some(hash.into());
        self
    }
}

/// Result summary for a spliced file.
#[derive(Debug, Clone, Serialize)]
pub struct SpliceSummary {
    /// Path of the patched file.
    pub file: PathBuf,
    /// Boundary that was applied.
    pub boundary: SpliceBoundary,
    /// First preserved tail line before the write, without its terminator.
    pub tail_line: Option<String>,
    /// Line count before splicing.
    pub lines_before: usize,
    /// Line count after splicing.
    pub lines_after: usize,
    /// SHA-256 before splicing.
    pub before_hash: String,
    /// SHA-256 after splicing.
    pub after_hash: String,
}

/// Description of what a splice would change, without writing.
#[derive(Debug, Clone, Serialize)]
pub struct PreviewReport {
    /// The file that would be patched.
    pub file: String,
    /// 1-based line number of the first removed line.
    pub line_start: usize,
    /// 1-based line number of the last removed line (equal to `line_start` for insertions).
    pub line_end: usize,
    /// Number of lines removed.
    pub lines_removed: usize,
    /// Number of lines inserted.
    pub lines_added: usize,
    /// Line count the file would have afterwards.
    pub lines_after: usize,
    /// Number of bytes removed.
    pub bytes_removed: usize,
    /// Number of bytes inserted.
    pub bytes_added: usize,
    /// First preserved tail line, without its terminator.
    pub tail_line: Option<String>,
}

/// Replace `boundary` in `target` with `replacement`, without I/O.
///
/// Returns `head ++ replacement ++ tail` as a new sequence.
pub fn splice_lines(
    target: &LineSequence,
    replacement: &LineSequence,
    boundary: SpliceBoundary,
) -> Result<LineSequence> {
    target.splice(boundary, replacement)
}

/// Apply a splice and commit it atomically.
///
/// This function:
/// 1. Reads target and replacement
/// 2. Checks the pinned hash, if any
/// 3. Validates the boundary against the target line count
/// 4. Reports the first line of the preserved tail
/// 5. Builds the spliced content
/// 6. Writes to a temp file, fsyncs, renames over the target
///
/// Nothing is written if any step before the rename fails.
pub fn apply_splice(request: &SpliceRequest) -> Result<SpliceSummary> {
    let prepared = prepare(request)?;
    commit(prepared)
}

/// Apply a splice after copying the target into a backup.
///
/// The backup is only taken once the splice has been validated, so a
/// rejected request leaves no backup behind. Returns the summary and the
/// path of the backup manifest.
pub fn apply_splice_with_backup(
    request: &SpliceRequest,
    workspace_root: &Path,
    operation_id: Option<String>,
) -> Result<(SpliceSummary, PathBuf)> {
    let prepared = prepare(request)?;

    let mut writer = BackupWriter::new(workspace_root, operation_id)?;
    writer.backup_file(&request.target)?;
    let manifest_path = writer.finalize()?;
    log::debug!("Backup manifest written to {}", manifest_path.display());

    let summary = commit(prepared)?;
    Ok((summary, manifest_path))
}

/// Compute what a splice would change without touching the target.
pub fn preview_splice(request: &SpliceRequest) -> Result<PreviewReport> {
    let prepared = prepare(request)?;
    let boundary = request.boundary;
    let removed = prepared.target.text_between(boundary.start, boundary.end);

    let line_start = boundary.start + 1;
    let line_end = if boundary.removed() == 0 {
        line_start
    } else {
        boundary.end
    };

    Ok(PreviewReport {
        file: request.target.to_string_lossy().into_owned(),
        line_start,
        line_end,
        lines_removed: boundary.removed(),
        lines_added: prepared.replacement_lines,
        lines_after: prepared.result.len(),
        bytes_removed: removed.len(),
        bytes_added: prepared.replacement_bytes,
        tail_line: prepared.tail_line,
    })
}

/// Compute SHA-256 hash of file contents.
pub fn compute_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let result = hasher.finalize();
    format!("{:x}", result)
}

/// Hash a file on disk.
pub fn hash_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| SpliceError::io(path, e))?;
    Ok(compute_hash(&bytes))
}

struct Prepared {
    file: PathBuf,
    boundary: SpliceBoundary,
    target: LineSequence,
    result: LineSequence,
    replacement_lines: usize,
    replacement_bytes: usize,
    tail_line: Option<String>,
    before_hash: String,
}

fn prepare(request: &SpliceRequest) -> Result<Prepared> {
    // Read target and compute hash
    let original = fs::read(&request.target).map_err(|e| SpliceError::io(&request.target, e))?;
    let before_hash = compute_hash(&original);
    let target = LineSequence::from_bytes(&request.target, &original)?;
    let replacement = LineSequence::read(&request.replacement)?;

    // Target must be writable by this process
    fs::OpenOptions::new()
        .write(true)
        .open(&request.target)
        .map_err(|e| SpliceError::io(&request.target, e))?;

    log::debug!(
        "Loaded {} ({} lines) and {} ({} lines)",
        request.target.display(),
        target.len(),
        request.replacement.display(),
        replacement.len()
    );

    // Verify pinned hash
    if let Some(expected) = &request.expected_hash {
        if !expected.eq_ignore_ascii_case(&before_hash) {
            return Err(SpliceError::HashMismatch {
                file: request.target.clone(),
                expected: expected.clone(),
                actual: before_hash,
            });
        }
    }

    request.boundary.validate(&target)?;

    // Report the first line kept after the cut
    let tail_line = target.line(request.boundary.end).map(|l| strip_terminator(&l));
    match &tail_line {
        Some(line) => log::info!(
            "Index {} (line {}): {}",
            request.boundary.end,
            request.boundary.end + 1,
            line
        ),
        None => log::info!(
            "Index {} is past the last line; tail is empty",
            request.boundary.end
        ),
    }

    let result = splice_lines(&target, &replacement, request.boundary)?;

    Ok(Prepared {
        file: request.target.clone(),
        boundary: request.boundary,
        replacement_lines: replacement.len(),
        replacement_bytes: replacement.byte_len(),
        target,
        result,
        tail_line,
        before_hash,
    })
}

fn commit(prepared: Prepared) -> Result<SpliceSummary> {
    let patched = prepared.result.to_text().into_bytes();
    write_atomic(&prepared.file, &patched)?;
    let after_hash = compute_hash(&patched);

    log::info!("Successfully patched {}", prepared.file.display());

    Ok(SpliceSummary {
        file: prepared.file,
        boundary: prepared.boundary,
        tail_line: prepared.tail_line,
        lines_before: prepared.target.len(),
        lines_after: prepared.result.len(),
        before_hash: prepared.before_hash,
        after_hash,
    })
}

/// Write `content` to `file_path` via a sibling temp file and rename.
///
/// The existing file's permissions are carried over to the new file.
/// Symlinks are followed so the file they point to is replaced, not the link.
pub(crate) fn write_atomic(file_path: &Path, content: &[u8]) -> Result<()> {
    // Restores may recreate a file that no longer exists
    let resolved = fs::canonicalize(file_path).unwrap_or_else(|_| file_path.to_path_buf());
    let file_path = resolved.as_path();

    let file_dir = match file_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut temp_file =
        NamedTempFile::new_in(&file_dir).map_err(|e| SpliceError::io(&file_dir, e))?;
    temp_file
        .write_all(content)
        .map_err(|e| SpliceError::io(temp_file.path(), e))?;

    if let Ok(metadata) = fs::metadata(file_path) {
        temp_file
            .as_file()
            .set_permissions(metadata.permissions())
            .map_err(|e| SpliceError::io(file_path, e))?;
    }

    temp_file
        .as_file()
        .sync_all()
        .map_err(|e| SpliceError::io(temp_file.path(), e))?;
    temp_file
        .persist(file_path)
        .map_err(|e| SpliceError::io(file_path, e.error))?;
    Ok(())
}

fn strip_terminator(line: &str) -> String {
    line.strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line)
        .to_string()
}
