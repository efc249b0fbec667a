//! Backup and undo support for splices.
//!
//! Backups live in `.linesplice-backup/<operation_id>/` under the workspace
//! root, next to a `manifest.json` recording where each file came from and
//! the SHA-256 of its content at backup time.

use super::{compute_hash, write_atomic};
use crate::error::{Result, SpliceError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const BACKUP_DIR: &str = ".linesplice-backup";
const MANIFEST_FILE: &str = "manifest.json";

/// Metadata about a backed-up file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupEntry {
    /// Original path of the file (relative to workspace root).
    pub original_path: PathBuf,
    /// SHA-256 hash of the original file content.
    pub hash: String,
    /// Byte count of the original file.
    pub size: u64,
}

/// Manifest describing a backup operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupManifest {
    /// Unique identifier for this operation.
    pub operation_id: String,
    /// Timestamp when the backup was created (RFC 3339).
    pub timestamp: String,
    /// Files that were backed up.
    pub files: Vec<BackupEntry>,
    /// Directory holding the backed-up copies.
    #[serde(skip)]
    pub backup_dir: PathBuf,
}

impl BackupManifest {
    /// Create an empty manifest for `operation_id`.
    pub fn new(operation_id: String, backup_dir: PathBuf) -> Self {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        BackupManifest {
            operation_id,
            timestamp,
            files: Vec::new(),
            backup_dir,
        }
    }

    /// Record a backed-up file.
    pub fn add_file(&mut self, original_path: PathBuf, hash: String, size: u64) {
        self.files.push(BackupEntry {
            original_path,
            hash,
            size,
        });
    }

    /// Write the manifest into its backup directory.
    pub fn save(&self) -> Result<()> {
        let manifest_path = self.backup_dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(self).map_err(|e| SpliceError::Backup {
            message: format!("Failed to serialize manifest: {}", e),
        })?;
        fs::write(&manifest_path, json).map_err(|e| SpliceError::io(&manifest_path, e))?;
        Ok(())
    }

    /// Load a manifest; its backup directory is the manifest's parent.
    pub fn load(manifest_path: &Path) -> Result<Self> {
        let json =
            fs::read_to_string(manifest_path).map_err(|e| SpliceError::io(manifest_path, e))?;

        let mut manifest: BackupManifest =
            serde_json::from_str(&json).map_err(|e| SpliceError::Backup {
                message: format!("Failed to parse manifest: {}", e),
            })?;

        manifest.backup_dir = manifest_path
            .parent()
            .ok_or_else(|| SpliceError::Backup {
                message: "Manifest has no parent directory".to_string(),
            })?
            .to_path_buf();

        Ok(manifest)
    }
}

/// Writer for creating backups of files before splicing.
#[derive(Debug)]
pub struct BackupWriter {
    manifest: BackupManifest,
    workspace_root: PathBuf,
}

impl BackupWriter {
    /// Create the backup directory for a new operation.
    ///
    /// # Arguments
    /// * `workspace_root` - Root directory of the workspace
    /// * `operation_id` - Identifier for the operation (UUID v4 if None)
    pub fn new(workspace_root: &Path, operation_id: Option<String>) -> Result<Self> {
        let op_id = operation_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let backup_dir = workspace_root.join(BACKUP_DIR).join(&op_id);

        fs::create_dir_all(&backup_dir).map_err(|e| SpliceError::io(&backup_dir, e))?;

        Ok(BackupWriter {
            manifest: BackupManifest::new(op_id, backup_dir),
            workspace_root: workspace_root.to_path_buf(),
        })
    }

    /// Operation ID for this backup.
    pub fn operation_id(&self) -> &str {
        &self.manifest.operation_id
    }

    /// Path the manifest is written to.
    pub fn manifest_path(&self) -> PathBuf {
        self.manifest.backup_dir.join(MANIFEST_FILE)
    }

    /// Copy `file_path` into the backup, keeping its workspace-relative path.
    pub fn backup_file(&mut self, file_path: &Path) -> Result<()> {
        // Read original file and compute hash
        let content = fs::read(file_path).map_err(|e| SpliceError::io(file_path, e))?;
        let hash = compute_hash(&content);
        let size = content.len() as u64;

        // Compute relative path from workspace root
        let relative = file_path
            .strip_prefix(&self.workspace_root)
            .map_err(|_| SpliceError::Backup {
                message: format!(
                    "File '{}' is not under workspace root '{}'",
                    file_path.display(),
                    self.workspace_root.display()
                ),
            })?;

        // Copy file to backup location, preserving directory structure
        let backup_path = self.manifest.backup_dir.join(relative);
        if let Some(parent) = backup_path.parent() {
            fs::create_dir_all(parent).map_err(|e| SpliceError::io(parent, e))?;
        }
        fs::write(&backup_path, &content).map_err(|e| SpliceError::io(&backup_path, e))?;

        log::debug!(
            "Backed up {} to {}",
            file_path.display(),
            backup_path.display()
        );
        self.manifest.add_file(relative.to_path_buf(), hash, size);

        Ok(())
    }

    /// Write the manifest and return its path.
    pub fn finalize(self) -> Result<PathBuf> {
        self.manifest.save()?;
        Ok(self.manifest_path())
    }
}

/// Workspace root a manifest was written for.
///
/// Manifests sit at `<root>/.linesplice-backup/<operation_id>/manifest.json`.
pub fn workspace_root_for_manifest(manifest_path: &Path) -> Result<PathBuf> {
    manifest_path
        .parent()
        .and_then(Path::parent)
        .filter(|dir| dir.file_name().is_some_and(|name| name == BACKUP_DIR))
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .ok_or_else(|| SpliceError::Backup {
            message: format!(
                "Manifest '{}' is not inside a {} directory",
                manifest_path.display(),
                BACKUP_DIR
            ),
        })
}

/// Restore files from a backup manifest. Returns the number restored.
///
/// Every backed-up copy is checked against its recorded hash before any file
/// is written back.
pub fn restore_from_manifest(manifest_path: &Path, workspace_root: &Path) -> Result<usize> {
    let manifest = BackupManifest::load(manifest_path)?;

    let mut staged = Vec::with_capacity(manifest.files.len());
    for entry in &manifest.files {
        // Verify backup file exists
        let backup_path = manifest.backup_dir.join(&entry.original_path);
        if !backup_path.exists() {
            return Err(SpliceError::Backup {
                message: format!("Backup file missing: {}", backup_path.display()),
            });
        }

        let content = fs::read(&backup_path).map_err(|e| SpliceError::io(&backup_path, e))?;
        // Verify hash matches
        let actual_hash = compute_hash(&content);
        if actual_hash != entry.hash {
            return Err(SpliceError::Backup {
                message: format!(
                    "Hash mismatch for {}: expected {}, got {}",
                    entry.original_path.display(),
                    entry.hash,
                    actual_hash
                ),
            });
        }

        staged.push((workspace_root.join(&entry.original_path), content));
    }

    // Write back only once every backup checked out
    for (original_path, content) in &staged {
        if let Some(parent) = original_path.parent() {
            fs::create_dir_all(parent).map_err(|e| SpliceError::io(parent, e))?;
        }
        write_atomic(original_path, content)?;
        log::info!("Restored {}", original_path.display());
    }

    Ok(staged.len())
}
