/// Undo support for organization runs.
///
/// Undo is derived from the [`OperationRecord`] of a live run, never from the
/// plan, so it reflects conflict-renamed destinations and skips operations
/// that failed. Each action keeps the mode of the operation it reverts: a
/// move is undone by moving the file back, a copy by deleting the copy.
///
/// An [`UndoPlan`] can be persisted as a JSON history file next to the
/// organized folders (replayed by [`UndoManager::undo`]) and rendered as a
/// self-contained shell script by [`UndoScript`].
use crate::file_organizer::{self, OperationRecord};
use crate::planner::TransferMode;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Name of the JSON history file written into the target directory.
pub const HISTORY_FILE_NAME: &str = ".dirsort_history.json";

/// Errors from generating, persisting or replaying undo information.
#[derive(Debug, Error)]
pub enum UndoError {
    #[error("No successful operations to undo")]
    EmptyRecord,

    #[error("A dry run does not change anything and cannot be undone")]
    DryRunRecord,

    #[error("Inconsistent operation record: {} was produced twice", .0.display())]
    Inconsistent(PathBuf),

    #[error("No previous organization found in {}", .0.display())]
    NoHistory(PathBuf),

    #[error("Invalid base path {}: {source}", .path.display())]
    InvalidBasePath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read history file: {0}")]
    HistoryReadFailed(#[source] std::io::Error),

    #[error("Failed to write {}: {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid history file format: {0}")]
    InvalidHistoryFormat(String),
}

/// One reversible step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum UndoAction {
    /// Move `from` (where the file ended up) back to `to` (its original path).
    Restore { from: PathBuf, to: PathBuf },
    /// Delete a copy; the original never moved.
    DeleteCopy { path: PathBuf },
}

impl UndoAction {
    /// Path the organization run produced.
    pub fn organized_path(&self) -> &Path {
        match self {
            UndoAction::Restore { from, .. } => from,
            UndoAction::DeleteCopy { path } => path,
        }
    }
}

/// Everything needed to revert one run, independent of in-memory state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndoPlan {
    pub created_at: DateTime<Local>,
    pub source_dir: PathBuf,
    pub target_dir: PathBuf,
    pub actions: Vec<UndoAction>,
}

/// Builds the undo plan for the successful entries of `record`.
///
/// # Errors
///
/// `DryRunRecord` for a dry-run record, `EmptyRecord` when nothing
/// succeeded, and `Inconsistent` when two entries claim the same final path.
pub fn generate_undo(record: &OperationRecord) -> Result<UndoPlan, UndoError> {
    if record.dry_run {
        return Err(UndoError::DryRunRecord);
    }

    let mut seen = HashSet::new();
    let mut actions = Vec::new();
    for entry in record.entries() {
        let Some(destination) = entry.final_destination() else {
            continue;
        };
        if !seen.insert(destination) {
            return Err(UndoError::Inconsistent(destination.to_path_buf()));
        }

        actions.push(match entry.mode {
            TransferMode::Move => UndoAction::Restore {
                from: destination.to_path_buf(),
                to: entry.source.clone(),
            },
            TransferMode::Copy => UndoAction::DeleteCopy {
                path: destination.to_path_buf(),
            },
        });
    }

    if actions.is_empty() {
        return Err(UndoError::EmptyRecord);
    }

    Ok(UndoPlan {
        created_at: Local::now(),
        source_dir: record.source_dir.clone(),
        target_dir: record.target_dir.clone(),
        actions,
    })
}

impl UndoPlan {
    fn history_file_path(base_path: &Path) -> PathBuf {
        base_path.join(HISTORY_FILE_NAME)
    }

    /// Writes this plan as the history file of `base_path`.
    pub fn save(&self, base_path: &Path) -> Result<PathBuf, UndoError> {
        let history_path = Self::history_file_path(base_path);
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| UndoError::InvalidHistoryFormat(e.to_string()))?;
        fs::write(&history_path, json).map_err(|e| UndoError::WriteFailed {
            path: history_path.clone(),
            source: e,
        })?;
        Ok(history_path)
    }

    /// Loads the history file of `base_path`, if there is one.
    pub fn load(base_path: &Path) -> Result<Option<Self>, UndoError> {
        let history_path = Self::history_file_path(base_path);
        if !history_path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&history_path).map_err(UndoError::HistoryReadFailed)?;
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| UndoError::InvalidHistoryFormat(e.to_string()))
    }

    /// Deletes the history file of `base_path`.
    pub fn delete(base_path: &Path) -> Result<(), UndoError> {
        let history_path = Self::history_file_path(base_path);
        if history_path.exists() {
            fs::remove_file(&history_path).map_err(|e| UndoError::WriteFailed {
                path: history_path,
                source: e,
            })?;
        }
        Ok(())
    }

    /// Folders below the target directory that held organized files,
    /// deepest first.
    pub fn organized_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = BTreeSet::new();
        for action in &self.actions {
            let mut current = action.organized_path().parent();
            while let Some(dir) = current {
                if dir == self.target_dir || !dir.starts_with(&self.target_dir) {
                    break;
                }
                dirs.insert(dir.to_path_buf());
                current = dir.parent();
            }
        }

        let mut dirs: Vec<PathBuf> = dirs.into_iter().collect();
        dirs.sort_by(|a, b| {
            b.components()
                .count()
                .cmp(&a.components().count())
                .then_with(|| a.cmp(b))
        });
        dirs
    }
}

/// Renders undo plans as POSIX shell scripts.
pub struct UndoScript;

impl UndoScript {
    /// Renders a script that replays every action of `plan` when run with no
    /// arguments. Moved files are only put back where nothing exists yet.
    pub fn render(plan: &UndoPlan) -> String {
        let mut script = String::new();
        script.push_str("#!/bin/sh\n");
        script.push_str("# dirsort undo script\n");
        let _ = writeln!(
            script,
            "# Generated {} for {}",
            plan.created_at.to_rfc3339(),
            plan.target_dir.display()
        );
        let _ = writeln!(
            script,
            "# Reverts {} operation(s). Run without arguments.\n",
            plan.actions.len()
        );

        script.push_str(SCRIPT_PRELUDE);

        for action in plan.actions.iter().rev() {
            match action {
                UndoAction::Restore { from, to } => {
                    let _ = writeln!(script, "restore {} {}", quote(from), quote(to));
                }
                UndoAction::DeleteCopy { path } => {
                    let _ = writeln!(script, "remove_copy {}", quote(path));
                }
            }
        }

        script.push('\n');
        for dir in plan.organized_dirs() {
            let _ = writeln!(script, "rmdir {} 2>/dev/null || true", quote(&dir));
        }

        script.push_str(
            "\necho \"Moved back $restored, removed $removed copies, skipped $skipped, failed $failed\"\n",
        );
        let _ = writeln!(
            script,
            "if [ \"$failed\" -eq 0 ]; then\n    rm -f {}\nfi",
            quote(&plan.target_dir.join(HISTORY_FILE_NAME))
        );
        script.push_str("[ \"$failed\" -eq 0 ]\n");
        script
    }

    /// Writes the script to `path` and marks it executable on Unix.
    pub fn write(plan: &UndoPlan, path: &Path) -> Result<(), UndoError> {
        let write_failed = |e| UndoError::WriteFailed {
            path: path.to_path_buf(),
            source: e,
        };
        fs::write(path, Self::render(plan)).map_err(write_failed)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o755)).map_err(write_failed)?;
        }

        Ok(())
    }
}

const SCRIPT_PRELUDE: &str = r#"restored=0
removed=0
skipped=0
failed=0

restore() {
    if [ ! -e "$1" ]; then
        echo "File not found: $1"
        skipped=$((skipped + 1))
    elif [ -e "$2" ]; then
        echo "Refusing to overwrite: $2"
        failed=$((failed + 1))
    elif mkdir -p "$(dirname "$2")" && mv "$1" "$2"; then
        echo "Moved back: $2"
        restored=$((restored + 1))
    else
        failed=$((failed + 1))
    fi
}

remove_copy() {
    if [ ! -e "$1" ]; then
        echo "File not found: $1"
        skipped=$((skipped + 1))
    elif rm -f "$1"; then
        echo "Removed copy: $1"
        removed=$((removed + 1))
    else
        failed=$((failed + 1))
    fi
}

"#;

/// Single-quotes a path for the shell.
fn quote(path: &Path) -> String {
    format!("'{}'", path.to_string_lossy().replace('\'', r"'\''"))
}

/// Represents the result of an undo operation.
#[derive(Debug, Default)]
pub struct UndoReport {
    /// Moved files put back at their original location.
    pub restored_files: usize,
    /// Copies deleted.
    pub removed_copies: usize,
    /// Organized folders removed because they ended up empty.
    pub removed_dirs: usize,
    pub failed_restores: Vec<(PathBuf, String)>,
    /// Files that were no longer where the run left them.
    pub skipped_files: Vec<(PathBuf, String)>,
}

impl UndoReport {
    /// Returns true if the undo was completely successful.
    pub fn is_complete_success(&self) -> bool {
        self.failed_restores.is_empty() && self.skipped_files.is_empty()
    }
}

enum ActionError {
    Missing(PathBuf),
    Failed(PathBuf, String),
}

/// Replays undo plans in-process.
pub struct UndoManager;

impl UndoManager {
    /// Undoes the run recorded in the history file of `base_path`.
    ///
    /// The history file is deleted only when every action succeeded, so a
    /// partially failed undo can be retried.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dirsort::undo::UndoManager;
    /// use std::path::Path;
    ///
    /// match UndoManager::undo(Path::new("/path/to/directory")) {
    ///     Ok(report) => println!("Restored {} files", report.restored_files),
    ///     Err(e) => eprintln!("Undo failed: {}", e),
    /// }
    /// ```
    pub fn undo(base_path: &Path) -> Result<UndoReport, UndoError> {
        fs::metadata(base_path).map_err(|e| UndoError::InvalidBasePath {
            path: base_path.to_path_buf(),
            source: e,
        })?;

        let plan = UndoPlan::load(base_path)?
            .ok_or_else(|| UndoError::NoHistory(base_path.to_path_buf()))?;

        let report = Self::apply(&plan);

        if report.is_complete_success()
            && let Err(e) = UndoPlan::delete(base_path)
        {
            warn!("Could not delete history file: {}", e);
        }

        Ok(report)
    }

    /// Applies every action of `plan`, most recent first, then removes
    /// organized folders left empty.
    pub fn apply(plan: &UndoPlan) -> UndoReport {
        let mut report = UndoReport::default();

        for action in plan.actions.iter().rev() {
            match Self::apply_action(action) {
                Ok(()) => match action {
                    UndoAction::Restore { .. } => report.restored_files += 1,
                    UndoAction::DeleteCopy { .. } => report.removed_copies += 1,
                },
                Err(ActionError::Missing(path)) => report
                    .skipped_files
                    .push((path, "File not found at expected location".to_string())),
                Err(ActionError::Failed(path, reason)) => {
                    report.failed_restores.push((path, reason))
                }
            }
        }

        for dir in plan.organized_dirs() {
            // Only empty folders can be removed; anything else stays.
            if fs::remove_dir(&dir).is_ok() {
                debug!("Removed empty folder {}", dir.display());
                report.removed_dirs += 1;
            }
        }

        report
    }

    fn apply_action(action: &UndoAction) -> Result<(), ActionError> {
        match action {
            UndoAction::Restore { from, to } => {
                if !from.exists() {
                    return Err(ActionError::Missing(from.clone()));
                }

                if to.exists() {
                    let backup_path = Self::generate_backup_path(to);
                    fs::rename(to, &backup_path).map_err(|e| {
                        ActionError::Failed(
                            to.clone(),
                            format!("Could not backup conflicting file: {}", e),
                        )
                    })?;
                }

                if let Some(parent) = to.parent() {
                    fs::create_dir_all(parent).map_err(|e| {
                        ActionError::Failed(
                            parent.to_path_buf(),
                            format!("Could not recreate folder: {}", e),
                        )
                    })?;
                }

                file_organizer::transfer(from, to, TransferMode::Move).map_err(|e| {
                    ActionError::Failed(from.clone(), format!("Failed to restore file: {}", e))
                })
            }
            UndoAction::DeleteCopy { path } => {
                if !path.exists() {
                    return Err(ActionError::Missing(path.clone()));
                }
                fs::remove_file(path).map_err(|e| {
                    ActionError::Failed(path.clone(), format!("Failed to delete copy: {}", e))
                })
            }
        }
    }

    /// Generates a backup path for a file by appending a timestamp.
    ///
    /// Example: `file.txt` becomes `file.txt.bak.20251109-143052`
    fn generate_backup_path(original_path: &Path) -> PathBuf {
        let timestamp = Local::now().format("%Y%m%d-%H%M%S");
        let filename = original_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());

        let backup_name = format!("{}.bak.{}", filename, timestamp);
        match original_path.parent() {
            Some(parent) => parent.join(backup_name),
            None => PathBuf::from(backup_name),
        }
    }
}
