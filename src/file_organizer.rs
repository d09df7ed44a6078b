/// Plan execution.
///
/// [`FileOrganizer`] walks a [`Plan`] in order and either reports what would
/// happen (dry run) or copies/moves every file, producing an append-only
/// [`OperationRecord`]. A failing file is recorded with its cause and the run
/// continues with the next one.
use crate::planner::{Plan, PlannedOperation, TransferMode, unique_destination};
use chrono::{DateTime, Local};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Why a single file could not be organized.
#[derive(Debug, Error)]
pub enum FileOperationError {
    #[error("Source file not found: {}", .path.display())]
    SourceMissing { path: PathBuf },

    #[error("Failed to create directory {}: {source}", .path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to {} {} to {}: {source}", .mode.verb(), .from.display(), .to.display())]
    Transfer {
        mode: TransferMode,
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result of one attempted operation.
#[derive(Debug)]
pub enum Outcome {
    /// Dry run: the operation would place the file here.
    WouldExecute { destination: PathBuf },
    /// The file now lives at `destination`, which may carry a conflict suffix.
    Succeeded { destination: PathBuf },
    Failed(FileOperationError),
}

/// One entry of the operation record.
#[derive(Debug)]
pub struct RecordEntry {
    pub source: PathBuf,
    pub label: String,
    pub mode: TransferMode,
    pub outcome: Outcome,
}

impl RecordEntry {
    /// Final path of a successful operation.
    pub fn final_destination(&self) -> Option<&Path> {
        match &self.outcome {
            Outcome::Succeeded { destination } => Some(destination),
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, Outcome::Failed(_))
    }
}

/// Append-only log of the operations attempted in one run.
#[derive(Debug)]
pub struct OperationRecord {
    pub source_dir: PathBuf,
    pub target_dir: PathBuf,
    pub started_at: DateTime<Local>,
    pub dry_run: bool,
    entries: Vec<RecordEntry>,
}

impl OperationRecord {
    pub fn new(source_dir: PathBuf, target_dir: PathBuf, dry_run: bool) -> Self {
        Self {
            source_dir,
            target_dir,
            started_at: Local::now(),
            dry_run,
            entries: Vec::new(),
        }
    }

    /// Appends an entry; entries are never removed or reordered.
    pub fn push(&mut self, entry: RecordEntry) {
        self.entries.push(entry);
    }

    /// Entries in execution order.
    pub fn entries(&self) -> &[RecordEntry] {
        &self.entries
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &RecordEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.final_destination().is_some())
    }

    pub fn failed(&self) -> impl Iterator<Item = &RecordEntry> {
        self.entries.iter().filter(|entry| entry.is_failure())
    }

    pub fn success_count(&self) -> usize {
        self.succeeded().count()
    }

    pub fn failure_count(&self) -> usize {
        self.failed().count()
    }
}

/// Executes organization plans.
pub struct FileOrganizer;

impl FileOrganizer {
    /// Executes `plan`; with `execute == false` nothing on disk changes.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dirsort::config::CompiledFilters;
    /// use dirsort::file_organizer::FileOrganizer;
    /// use dirsort::planner::{build_plan, PlanOptions};
    /// use dirsort::strategy::Strategy;
    /// use std::path::Path;
    ///
    /// let plan = build_plan(
    ///     Path::new("/path/to/downloads"),
    ///     &Strategy::ByType,
    ///     &PlanOptions::default(),
    ///     &CompiledFilters::accept_all(),
    /// )
    /// .expect("valid source directory");
    /// let record = FileOrganizer::execute(&plan, true);
    /// println!("{} organized, {} failed", record.success_count(), record.failure_count());
    /// ```
    pub fn execute(plan: &Plan, execute: bool) -> OperationRecord {
        Self::execute_with_progress(plan, execute, |_| {})
    }

    /// Like [`FileOrganizer::execute`], calling `on_progress` after every
    /// operation with the entry just recorded.
    pub fn execute_with_progress<F>(plan: &Plan, execute: bool, mut on_progress: F) -> OperationRecord
    where
        F: FnMut(&RecordEntry),
    {
        let mut record =
            OperationRecord::new(plan.source_dir.clone(), plan.target_dir.clone(), !execute);

        for operation in &plan.operations {
            let outcome = if execute {
                match Self::perform(operation) {
                    Ok(destination) => {
                        debug!(
                            "{} {} -> {}",
                            operation.mode.verb(),
                            operation.source.display(),
                            destination.display()
                        );
                        Outcome::Succeeded { destination }
                    }
                    Err(e) => {
                        warn!("{}", e);
                        Outcome::Failed(e)
                    }
                }
            } else {
                Outcome::WouldExecute {
                    destination: operation.destination.clone(),
                }
            };

            record.push(RecordEntry {
                source: operation.source.clone(),
                label: operation.label.clone(),
                mode: operation.mode,
                outcome,
            });
            if let Some(entry) = record.entries().last() {
                on_progress(entry);
            }
        }

        record
    }

    /// Performs one operation and returns the final destination.
    ///
    /// The conflict-free name is recomputed against the disk from the
    /// original file name, since earlier operations or other programs may
    /// have filled the planned path.
    fn perform(operation: &PlannedOperation) -> Result<PathBuf, FileOperationError> {
        let source = &operation.source;
        if fs::symlink_metadata(source).is_err() {
            return Err(FileOperationError::SourceMissing {
                path: source.clone(),
            });
        }

        let folder = operation.destination_dir();
        fs::create_dir_all(folder).map_err(|e| FileOperationError::DirectoryCreation {
            path: folder.to_path_buf(),
            source: e,
        })?;

        let file_name = source
            .file_name()
            .or_else(|| operation.destination.file_name())
            .unwrap_or_default();
        let destination = unique_destination(&folder.join(file_name), |p| p.exists());

        transfer(source, &destination, operation.mode).map_err(|e| {
            FileOperationError::Transfer {
                mode: operation.mode,
                from: source.clone(),
                to: destination.clone(),
                source: e,
            }
        })?;

        Ok(destination)
    }
}

/// Copies or moves a single file. A move falls back to copy-then-delete
/// across filesystems.
pub(crate) fn transfer(from: &Path, to: &Path, mode: TransferMode) -> io::Result<()> {
    match mode {
        TransferMode::Copy => copy_file(from, to),
        TransferMode::Move => match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
                // rename cannot cross filesystems; copy, verify, then delete
                copy_file(from, to)?;
                let source_size = fs::metadata(from)?.len();
                let dest_size = fs::metadata(to)?.len();
                if source_size != dest_size {
                    let _ = fs::remove_file(to);
                    return Err(io::Error::other(format!(
                        "copy verification failed: source {} bytes, destination {} bytes",
                        source_size, dest_size
                    )));
                }
                fs::remove_file(from)
            }
            Err(e) => Err(e),
        },
    }
}

fn copy_file(from: &Path, to: &Path) -> io::Result<()> {
    fs::copy(from, to).map(|_| ()).inspect_err(|_| {
        let _ = fs::remove_file(to);
    })
}
