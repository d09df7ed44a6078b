//! Directory scanning.
//!
//! Walks a source directory and takes an immutable [`FileEntry`] snapshot of
//! every regular file that passes the hidden-file rule and the configured
//! filters. Traversal is sorted by file name so repeated scans of the same
//! tree yield the same order.

use crate::config::{CompiledFilters, ConfigError};
use crate::undo::HISTORY_FILE_NAME;
use chrono::{DateTime, Local};
use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Metadata snapshot of a file, taken once at scan time.
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    pub path: PathBuf,
    /// File name including extension.
    pub name: String,
    /// Lower-cased extension with its leading dot, empty when there is none.
    pub extension: String,
    pub size: u64,
    pub modified: DateTime<Local>,
    /// Creation time, or the modification time where the platform has none.
    pub created: DateTime<Local>,
    pub hidden: bool,
}

impl FileEntry {
    /// Builds an entry from explicit values; name, extension and hidden flag
    /// are derived from `path`.
    pub fn new(
        path: impl Into<PathBuf>,
        size: u64,
        modified: DateTime<Local>,
        created: DateTime<Local>,
    ) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
            .unwrap_or_default();
        let hidden = name.starts_with('.');

        Self {
            path,
            name,
            extension,
            size,
            modified,
            created,
            hidden,
        }
    }

    /// Builds an entry from filesystem metadata.
    pub fn from_metadata(path: &Path, metadata: &Metadata) -> Self {
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        let created = metadata.created().unwrap_or(modified);
        Self::new(path, metadata.len(), modified.into(), created.into())
    }

    #[cfg(test)]
    pub(crate) fn synthetic(name: &str, size: u64) -> Self {
        use chrono::TimeZone;
        let when = Local
            .with_ymd_and_hms(2024, 3, 15, 12, 0, 0)
            .single()
            .expect("unambiguous local time");
        Self::new(PathBuf::from("/src").join(name), size, when, when)
    }
}

/// Which entries a scan visits.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Visit files and directories whose name starts with a dot.
    pub include_hidden: bool,
}

/// Scans `source_dir` and returns a snapshot of every eligible file.
///
/// # Errors
///
/// Returns `ConfigError::SourceDirUnreadable` when `source_dir` is not a
/// readable directory. Unreadable entries below it are logged and skipped.
pub fn scan(
    source_dir: &Path,
    options: &ScanOptions,
    filters: &CompiledFilters,
) -> Result<Vec<FileEntry>, ConfigError> {
    fs::read_dir(source_dir).map_err(|e| ConfigError::SourceDirUnreadable {
        path: source_dir.to_path_buf(),
        reason: e.to_string(),
    })?;

    let max_depth = if options.recursive { usize::MAX } else { 1 };
    let walker = WalkDir::new(source_dir)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| options.include_hidden || !is_hidden(entry));

    let mut files = Vec::new();
    for entry_result in walker {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() || entry.file_name() == HISTORY_FILE_NAME {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(source_dir)
            .unwrap_or(entry.path());
        if !filters.should_include(relative) {
            debug!("Excluded by filters: {}", relative.display());
            continue;
        }

        match entry.metadata() {
            Ok(metadata) => files.push(FileEntry::from_metadata(entry.path(), &metadata)),
            Err(e) => warn!("Cannot read metadata of {}: {}", entry.path().display(), e),
        }
    }

    debug!("Scanned {} files in {}", files.len(), source_dir.display());
    Ok(files)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}
