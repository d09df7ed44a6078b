//! Plan generation.
//!
//! Builds the ordered list of copy/move operations for a run without
//! mutating anything. Destinations already taken by an earlier operation of
//! the same plan, or present on disk, get a numeric suffix so the dry-run
//! output matches what a live run will do.

use crate::config::{CompiledFilters, ConfigError};
use crate::scanner::{self, FileEntry, ScanOptions};
use crate::strategy::{FALLBACK_LABEL, Strategy};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Whether organized files are copied or moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferMode {
    Copy,
    #[default]
    Move,
}

impl TransferMode {
    pub fn verb(&self) -> &'static str {
        match self {
            TransferMode::Copy => "copy",
            TransferMode::Move => "move",
        }
    }
}

/// Options of a planning pass.
#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    /// Root of the organized folders; defaults to the source directory.
    pub target_dir: Option<PathBuf>,
    pub recursive: bool,
    pub include_hidden: bool,
    pub mode: TransferMode,
}

/// A single planned file operation.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedOperation {
    pub source: PathBuf,
    /// Destination label as produced by the strategy.
    pub label: String,
    /// Predicted destination, after conflict renaming.
    pub destination: PathBuf,
    pub mode: TransferMode,
}

impl PlannedOperation {
    /// Folder the file goes into.
    pub fn destination_dir(&self) -> &Path {
        self.destination.parent().unwrap_or(&self.destination)
    }
}

/// Ordered, side-effect-free plan for one run.
#[derive(Debug, Clone)]
pub struct Plan {
    pub source_dir: PathBuf,
    pub target_dir: PathBuf,
    pub operations: Vec<PlannedOperation>,
    /// Files that already sit at their destination.
    pub skipped: Vec<PathBuf>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }
}

/// Scans `source_dir` and plans an operation for every eligible file.
///
/// # Errors
///
/// Returns a `ConfigError` when the source or target directory cannot be
/// resolved. Nothing on disk is modified.
pub fn build_plan(
    source_dir: &Path,
    strategy: &Strategy,
    options: &PlanOptions,
    filters: &CompiledFilters,
) -> Result<Plan, ConfigError> {
    let source_dir = fs::canonicalize(source_dir).map_err(|e| ConfigError::SourceDirUnreadable {
        path: source_dir.to_path_buf(),
        reason: e.to_string(),
    })?;

    let target_dir = match &options.target_dir {
        Some(dir) => absolute_dir(dir)?,
        None => source_dir.clone(),
    };

    let scan_options = ScanOptions {
        recursive: options.recursive,
        include_hidden: options.include_hidden,
    };
    let entries = scanner::scan(&source_dir, &scan_options, filters)?;

    Ok(plan_entries(
        source_dir,
        target_dir,
        &entries,
        strategy,
        options.mode,
    ))
}

/// Plans operations for already-scanned entries.
pub fn plan_entries(
    source_dir: PathBuf,
    target_dir: PathBuf,
    entries: &[FileEntry],
    strategy: &Strategy,
    mode: TransferMode,
) -> Plan {
    let mut operations = Vec::with_capacity(entries.len());
    let mut skipped = Vec::new();
    let mut reserved: HashSet<PathBuf> = HashSet::new();

    for entry in entries {
        let label = strategy.classify(entry);
        let folder = label_dir(&target_dir, &label);
        let natural = folder.join(&entry.name);

        if natural == entry.path {
            debug!("Already in place: {}", entry.path.display());
            skipped.push(entry.path.clone());
            continue;
        }

        let destination = unique_destination(&natural, |candidate| {
            reserved.contains(candidate) || candidate.exists()
        });
        debug!(
            "{} -> {} ({})",
            entry.path.display(),
            destination.display(),
            label
        );

        reserved.insert(destination.clone());
        operations.push(PlannedOperation {
            source: entry.path.clone(),
            label,
            destination,
            mode,
        });
    }

    Plan {
        source_dir,
        target_dir,
        operations,
        skipped,
    }
}

/// Joins a label onto `target_dir`, treating `/` and `\` as nested folders.
///
/// Empty, `.` and `..` components are dropped so the result always stays
/// inside `target_dir`.
pub fn label_dir(target_dir: &Path, label: &str) -> PathBuf {
    let components: Vec<&str> = label
        .split(['/', '\\'])
        .map(str::trim)
        .filter(|part| !part.is_empty() && *part != "." && *part != "..")
        .collect();

    let mut dir = target_dir.to_path_buf();
    if components.is_empty() {
        dir.push(FALLBACK_LABEL);
    } else {
        dir.extend(components);
    }
    dir
}

/// Returns `path`, or the first `stem_N.ext` (N = 1, 2, …) that `taken`
/// rejects no longer.
pub fn unique_destination(path: &Path, mut taken: impl FnMut(&Path) -> bool) -> PathBuf {
    if !taken(path) {
        return path.to_path_buf();
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string());
    let ext = path.extension().map(|e| e.to_string_lossy().into_owned());
    let parent = path.parent().unwrap_or(Path::new(""));

    let mut counter = 1u64;
    loop {
        let name = match &ext {
            Some(ext) => format!("{}_{}.{}", stem, counter, ext),
            None => format!("{}_{}", stem, counter),
        };
        let candidate = parent.join(name);
        if !taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

fn absolute_dir(dir: &Path) -> Result<PathBuf, ConfigError> {
    let absolute = std::path::absolute(dir).map_err(|e| ConfigError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;
    // Resolve `..` lexically; the directory may not exist yet.
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::ParentDir => {
                normalized.pop();
            }
            Component::CurDir => {}
            other => normalized.push(other),
        }
    }
    Ok(normalized)
}
