//! Output formatting and styling module.
//!
//! Provides a centralized interface for all CLI output, including colored output,
//! progress tracking, and formatted tables. Library modules never print; the
//! CLI renders plans, operation records and undo reports through here.

use crate::file_organizer::{OperationRecord, Outcome};
use crate::planner::Plan;
use crate::undo::UndoReport;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::path::Path;

/// Manages all CLI output with consistent styling and formatting.
///
/// This struct provides methods for:
/// - Success messages (green with ✓)
/// - Error messages (red with ✗)
/// - Warning messages (yellow with ⚠)
/// - Info messages (cyan)
/// - Progress bars for operations
/// - Summary tables with statistics
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// OutputFormatter::success("Files organized successfully!");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Creates and returns a progress bar for file operations.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(100);
    /// pb.inc(1);
    /// pb.finish_with_message("Completed!");
    /// ```
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        let pb = ProgressBar::new(total);
        pb.set_style(style);
        pb
    }

    /// Prints every planned operation, relative to the plan's directories.
    pub fn plan_preview(plan: &Plan) {
        for operation in &plan.operations {
            let source = relative_to(&operation.source, &plan.source_dir);
            let destination = relative_to(&operation.destination, &plan.target_dir);
            println!(
                " - {} {} {}",
                source,
                format!("→ would {}", operation.mode.verb()).dimmed(),
                destination.cyan()
            );
        }

        if !plan.skipped.is_empty() {
            println!(
                "{}",
                format!("{} file(s) already in place", plan.skipped.len()).dimmed()
            );
        }
    }

    /// Prints a summary table with file counts by destination label.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// use std::collections::BTreeMap;
    ///
    /// let mut counts = BTreeMap::new();
    /// counts.insert("Documents".to_string(), 15);
    /// counts.insert("Images".to_string(), 8);
    /// OutputFormatter::summary_table(&counts, 23);
    /// ```
    pub fn summary_table(label_counts: &BTreeMap<String, usize>, total_files: usize) {
        Self::header("SUMMARY");

        let max_label_len = label_counts
            .keys()
            .map(|name| name.chars().count())
            .max()
            .unwrap_or(0)
            .max(6); // "Folder"

        println!(
            "{:<width$} | {}",
            "Folder".bold(),
            "Files".bold(),
            width = max_label_len
        );
        println!("{}", "-".repeat(max_label_len + 10));

        for (label, count) in label_counts {
            println!(
                "{:<width$} | {} {}",
                label,
                count.to_string().green(),
                plural(*count),
                width = max_label_len
            );
        }

        println!("{}", "-".repeat(max_label_len + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            plural(total_files),
            width = max_label_len
        );
    }

    /// Prints the per-label table of a record followed by its failures.
    pub fn record_summary(record: &OperationRecord) {
        let counts = label_counts(record);
        let total = if record.dry_run {
            record.entries().len()
        } else {
            record.success_count()
        };
        Self::summary_table(&counts, total);

        let failures: Vec<_> = record
            .entries()
            .iter()
            .filter_map(|entry| match &entry.outcome {
                Outcome::Failed(e) => Some((&entry.source, e)),
                _ => None,
            })
            .collect();
        if failures.is_empty() {
            return;
        }

        Self::header("FAILURES");
        for (source, error) in &failures {
            Self::error(&format!("{}: {}", source.display(), error));
        }
        Self::warning(&format!(
            "{} of {} file(s) could not be organized",
            failures.len(),
            record.entries().len()
        ));
    }

    /// Prints the outcome of an in-process undo.
    pub fn undo_report(report: &UndoReport) {
        Self::success("Undo complete!");
        println!("  Moved back: {}", report.restored_files);
        println!("  Copies removed: {}", report.removed_copies);
        if report.removed_dirs > 0 {
            println!("  Empty folders removed: {}", report.removed_dirs);
        }

        if !report.skipped_files.is_empty() {
            println!("  Skipped: {}", report.skipped_files.len());
            for (path, reason) in &report.skipped_files {
                println!("    - {}: {}", path.display(), reason);
            }
        }

        if !report.failed_restores.is_empty() {
            println!("  Failed: {}", report.failed_restores.len());
            for (path, reason) in &report.failed_restores {
                eprintln!("    - {}: {}", path.display(), reason);
            }
        }
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }
}

/// Counts entries per destination label.
///
/// A dry-run record counts every entry, a live record only successes.
pub fn label_counts(record: &OperationRecord) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for entry in record.entries() {
        let counted = match entry.outcome {
            Outcome::WouldExecute { .. } | Outcome::Succeeded { .. } => true,
            Outcome::Failed(_) => false,
        };
        if counted {
            *counts.entry(entry.label.clone()).or_insert(0) += 1;
        }
    }
    counts
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}

fn relative_to(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .display()
        .to_string()
}
