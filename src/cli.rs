//! Command-line interface module for dirsort.
//!
//! This module handles all CLI-related functionality including:
//! - Command parsing and validation
//! - Strategy selection from flags and configuration
//! - Organization orchestration (dry run or live)
//! - Undo artifacts and in-process undo

use crate::config::{CompiledFilters, Config, ConfigError};
use crate::file_organizer::{FileOrganizer, OperationRecord};
use crate::output::OutputFormatter;
use crate::planner::{PlanOptions, TransferMode, build_plan};
use crate::rules::RuleSet;
use crate::strategy::{DateBasis, Strategy};
use crate::undo::{UndoError, UndoManager, UndoScript, generate_undo};
use clap::{ArgGroup, Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// dirsort - sort a folder into subfolders by type, date, size, name or custom rules
#[derive(Parser, Debug)]
#[command(name = "dirsort")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file to use instead of the default lookup
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Organize the files of a directory (dry run unless --execute is given)
    Organize(OrganizeArgs),

    /// Undo the last organization recorded in a directory
    Undo {
        /// Directory the files were organized into
        dir: PathBuf,
    },

    /// Write a sample custom rules file
    SampleRules {
        /// Where to write the rules
        file: PathBuf,
    },
}

#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("strategy")
        .required(true)
        .multiple(false)
        .args(["by_type", "by_date", "by_size", "by_name", "custom_rules"])
))]
pub struct OrganizeArgs {
    /// Directory to organize
    pub source: PathBuf,

    /// Sort by file type (Images, Documents, ...)
    #[arg(long)]
    pub by_type: bool,

    /// Sort by modification (or creation) date
    #[arg(long)]
    pub by_date: bool,

    /// Sort into size buckets
    #[arg(long)]
    pub by_size: bool,

    /// Sort by name patterns, e.g. '{"Reports": "report", "Photos": "IMG"}'
    #[arg(long, value_name = "JSON")]
    pub by_name: Option<String>,

    /// Sort with the rules of a JSON file (see sample-rules)
    #[arg(long, value_name = "FILE")]
    pub custom_rules: Option<PathBuf>,

    /// Root of the organized folders (defaults to the source directory)
    #[arg(long, value_name = "DIR")]
    pub target_dir: Option<PathBuf>,

    /// strftime format for --by-date; '/' creates nested folders
    #[arg(long, value_name = "FMT")]
    pub date_format: Option<String>,

    /// Use the creation date instead of the modification date
    #[arg(long)]
    pub use_creation_date: bool,

    /// Include files in subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Include hidden files and directories
    #[arg(long)]
    pub include_hidden: bool,

    /// Copy files instead of moving them
    #[arg(long)]
    pub copy: bool,

    /// Perform the operations (default is a dry run)
    #[arg(long)]
    pub execute: bool,

    /// Write an undo shell script after a live run
    #[arg(long)]
    pub create_undo: bool,

    /// Path of the undo script
    #[arg(long, value_name = "PATH")]
    pub undo_script: Option<PathBuf>,
}

impl OrganizeArgs {
    /// Builds the strategy selected by the flags.
    pub fn strategy(&self, config: &Config) -> Result<Strategy, ConfigError> {
        if self.by_type {
            Ok(Strategy::ByType)
        } else if self.by_date {
            let format = self
                .date_format
                .as_deref()
                .unwrap_or(&config.organize.date_format);
            let basis = if self.use_creation_date {
                DateBasis::Created
            } else {
                DateBasis::Modified
            };
            Strategy::by_date(format, basis)
        } else if self.by_size {
            Ok(Strategy::BySize)
        } else if let Some(json) = &self.by_name {
            Strategy::by_name_json(json)
        } else if let Some(path) = &self.custom_rules {
            Strategy::custom_rules_file(path)
        } else {
            Err(ConfigError::NoStrategy)
        }
    }

    pub fn plan_options(&self) -> PlanOptions {
        PlanOptions {
            target_dir: self.target_dir.clone(),
            recursive: self.recursive,
            include_hidden: self.include_hidden,
            mode: if self.copy {
                TransferMode::Copy
            } else {
                TransferMode::Move
            },
        }
    }
}

/// Errors that end the program with a failure status.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Undo(#[from] UndoError),

    #[error("{0} file(s) could not be restored; history kept for another attempt")]
    UndoIncomplete(usize),
}

/// Runs a parsed command line.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use dirsort::cli::{Cli, run};
///
/// let cli = Cli::parse_from(["dirsort", "organize", "/path/to/downloads", "--by-type"]);
/// if let Err(e) = run(cli) {
///     eprintln!("Error: {}", e);
/// }
/// ```
pub fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Organize(args) => {
            let config = Config::load(cli.config.as_deref())?;
            organize(&args, &config).map(|_| ())
        }
        Commands::Undo { dir } => undo_organization(&dir),
        Commands::SampleRules { file } => {
            RuleSet::sample().save(&file)?;
            OutputFormatter::success(&format!("Sample rules written to {}", file.display()));
            Ok(())
        }
    }
}

/// Plans and runs one organization, printing progress and a summary.
///
/// Configuration problems are returned before anything is planned. Files
/// that fail individually are reported but do not make the run fail.
pub fn organize(args: &OrganizeArgs, config: &Config) -> Result<OperationRecord, CliError> {
    let filters = config.compile_filters()?;
    let strategy = args.strategy(config)?;
    let record = run_plan(args, &strategy, &filters)?;

    if record.dry_run {
        if args.create_undo {
            OutputFormatter::warning("--create-undo has no effect on a dry run");
        }
        OutputFormatter::plain("");
        OutputFormatter::info("Dry run complete. No files were modified.");
        OutputFormatter::info("Run again with --execute to perform the organization.");
    } else if record.success_count() > 0 {
        write_undo_artifacts(&record, args, config);
    }

    Ok(record)
}

fn run_plan(
    args: &OrganizeArgs,
    strategy: &Strategy,
    filters: &CompiledFilters,
) -> Result<OperationRecord, CliError> {
    let plan = build_plan(&args.source, strategy, &args.plan_options(), filters)?;
    debug!(
        "Planned {} operation(s) by {} for {}",
        plan.len(),
        strategy.describe(),
        plan.source_dir.display()
    );

    if !args.execute {
        OutputFormatter::dry_run_notice(&format!(
            "Organizing {} by {}",
            plan.source_dir.display(),
            strategy.describe()
        ));
    } else {
        OutputFormatter::info(&format!(
            "Organizing {} by {}",
            plan.source_dir.display(),
            strategy.describe()
        ));
    }

    if plan.is_empty() {
        OutputFormatter::plain("No files to organize.");
        return Ok(FileOrganizer::execute(&plan, args.execute));
    }

    let record = if args.execute {
        let pb = OutputFormatter::create_progress_bar(plan.len() as u64);
        let record = FileOrganizer::execute_with_progress(&plan, true, |entry| {
            pb.set_message(entry.label.clone());
            pb.inc(1);
        });
        pb.finish_and_clear();
        record
    } else {
        OutputFormatter::plan_preview(&plan);
        FileOrganizer::execute(&plan, false)
    };

    OutputFormatter::record_summary(&record);
    Ok(record)
}

/// Saves the history journal and, with `--create-undo`, the undo script.
/// Problems are reported as warnings; the run itself already happened.
fn write_undo_artifacts(record: &OperationRecord, args: &OrganizeArgs, config: &Config) {
    let plan = match generate_undo(record) {
        Ok(plan) => plan,
        Err(e) => {
            OutputFormatter::warning(&format!("Undo information not available: {}", e));
            return;
        }
    };

    match plan.save(&record.target_dir) {
        Ok(_) => OutputFormatter::plain(&format!(
            "History saved. Use 'dirsort undo {}' to revert changes.",
            record.target_dir.display()
        )),
        Err(e) => OutputFormatter::warning(&format!("Could not save history: {}", e)),
    }

    if args.create_undo {
        let script_path: &Path = args
            .undo_script
            .as_deref()
            .unwrap_or(&config.organize.undo_script);
        match UndoScript::write(&plan, script_path) {
            Ok(()) => OutputFormatter::success(&format!(
                "Undo script written to {}",
                script_path.display()
            )),
            Err(e) => OutputFormatter::warning(&format!("Could not write undo script: {}", e)),
        }
    }
}

fn undo_organization(dir: &Path) -> Result<(), CliError> {
    OutputFormatter::info("Undoing previous organization...");

    let report = UndoManager::undo(dir)?;
    OutputFormatter::undo_report(&report);

    if !report.failed_restores.is_empty() {
        OutputFormatter::warning("History file was NOT deleted due to failures.");
        return Err(CliError::UndoIncomplete(report.failed_restores.len()));
    }
    Ok(())
}
