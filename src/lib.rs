//! dirsort - a folder organization utility
//!
//! This library scans a directory, classifies every file with one
//! organization strategy (type, date, size, name patterns or custom JSON
//! rules), plans conflict-free copy/move operations, executes them or
//! previews them as a dry run, and derives undo information from what
//! actually happened.

pub mod cli;
pub mod config;
pub mod file_category;
pub mod file_organizer;
pub mod logging;
pub mod output;
pub mod planner;
pub mod rules;
pub mod scanner;
pub mod strategy;
pub mod undo;

pub use config::{CompiledFilters, Config, ConfigError};
pub use file_category::{Category, FileMapper};
pub use file_organizer::{FileOperationError, FileOrganizer, OperationRecord, Outcome};
pub use planner::{Plan, PlanOptions, PlannedOperation, TransferMode, build_plan};
pub use rules::RuleSet;
pub use scanner::FileEntry;
pub use strategy::{DateBasis, Strategy};
pub use undo::{UndoAction, UndoManager, UndoPlan, UndoReport, UndoScript, generate_undo};
