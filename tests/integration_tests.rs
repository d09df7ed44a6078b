/// Integration tests for dirsort
///
/// These tests simulate real-world usage scenarios, testing the complete
/// end-to-end functionality of the dirsort folder organization utility.
///
/// Test categories:
/// 1. Organization by each strategy
/// 2. Dry-run mode verification
/// 3. Conflict resolution
/// 4. Undo (history journal, undo plan and shell script)
/// 5. Configuration, filtering and scan options
/// 6. Error scenarios
use chrono::{Local, TimeZone};
use clap::Parser;
use dirsort::cli::{self, Cli, CliError, Commands, OrganizeArgs};
use dirsort::config::{Config, ConfigError};
use dirsort::file_organizer::{FileOrganizer, OperationRecord};
use dirsort::planner::{PlanOptions, TransferMode, build_plan};
use dirsort::strategy::Strategy;
use dirsort::undo::{HISTORY_FILE_NAME, UndoManager, UndoPlan, generate_undo};
use dirsort::{CompiledFilters, RuleSet};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tempfile::TempDir;

const KIB: u64 = 1024;
const MIB: u64 = 1024 * 1024;

// ============================================================================
// Test Utilities
// ============================================================================

/// A test fixture that sets up a temporary directory with configurable
/// file structure for testing.
struct TestFixture {
    temp_dir: TempDir,
}

impl TestFixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        TestFixture { temp_dir }
    }

    fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a file with content, creating parent directories as needed.
    fn create_file(&self, name: &str, content: &[u8]) {
        let file_path = self.path().join(name);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        let mut file = File::create(&file_path).expect("Failed to create file");
        file.write_all(content)
            .expect("Failed to write file content");
    }

    /// Create a sparse file of exactly `size` bytes.
    fn create_sized_file(&self, name: &str, size: u64) {
        let file = File::create(self.path().join(name)).expect("Failed to create file");
        file.set_len(size).expect("Failed to set file length");
    }

    fn create_text_file(&self, name: &str, content: &str) {
        self.create_file(name, content.as_bytes());
    }

    /// Set the modification time of a file.
    fn set_modified(&self, name: &str, year: i32, month: u32, day: u32) {
        let when: SystemTime = Local
            .with_ymd_and_hms(year, month, day, 12, 0, 0)
            .single()
            .expect("unambiguous local time")
            .into();
        File::options()
            .write(true)
            .open(self.path().join(name))
            .expect("Failed to open file")
            .set_modified(when)
            .expect("Failed to set modification time");
    }

    fn read(&self, rel_path: &str) -> String {
        fs::read_to_string(self.path().join(rel_path)).expect("Failed to read file")
    }

    fn assert_dir_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(
            path.exists() && path.is_dir(),
            "Directory should exist: {}",
            path.display()
        );
    }

    fn assert_file_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(
            path.exists() && path.is_file(),
            "File should exist: {}",
            path.display()
        );
    }

    fn assert_file_not_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(!path.exists(), "File should not exist: {}", path.display());
    }

    /// Count directories in the test directory (non-recursive).
    fn count_dirs(&self) -> usize {
        fs::read_dir(self.path())
            .expect("Failed to read directory")
            .flatten()
            .filter(|e| e.path().is_dir())
            .count()
    }

    /// Every file below the fixture with its content, sorted by path.
    fn snapshot(&self) -> Vec<(PathBuf, Vec<u8>)> {
        let mut files = Vec::new();
        Self::walk_dir(self.path(), &mut files);
        files.sort();
        files
            .into_iter()
            .map(|path| {
                let content = fs::read(&path).expect("Failed to read file");
                (path, content)
            })
            .collect()
    }

    fn walk_dir(dir: &Path, files: &mut Vec<PathBuf>) {
        if let Ok(entries) = fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_file() {
                    files.push(path);
                } else if path.is_dir() {
                    Self::walk_dir(&path, files);
                }
            }
        }
    }
}

fn organize_args(source: &Path, extra: &[&str]) -> OrganizeArgs {
    let mut argv = vec![
        "dirsort".to_string(),
        "organize".to_string(),
        source.display().to_string(),
    ];
    argv.extend(extra.iter().map(|arg| arg.to_string()));

    match Cli::try_parse_from(argv).expect("valid arguments").command {
        Commands::Organize(args) => args,
        other => panic!("unexpected command {:?}", other),
    }
}

/// Runs an organization of the fixture with default configuration.
fn organize(fixture: &TestFixture, extra: &[&str]) -> OperationRecord {
    cli::organize(&organize_args(fixture.path(), extra), &Config::default())
        .expect("organize should succeed")
}

fn run_command(argv: &[&str]) -> Result<(), CliError> {
    cli::run(Cli::try_parse_from(argv).expect("valid arguments"))
}

// ============================================================================
// Test Suite 1: Organization by Strategy
// ============================================================================

#[test]
fn test_organize_empty_directory() {
    let fixture = TestFixture::new();

    let record = organize(&fixture, &["--by-type", "--execute"]);

    assert!(record.entries().is_empty());
    assert_eq!(fixture.count_dirs(), 0, "Should have no subdirectories");
    // Nothing happened, so there is nothing to undo.
    fixture.assert_file_not_exists(HISTORY_FILE_NAME);
}

#[test]
fn test_by_type_mixed_files() {
    let fixture = TestFixture::new();
    fixture.create_sized_file("a.jpg", 500 * KIB);
    fixture.create_sized_file("b.pdf", 2 * MIB);
    fixture.create_text_file("report.docx", "work notes");

    let record = organize(&fixture, &["--by-type", "--execute"]);

    assert_eq!(record.success_count(), 3);
    assert_eq!(record.failure_count(), 0);
    fixture.assert_file_exists("Images/a.jpg");
    fixture.assert_file_exists("Documents/b.pdf");
    fixture.assert_file_exists("Documents/report.docx");
    fixture.assert_file_not_exists("a.jpg");
    assert_eq!(fixture.read("Documents/report.docx"), "work notes");
}

#[test]
fn test_by_type_unknown_and_extensionless_files() {
    let fixture = TestFixture::new();
    fixture.create_text_file("data.xyz", "?");
    fixture.create_text_file("Makefile", "all:");
    fixture.create_text_file("photo.backup.PNG", "png");

    organize(&fixture, &["--by-type", "--execute"]);

    fixture.assert_file_exists("Others/data.xyz");
    fixture.assert_file_exists("Others/Makefile");
    fixture.assert_file_exists("Images/photo.backup.PNG");
}

#[test]
fn test_by_size_buckets() {
    let fixture = TestFixture::new();
    fixture.create_sized_file("small.bin", 500 * KIB);
    fixture.create_sized_file("medium.bin", 5 * MIB);
    fixture.create_sized_file("large.bin", 50 * MIB);
    fixture.create_sized_file("huge.bin", 500 * MIB);

    organize(&fixture, &["--by-size", "--execute"]);

    fixture.assert_file_exists("Small (< 1MB)/small.bin");
    fixture.assert_file_exists("Medium (1-10MB)/medium.bin");
    fixture.assert_file_exists("Large (10-100MB)/large.bin");
    fixture.assert_file_exists("Very Large (> 100MB)/huge.bin");
}

#[test]
fn test_by_date_nested_format() {
    let fixture = TestFixture::new();
    fixture.create_text_file("old.txt", "old");
    fixture.create_text_file("new.txt", "new");
    fixture.set_modified("old.txt", 2021, 1, 2);
    fixture.set_modified("new.txt", 2023, 7, 4);

    organize(
        &fixture,
        &["--by-date", "--date-format", "%Y/%m", "--execute"],
    );

    fixture.assert_file_exists("2021/01/old.txt");
    fixture.assert_file_exists("2023/07/new.txt");
}

#[test]
fn test_by_name_patterns() {
    let fixture = TestFixture::new();
    fixture.create_text_file("q3_report.pdf", "r");
    fixture.create_text_file("IMG_0001.jpg", "i");
    fixture.create_text_file("notes.txt", "n");

    organize(
        &fixture,
        &[
            "--by-name",
            r#"{"Reports": "report", "Camera": "IMG_"}"#,
            "--execute",
        ],
    );

    fixture.assert_file_exists("Reports/q3_report.pdf");
    fixture.assert_file_exists("Camera/IMG_0001.jpg");
    fixture.assert_file_exists("Others/notes.txt");
}

#[test]
fn test_custom_rules_route_and_fall_through() {
    let fixture = TestFixture::new();
    let rules_dir = TempDir::new().expect("Failed to create temp directory");
    let rules_path = rules_dir.path().join("rules.json");
    fs::write(
        &rules_path,
        r#"{
            "description": "invoices",
            "default_folder": "Unsorted",
            "rules": [
                {
                    "name": "Invoices",
                    "folder": "Finance/Invoices",
                    "conditions": { "extensions": [".pdf"], "name_contains": "invoice" }
                }
            ]
        }"#,
    )
    .expect("Failed to write rules");

    fixture.create_text_file("invoice_march.pdf", "paid");
    fixture.create_text_file("report.pdf", "q3");

    let rules_arg = rules_path.display().to_string();
    organize(&fixture, &["--custom-rules", &rules_arg, "--execute"]);

    fixture.assert_file_exists("Finance/Invoices/invoice_march.pdf");
    fixture.assert_file_exists("Unsorted/report.pdf");
}

#[test]
fn test_sample_rules_command_writes_loadable_rules() {
    let fixture = TestFixture::new();
    let path = fixture.path().join("rules.json");

    run_command(&["dirsort", "sample-rules", path.to_str().unwrap()]).unwrap();

    assert_eq!(RuleSet::load(&path).unwrap(), RuleSet::sample());
}

#[test]
fn test_copy_into_separate_target() {
    let fixture = TestFixture::new();
    let target = TempDir::new().expect("Failed to create temp directory");
    fixture.create_text_file("song.mp3", "la la");

    let target_arg = target.path().join("sorted").display().to_string();
    let record = organize(
        &fixture,
        &["--by-type", "--copy", "--target-dir", &target_arg, "--execute"],
    );

    assert_eq!(record.success_count(), 1);
    fixture.assert_file_exists("song.mp3");
    let copied = target.path().join("sorted").join("Audio").join("song.mp3");
    assert_eq!(fs::read_to_string(copied).unwrap(), "la la");
    assert!(target.path().join("sorted").join(HISTORY_FILE_NAME).exists());
}

// ============================================================================
// Test Suite 2: Dry Run
// ============================================================================

#[test]
fn test_dry_run_changes_nothing() {
    let fixture = TestFixture::new();
    fixture.create_sized_file("a.jpg", 500 * KIB);
    fixture.create_text_file("b.pdf", "pdf");
    fixture.create_text_file("nested/c.mp3", "mp3");
    let before = fixture.snapshot();

    let record = organize(&fixture, &["--by-type", "--recursive"]);

    assert!(record.dry_run);
    assert_eq!(record.entries().len(), 3);
    assert_eq!(record.success_count(), 0);
    assert_eq!(fixture.snapshot(), before);
    fixture.assert_file_not_exists(HISTORY_FILE_NAME);
}

#[test]
fn test_dry_run_with_create_undo_writes_nothing() {
    let fixture = TestFixture::new();
    let scripts = TempDir::new().expect("Failed to create temp directory");
    let script = scripts.path().join("undo.sh");
    fixture.create_text_file("a.jpg", "a");
    let before = fixture.snapshot();

    let script_arg = script.display().to_string();
    organize(
        &fixture,
        &["--by-type", "--create-undo", "--undo-script", &script_arg],
    );

    assert_eq!(fixture.snapshot(), before);
    assert!(!script.exists());
}

#[test]
fn test_dry_run_predicts_live_destinations() {
    let fixture = TestFixture::new();
    fixture.create_text_file("photo.jpg", "top");
    fixture.create_text_file("sub/photo.jpg", "nested");
    fixture.create_text_file("Images/photo.jpg", "already there");

    let plan = build_plan(
        fixture.path(),
        &Strategy::ByType,
        &PlanOptions::default(),
        &CompiledFilters::accept_all(),
    )
    .unwrap();
    let dry = FileOrganizer::execute(&plan, false);
    let live = FileOrganizer::execute(&plan, true);

    let predicted: Vec<_> = plan.operations.iter().map(|op| op.destination.clone()).collect();
    let actual: Vec<_> = live
        .succeeded()
        .filter_map(|entry| entry.final_destination().map(Path::to_path_buf))
        .collect();
    assert_eq!(dry.entries().len(), 1);
    assert_eq!(predicted, actual);
    fixture.assert_file_exists("Images/photo_1.jpg");
}

// ============================================================================
// Test Suite 3: Conflict Resolution
// ============================================================================

#[test]
fn test_conflicting_destinations_get_suffixes() {
    let fixture = TestFixture::new();
    fixture.create_text_file("photo.jpg", "top");
    fixture.create_text_file("sub/photo.jpg", "nested");

    let record = organize(&fixture, &["--by-type", "--recursive", "--execute"]);

    assert_eq!(record.success_count(), 2);
    assert_eq!(fixture.read("Images/photo.jpg"), "top");
    assert_eq!(fixture.read("Images/photo_1.jpg"), "nested");
}

#[test]
fn test_existing_destination_is_never_overwritten() {
    let fixture = TestFixture::new();
    fixture.create_text_file("Documents/report.pdf", "old");
    fixture.create_text_file("Documents/report_1.pdf", "older");
    fixture.create_text_file("report.pdf", "new");

    organize(&fixture, &["--by-type", "--execute"]);

    assert_eq!(fixture.read("Documents/report.pdf"), "old");
    assert_eq!(fixture.read("Documents/report_1.pdf"), "older");
    assert_eq!(fixture.read("Documents/report_2.pdf"), "new");
}

#[test]
fn test_recursive_reorganize_is_idempotent() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a.jpg", "a");
    fixture.create_text_file("b.mp3", "b");
    organize(&fixture, &["--by-type", "--execute"]);
    let organized = fixture.snapshot();

    let record = organize(
        &fixture,
        &["--by-type", "--recursive", "--include-hidden", "--execute"],
    );

    assert!(record.entries().is_empty());
    assert_eq!(fixture.snapshot(), organized);
}

// ============================================================================
// Test Suite 4: Undo
// ============================================================================

#[test]
fn test_undo_move_round_trip() {
    let fixture = TestFixture::new();
    fixture.create_text_file("photo.png", "png");
    fixture.create_text_file("report.pdf", "pdf");
    fixture.create_text_file("song.mp3", "mp3");
    let before = fixture.snapshot();

    organize(&fixture, &["--by-type", "--execute"]);
    fixture.assert_file_exists("Images/photo.png");
    fixture.assert_file_exists(HISTORY_FILE_NAME);

    let dir_arg = fixture.path().display().to_string();
    run_command(&["dirsort", "undo", &dir_arg]).unwrap();

    assert_eq!(fixture.snapshot(), before);
    assert_eq!(fixture.count_dirs(), 0, "Organized folders should be removed");
    fixture.assert_file_not_exists(HISTORY_FILE_NAME);
}

#[test]
fn test_undo_restores_conflict_renamed_files() {
    let fixture = TestFixture::new();
    fixture.create_text_file("photo.jpg", "top");
    fixture.create_text_file("sub/photo.jpg", "nested");

    let record = organize(&fixture, &["--by-type", "--recursive", "--execute"]);
    let plan = generate_undo(&record).unwrap();
    let report = UndoManager::apply(&plan);

    assert_eq!(report.restored_files, 2);
    assert_eq!(fixture.read("photo.jpg"), "top");
    assert_eq!(fixture.read("sub/photo.jpg"), "nested");
    fixture.assert_file_not_exists("Images");
}

#[test]
fn test_undo_copy_deletes_copies() {
    let fixture = TestFixture::new();
    fixture.create_text_file("song.mp3", "la la");
    fixture.create_text_file("photo.png", "png");
    let before = fixture.snapshot();

    organize(&fixture, &["--by-type", "--copy", "--execute"]);
    fixture.assert_file_exists("Audio/song.mp3");

    let report = UndoManager::undo(fixture.path()).unwrap();

    assert_eq!(report.removed_copies, 2);
    assert_eq!(report.restored_files, 0);
    assert_eq!(fixture.snapshot(), before);
    assert_eq!(fixture.count_dirs(), 0);
}

#[test]
fn test_undo_backs_up_file_occupying_original_location() {
    let fixture = TestFixture::new();
    fixture.create_text_file("notes.txt", "organized");
    organize(&fixture, &["--by-type", "--execute"]);
    fixture.create_text_file("notes.txt", "written later");

    let report = UndoManager::undo(fixture.path()).unwrap();

    assert_eq!(report.restored_files, 1);
    assert_eq!(fixture.read("notes.txt"), "organized");
    let backups: Vec<_> = fs::read_dir(fixture.path())
        .unwrap()
        .flatten()
        .filter(|e| e.file_name().to_string_lossy().starts_with("notes.txt.bak."))
        .collect();
    assert_eq!(backups.len(), 1);
    assert_eq!(fs::read_to_string(backups[0].path()).unwrap(), "written later");
}

#[test]
fn test_undo_with_missing_file_keeps_history() {
    let fixture = TestFixture::new();
    fixture.create_text_file("a.png", "a");
    fixture.create_text_file("b.png", "b");
    organize(&fixture, &["--by-type", "--execute"]);
    fs::remove_file(fixture.path().join("Images/a.png")).unwrap();

    let report = UndoManager::undo(fixture.path()).unwrap();

    assert_eq!(report.restored_files, 1);
    assert_eq!(report.skipped_files.len(), 1);
    fixture.assert_file_exists("b.png");
    fixture.assert_file_exists(HISTORY_FILE_NAME);
}

#[test]
fn test_undo_without_history_fails() {
    let fixture = TestFixture::new();
    fixture.create_text_file("photo.png", "png");

    let dir_arg = fixture.path().display().to_string();
    let result = run_command(&["dirsort", "undo", &dir_arg]);

    assert!(result.is_err());
    fixture.assert_file_exists("photo.png");
}

#[test]
fn test_history_reflects_only_successful_operations() {
    let fixture = TestFixture::new();
    fixture.create_text_file("gone.txt", "x");
    fixture.create_text_file("kept.txt", "y");

    let plan = build_plan(
        fixture.path(),
        &Strategy::ByType,
        &PlanOptions {
            mode: TransferMode::Move,
            ..Default::default()
        },
        &CompiledFilters::accept_all(),
    )
    .unwrap();
    fs::remove_file(fixture.path().join("gone.txt")).unwrap();
    let record = FileOrganizer::execute(&plan, true);

    let undo = generate_undo(&record).unwrap();
    undo.save(fixture.path()).unwrap();
    let loaded = UndoPlan::load(fixture.path()).unwrap().unwrap();

    assert_eq!(record.failure_count(), 1);
    assert_eq!(loaded.actions.len(), 1);
    assert_eq!(loaded, undo);
}

#[cfg(unix)]
#[test]
fn test_undo_script_reverts_mixed_run() {
    use std::os::unix::fs::PermissionsExt;
    use std::process::Command;

    let fixture = TestFixture::new();
    let scripts = TempDir::new().expect("Failed to create temp directory");
    let script = scripts.path().join("undo it.sh");
    fixture.create_text_file("it's a photo.jpg", "jpg");
    fixture.create_text_file("sub/photo.jpg", "nested");
    fixture.create_text_file("paper.pdf", "pdf");
    let before = fixture.snapshot();

    let script_arg = script.display().to_string();
    organize(
        &fixture,
        &[
            "--by-type",
            "--recursive",
            "--execute",
            "--create-undo",
            "--undo-script",
            &script_arg,
        ],
    );
    fixture.assert_file_exists("Images/it's a photo.jpg");
    let mode = fs::metadata(&script).unwrap().permissions().mode();
    assert_eq!(mode & 0o111, 0o111, "script should be executable");

    let status = Command::new("sh").arg(&script).status().unwrap();

    assert!(status.success());
    assert_eq!(fixture.snapshot(), before);
    fixture.assert_file_not_exists("Images");
    fixture.assert_file_not_exists("Documents");
    fixture.assert_file_not_exists(HISTORY_FILE_NAME);
}

#[cfg(unix)]
#[test]
fn test_undo_script_for_copies_removes_only_copies() {
    use std::process::Command;

    let fixture = TestFixture::new();
    let scripts = TempDir::new().expect("Failed to create temp directory");
    let script = scripts.path().join("undo.sh");
    fixture.create_text_file("song.mp3", "la la");
    let before = fixture.snapshot();

    let script_arg = script.display().to_string();
    organize(
        &fixture,
        &[
            "--by-type",
            "--copy",
            "--execute",
            "--create-undo",
            "--undo-script",
            &script_arg,
        ],
    );
    let status = Command::new("sh").arg(&script).status().unwrap();

    assert!(status.success());
    assert_eq!(fixture.snapshot(), before);
    fixture.assert_file_not_exists("Audio");
}

// ============================================================================
// Test Suite 5: Configuration, Filtering and Scan Options
// ============================================================================

#[test]
fn test_organize_with_exclude_rules() {
    let fixture = TestFixture::new();
    let config_path = fixture.path().join(".dirsortrc.toml");
    fs::write(
        &config_path,
        r#"
[filters.exclude]
patterns = ["*.tmp"]
extensions = ["bak"]
filenames = ["Thumbs.db"]
"#,
    )
    .expect("Failed to write config");

    fixture.create_text_file("photo.png", "png");
    fixture.create_text_file("temp.tmp", "temporary file");
    fixture.create_text_file("old.bak", "backup");
    fixture.create_text_file("Thumbs.db", "thumbs");

    let config_arg = config_path.display().to_string();
    let dir_arg = fixture.path().display().to_string();
    run_command(&[
        "dirsort",
        "--config",
        &config_arg,
        "organize",
        &dir_arg,
        "--by-type",
        "--execute",
    ])
    .unwrap();

    fixture.assert_file_exists("Images/photo.png");
    fixture.assert_file_exists("temp.tmp");
    fixture.assert_file_exists("old.bak");
    fixture.assert_file_exists("Thumbs.db");
    fixture.assert_file_exists(".dirsortrc.toml");
}

#[test]
fn test_organize_with_include_pattern_overrides_exclude() {
    let fixture = TestFixture::new();
    let config = Config::parse(
        r#"
[filters.exclude]
extensions = ["log"]

[filters.include]
patterns = ["important.log"]
"#,
    )
    .unwrap();
    fixture.create_text_file("important.log", "keep");
    fixture.create_text_file("debug.log", "noise");

    cli::organize(
        &organize_args(fixture.path(), &["--by-type", "--execute"]),
        &config,
    )
    .unwrap();

    fixture.assert_file_exists("Others/important.log");
    fixture.assert_file_exists("debug.log");
}

#[test]
fn test_recursive_and_hidden_options() {
    let fixture = TestFixture::new();
    fixture.create_text_file("top.txt", "t");
    fixture.create_text_file("nested/deep.pdf", "d");
    fixture.create_text_file(".secret.txt", "s");
    fixture.create_text_file(".cache/blob.zip", "b");

    organize(&fixture, &["--by-type", "--execute"]);
    fixture.assert_file_exists("Documents/top.txt");
    fixture.assert_file_exists("nested/deep.pdf");

    organize(&fixture, &["--by-type", "--recursive", "--execute"]);
    fixture.assert_file_exists("Documents/deep.pdf");
    fixture.assert_file_exists(".secret.txt");
    fixture.assert_file_exists(".cache/blob.zip");

    organize(
        &fixture,
        &["--by-type", "--recursive", "--include-hidden", "--execute"],
    );
    fixture.assert_file_exists("Documents/.secret.txt");
    fixture.assert_file_exists("Archives/blob.zip");
    fixture.assert_dir_exists("nested");
}

// ============================================================================
// Test Suite 6: Error Scenarios
// ============================================================================

#[test]
fn test_missing_config_file_is_an_error() {
    let fixture = TestFixture::new();
    fixture.create_text_file("photo.png", "png");
    let dir_arg = fixture.path().display().to_string();

    let result = run_command(&[
        "dirsort",
        "--config",
        "/non/existent/config.toml",
        "organize",
        &dir_arg,
        "--by-type",
        "--execute",
    ]);

    assert!(matches!(
        result,
        Err(CliError::Config(ConfigError::ConfigNotFound(_)))
    ));
    fixture.assert_file_exists("photo.png");
}

#[test]
fn test_invalid_filters_abort_before_planning() {
    let fixture = TestFixture::new();
    fixture.create_text_file("photo.png", "png");
    let config = Config::parse("[filters.exclude]\nregex = [\"[unclosed\"]\n").unwrap();

    let result = cli::organize(
        &organize_args(fixture.path(), &["--by-type", "--execute"]),
        &config,
    );

    assert!(matches!(
        result,
        Err(CliError::Config(ConfigError::InvalidRegexPattern { .. }))
    ));
    fixture.assert_file_exists("photo.png");
}

#[test]
fn test_invalid_strategy_inputs_touch_nothing() {
    let fixture = TestFixture::new();
    fixture.create_text_file("photo.png", "png");
    let before = fixture.snapshot();

    let invalid = [
        vec!["--by-date", "--date-format", "%Y-%Q", "--execute"],
        vec!["--by-name", "{not json", "--execute"],
        vec!["--custom-rules", "/non/existent/rules.json", "--execute"],
    ];
    for extra in &invalid {
        let result = cli::organize(&organize_args(fixture.path(), extra), &Config::default());
        assert!(matches!(result, Err(CliError::Config(_))), "{:?}", extra);
    }

    assert_eq!(fixture.snapshot(), before);
}

#[test]
fn test_missing_source_directory() {
    let result = cli::organize(
        &organize_args(Path::new("/non/existent/source"), &["--by-type"]),
        &Config::default(),
    );

    assert!(matches!(
        result,
        Err(CliError::Config(ConfigError::SourceDirUnreadable { .. }))
    ));
}
