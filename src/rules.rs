//! Custom JSON rule sets.
//!
//! A rule set is an ordered list of rules; the first rule whose conditions
//! all hold decides the folder, otherwise `default_folder` is used.
//!
//! ```json
//! {
//!   "description": "Invoices",
//!   "default_folder": "Others",
//!   "rules": [
//!     {
//!       "name": "Invoices",
//!       "folder": "Finance",
//!       "conditions": { "extensions": [".pdf"], "name_contains": "invoice" }
//!     }
//!   ]
//! }
//! ```

use crate::config::ConfigError;
use crate::scanner::FileEntry;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const ONE_MIB: u64 = 1024 * 1024;

/// An ordered custom rule set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_folder")]
    pub default_folder: String,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

/// A single named rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    #[serde(default = "default_folder")]
    pub folder: String,
    #[serde(default)]
    pub conditions: Conditions,
}

/// Conditions of a rule. Absent conditions are ignored; present ones are ANDed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conditions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_contains: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_range: Option<SizeRange>,
}

/// Inclusive byte range, written as `[min, max]`; a `null` max is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeRange(pub u64, pub Option<u64>);

impl SizeRange {
    pub fn contains(&self, size: u64) -> bool {
        size >= self.0 && self.1.is_none_or(|max| size <= max)
    }
}

fn default_folder() -> String {
    "Others".to_string()
}

impl RuleSet {
    /// Load and validate a rule set from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content).map_err(|reason| ConfigError::InvalidRules {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Parse and validate a rule set from JSON text.
    ///
    /// Extensions are normalized to lower case with a leading dot.
    pub fn parse(json: &str) -> Result<Self, String> {
        let mut rule_set: RuleSet = serde_json::from_str(json).map_err(|e| e.to_string())?;

        if rule_set.default_folder.trim().is_empty() {
            return Err("default_folder must not be empty".to_string());
        }

        for rule in &mut rule_set.rules {
            if rule.folder.trim().is_empty() {
                return Err(format!("rule '{}' has an empty folder", rule.name));
            }
            if let Some(SizeRange(min, Some(max))) = rule.conditions.size_range
                && min > max
            {
                return Err(format!(
                    "rule '{}' has size_range min {} greater than max {}",
                    rule.name, min, max
                ));
            }
            if let Some(extensions) = rule.conditions.extensions.as_mut() {
                for ext in extensions.iter_mut() {
                    *ext = normalize_extension(ext);
                }
            }
        }

        Ok(rule_set)
    }

    /// Returns the folder label for `entry`.
    pub fn resolve(&self, entry: &FileEntry) -> &str {
        self.matching_rule(entry)
            .map(|rule| rule.folder.as_str())
            .unwrap_or(&self.default_folder)
    }

    /// Returns the first rule matching `entry`, if any.
    pub fn matching_rule(&self, entry: &FileEntry) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.matches(entry))
    }

    /// The sample rule set written by `dirsort sample-rules`.
    pub fn sample() -> Self {
        let rule = |name: &str, folder: &str, conditions: Conditions| Rule {
            name: name.to_string(),
            folder: folder.to_string(),
            conditions,
        };
        let exts = |list: &[&str]| -> Option<Vec<String>> {
            Some(list.iter().map(|e| e.to_string()).collect())
        };

        RuleSet {
            description: "Sample custom organization rules".to_string(),
            default_folder: default_folder(),
            rules: vec![
                rule(
                    "Work Documents",
                    "Work",
                    Conditions {
                        extensions: exts(&[".docx", ".xlsx", ".pptx"]),
                        name_contains: Some("work".to_string()),
                        size_range: None,
                    },
                ),
                rule(
                    "Screenshots",
                    "Screenshots",
                    Conditions {
                        extensions: exts(&[".png", ".jpg"]),
                        name_contains: Some("screenshot".to_string()),
                        size_range: None,
                    },
                ),
                rule(
                    "Large Videos",
                    "Large Videos",
                    Conditions {
                        extensions: exts(&[".mp4", ".avi", ".mkv"]),
                        name_contains: None,
                        size_range: Some(SizeRange(100 * ONE_MIB, None)),
                    },
                ),
                rule(
                    "Project Files",
                    "Projects",
                    Conditions {
                        extensions: exts(&[".py", ".js", ".html", ".css"]),
                        name_contains: None,
                        size_range: None,
                    },
                ),
            ],
        }
    }

    /// Write the rule set as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::ConfigInvalid(e.to_string()))?;
        fs::write(path, json).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

impl Rule {
    /// True when every present condition holds for `entry`.
    pub fn matches(&self, entry: &FileEntry) -> bool {
        let conditions = &self.conditions;

        if let Some(extensions) = &conditions.extensions
            && !extensions.iter().any(|ext| *ext == entry.extension)
        {
            return false;
        }

        if let Some(needle) = &conditions.name_contains
            && !entry.name.to_lowercase().contains(&needle.to_lowercase())
        {
            return false;
        }

        if let Some(range) = conditions.size_range
            && !range.contains(entry.size)
        {
            return false;
        }

        true
    }
}

fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.is_empty() || ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}
