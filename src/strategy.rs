//! Organization strategies.
//!
//! A [`Strategy`] turns a [`FileEntry`] into a destination label. Every
//! variant carries exactly the parameters it needs, and
//! [`Strategy::classify`] is the only place that dispatches on the variant.
//! Constructors validate their input so that a bad format string or a
//! malformed rules file is reported before any file is touched.

use crate::config::ConfigError;
use crate::file_category::FileMapper;
use crate::rules::RuleSet;
use crate::scanner::FileEntry;
use chrono::format::{Item, StrftimeItems};
use indexmap::IndexMap;
use std::path::Path;
use std::sync::LazyLock;

/// Label for files no strategy could place.
pub const FALLBACK_LABEL: &str = "Others";

const ONE_MIB: u64 = 1024 * 1024;

static FILE_MAPPER: LazyLock<FileMapper> = LazyLock::new(FileMapper::default);

/// Which timestamp the by-date strategy reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateBasis {
    #[default]
    Modified,
    Created,
}

/// The single active organization strategy of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    /// Fixed extension → category table.
    ByType,
    /// `strftime` label of a timestamp; `/` in the result nests folders.
    ByDate { format: String, basis: DateBasis },
    /// Four fixed size buckets.
    BySize,
    /// Label → case-sensitive substring, checked in insertion order.
    ByName(IndexMap<String, String>),
    /// Ordered JSON rules with a default folder.
    CustomRules(RuleSet),
}

impl Strategy {
    /// Date strategy with a validated format string.
    pub fn by_date(format: &str, basis: DateBasis) -> Result<Self, ConfigError> {
        let invalid = format.trim().is_empty()
            || StrftimeItems::new(format).any(|item| matches!(item, Item::Error));
        if invalid {
            return Err(ConfigError::InvalidDateFormat(format.to_string()));
        }
        Ok(Strategy::ByDate {
            format: format.to_string(),
            basis,
        })
    }

    /// Name strategy from a JSON object of `{"label": "substring"}`.
    pub fn by_name_json(json: &str) -> Result<Self, ConfigError> {
        let patterns: IndexMap<String, String> = serde_json::from_str(json)
            .map_err(|e| ConfigError::InvalidNamePatterns(e.to_string()))?;
        if let Some((label, _)) = patterns.iter().find(|(label, _)| label.trim().is_empty()) {
            return Err(ConfigError::InvalidNamePatterns(format!(
                "empty folder label '{}'",
                label
            )));
        }
        Ok(Strategy::ByName(patterns))
    }

    /// Custom rules strategy loaded from a JSON rules file.
    pub fn custom_rules_file(path: &Path) -> Result<Self, ConfigError> {
        RuleSet::load(path).map(Strategy::CustomRules)
    }

    /// Short human-readable name, used in console output.
    pub fn describe(&self) -> &'static str {
        match self {
            Strategy::ByType => "type",
            Strategy::ByDate { .. } => "date",
            Strategy::BySize => "size",
            Strategy::ByName(_) => "name patterns",
            Strategy::CustomRules(_) => "custom rules",
        }
    }

    /// Computes the destination label for `entry`.
    ///
    /// Pure: the result depends only on the entry snapshot and the strategy.
    pub fn classify(&self, entry: &FileEntry) -> String {
        match self {
            Strategy::ByType => FILE_MAPPER.categorize(&entry.extension).dir_name().to_string(),
            Strategy::ByDate { format, basis } => {
                let timestamp = match basis {
                    DateBasis::Modified => entry.modified,
                    DateBasis::Created => entry.created,
                };
                timestamp.format(format).to_string()
            }
            Strategy::BySize => size_bucket(entry.size).to_string(),
            Strategy::ByName(patterns) => patterns
                .iter()
                .find(|(_, needle)| entry.name.contains(needle.as_str()))
                .map(|(label, _)| label.clone())
                .unwrap_or_else(|| FALLBACK_LABEL.to_string()),
            Strategy::CustomRules(rules) => rules.resolve(entry).to_string(),
        }
    }
}

/// Size bucket label: lower bounds inclusive, upper bounds exclusive.
pub fn size_bucket(size: u64) -> &'static str {
    if size < ONE_MIB {
        "Small (< 1MB)"
    } else if size < 10 * ONE_MIB {
        "Medium (1-10MB)"
    } else if size < 100 * ONE_MIB {
        "Large (10-100MB)"
    } else {
        "Very Large (> 100MB)"
    }
}
