//! Configuration schema - the persisted (JSON or TOML) document

use crate::rules::RenameRule;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A config file holding any number of movers
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// Mover definitions, run in order
    #[serde(default)]
    pub movers: Vec<MoverDocument>,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Flat mapping describing one mover.
///
/// Singular keys (`source_directory`, `file_type`, ...) are shorthand for a
/// one-element list and win over their plural form when both are present.
/// Policy values stay as strings here and are checked when the document is
/// turned into a [`crate::MoverConfig`].
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct MoverDocument {
    #[serde(default, alias = "mover_name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, alias = "mover_description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_directory: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_directories: Vec<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_directory: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub destination_directories: Vec<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub file_types: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type_regex: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type_exclude_regex: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub file_names: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name_regex: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name_exclude_regex: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name_contains: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name_starts_with: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name_ends_with: Option<String>,

    /// Walk source directories recursively
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recursive: Option<bool>,

    /// Older boolean form of `keep_source_behavior`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_source: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_source_behavior: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_collision_behavior: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collision_avoidance_behavior: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rename: Option<RenameDocument>,
}

/// `rename` sub-document. Its presence enables renaming unless `enabled`
/// is explicitly false.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RenameDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_sensitive: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replace: Vec<RenameRule>,

    #[serde(default, alias = "add_timestamp", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<TimestampDocument>,
}

/// `rename.timestamp` sub-document, enabled by presence like `rename`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TimestampDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}
