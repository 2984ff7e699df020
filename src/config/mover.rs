//! Validated mover configuration and its builder

use std::fmt;
use std::path::PathBuf;

use super::schema::{MoverDocument, RenameDocument, TimestampDocument};
use crate::error::{MoverError, Result};
use crate::rules::{
    CollisionAvoidance, DestinationCollision, MatchRules, MatchRulesBuilder, RenamePipeline,
    SourceRetention, TimestampPolicy, TimestampPosition, DEFAULT_TIMESTAMP_FORMAT,
};

const DEFAULT_NAME: &str = "default_mover";
const DEFAULT_DESCRIPTION: &str = "No description provided";

/// Frozen configuration for one mover. Built once through
/// [`MoverConfigBuilder`] or [`MoverConfig::from_document`]; never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct MoverConfig {
    name: String,
    description: String,
    source_directories: Vec<PathBuf>,
    destination_directories: Vec<PathBuf>,
    match_rules: MatchRules,
    rename: Option<RenamePipeline>,
    recursive: bool,
    keep_source_behavior: SourceRetention,
    destination_collision_behavior: DestinationCollision,
    collision_avoidance_behavior: CollisionAvoidance,
}

impl MoverConfig {
    pub fn builder() -> MoverConfigBuilder {
        MoverConfigBuilder::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn source_directories(&self) -> &[PathBuf] {
        &self.source_directories
    }

    pub fn destination_directories(&self) -> &[PathBuf] {
        &self.destination_directories
    }

    pub fn match_rules(&self) -> &MatchRules {
        &self.match_rules
    }

    /// The rename pipeline, present only when enabled
    pub fn rename(&self) -> Option<&RenamePipeline> {
        self.rename.as_ref()
    }

    pub fn recursive(&self) -> bool {
        self.recursive
    }

    pub fn keep_source_behavior(&self) -> SourceRetention {
        self.keep_source_behavior
    }

    pub fn destination_collision_behavior(&self) -> DestinationCollision {
        self.destination_collision_behavior
    }

    pub fn collision_avoidance_behavior(&self) -> CollisionAvoidance {
        self.collision_avoidance_behavior
    }

    /// Validate a persisted document into a config
    pub fn from_document(doc: &MoverDocument) -> Result<Self> {
        let mut builder = MoverConfig::builder();

        if let Some(ref name) = doc.name {
            builder = builder.name(name);
        }
        if let Some(ref description) = doc.description {
            builder = builder.description(description);
        }

        builder = match doc.source_directory {
            Some(ref dir) => builder.source_directory(crate::expand_path(dir)),
            None => builder.source_directories(
                doc.source_directories.iter().map(|d| crate::expand_path(d)),
            ),
        };
        builder = match doc.destination_directory {
            Some(ref dir) => builder.destination_directory(crate::expand_path(dir)),
            None => builder.destination_directories(
                doc.destination_directories.iter().map(|d| crate::expand_path(d)),
            ),
        };

        builder = match doc.file_type {
            Some(ref t) => builder.file_type(t),
            None => builder.file_types(doc.file_types.iter().cloned()),
        };
        builder = match doc.file_name {
            Some(ref n) => builder.file_name(n),
            None => builder.file_names(doc.file_names.iter().cloned()),
        };

        let rules = &mut builder.rules;
        rules.file_type_regex = doc.file_type_regex.clone();
        rules.file_type_exclude_regex = doc.file_type_exclude_regex.clone();
        rules.file_name_regex = doc.file_name_regex.clone();
        rules.file_name_exclude_regex = doc.file_name_exclude_regex.clone();
        rules.file_name_contains = doc.file_name_contains.clone();
        rules.file_name_starts_with = doc.file_name_starts_with.clone();
        rules.file_name_ends_with = doc.file_name_ends_with.clone();

        if let Some(recursive) = doc.recursive {
            builder = builder.recursive(recursive);
        }

        if let Some(ref behavior) = doc.keep_source_behavior {
            builder = builder.keep_source_behavior(behavior.parse()?);
        } else if let Some(keep) = doc.keep_source {
            builder = builder.keep_source_behavior(if keep {
                SourceRetention::AlwaysKeep
            } else {
                SourceRetention::NeverKeep
            });
        }
        if let Some(ref behavior) = doc.destination_collision_behavior {
            builder = builder.destination_collision_behavior(behavior.parse()?);
        }
        if let Some(ref behavior) = doc.collision_avoidance_behavior {
            builder = builder.collision_avoidance_behavior(behavior.parse()?);
        }

        if let Some(ref rename) = doc.rename {
            builder = builder.rename(rename_from_document(rename)?);
        }

        builder.build()
    }

    /// Convert back into the persisted form, always using plural keys
    pub fn to_document(&self) -> MoverDocument {
        let rules = &self.match_rules;
        MoverDocument {
            name: Some(self.name.clone()),
            description: Some(self.description.clone()),
            source_directories: self.source_directories.clone(),
            destination_directories: self.destination_directories.clone(),
            file_types: rules.file_types().to_vec(),
            file_type_regex: rules.file_type_regex().map(str::to_string),
            file_type_exclude_regex: rules.file_type_exclude_regex().map(str::to_string),
            file_names: rules.file_names().to_vec(),
            file_name_regex: rules.file_name_regex().map(str::to_string),
            file_name_exclude_regex: rules.file_name_exclude_regex().map(str::to_string),
            file_name_contains: rules.file_name_contains().map(str::to_string),
            file_name_starts_with: rules.file_name_starts_with().map(str::to_string),
            file_name_ends_with: rules.file_name_ends_with().map(str::to_string),
            recursive: Some(self.recursive),
            keep_source_behavior: Some(self.keep_source_behavior.to_string()),
            destination_collision_behavior: Some(self.destination_collision_behavior.to_string()),
            collision_avoidance_behavior: Some(self.collision_avoidance_behavior.to_string()),
            rename: self.rename.as_ref().map(rename_to_document),
            ..Default::default()
        }
    }
}

impl fmt::Display for MoverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.description)
    }
}

fn rename_from_document(doc: &RenameDocument) -> Result<RenamePipeline> {
    let timestamp = match doc.timestamp {
        Some(ref ts) if ts.enabled.unwrap_or(true) => {
            let position = match ts.position {
                Some(ref p) => p.parse::<TimestampPosition>()?,
                None => TimestampPosition::default(),
            };
            TimestampPolicy::new(
                ts.format.as_deref().unwrap_or(DEFAULT_TIMESTAMP_FORMAT),
                ts.timezone.as_deref(),
                position,
            )?
        }
        Some(ref ts) => {
            // Disabled, but an invalid position or zone is still rejected
            if let Some(ref p) = ts.position {
                p.parse::<TimestampPosition>()?;
            }
            if let Some(ref tz) = ts.timezone {
                TimestampPolicy::new(DEFAULT_TIMESTAMP_FORMAT, Some(tz), TimestampPosition::default())?;
            }
            TimestampPolicy::disabled()
        }
        None => TimestampPolicy::disabled(),
    };

    Ok(RenamePipeline::builder()
        .enabled(doc.enabled.unwrap_or(true))
        .case_sensitive(doc.case_sensitive.unwrap_or(false))
        .prefix(doc.prefix.clone().unwrap_or_default())
        .suffix(doc.suffix.clone().unwrap_or_default())
        .rules(doc.replace.clone())
        .timestamp(timestamp)
        .build())
}

fn rename_to_document(rename: &RenamePipeline) -> RenameDocument {
    let ts = rename.timestamp();
    RenameDocument {
        enabled: Some(rename.enabled()),
        case_sensitive: Some(rename.case_sensitive()),
        prefix: Some(rename.prefix().to_string()).filter(|s| !s.is_empty()),
        suffix: Some(rename.suffix().to_string()).filter(|s| !s.is_empty()),
        replace: rename.rules().to_vec(),
        timestamp: ts.enabled().then(|| TimestampDocument {
            enabled: Some(true),
            format: Some(ts.format().to_string()),
            timezone: ts.timezone().map(str::to_string),
            position: Some(ts.position().to_string()),
        }),
    }
}

/// Mutable, incremental assembly of a [`MoverConfig`]
#[derive(Debug, Clone, Default)]
pub struct MoverConfigBuilder {
    name: Option<String>,
    description: Option<String>,
    source_directories: Vec<PathBuf>,
    destination_directories: Vec<PathBuf>,
    rules: MatchRulesBuilder,
    rename: Option<RenamePipeline>,
    recursive: bool,
    keep_source_behavior: SourceRetention,
    destination_collision_behavior: DestinationCollision,
    collision_avoidance_behavior: CollisionAvoidance,
}

impl MoverConfigBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replace the source list with a single directory
    pub fn source_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_directories = vec![dir.into()];
        self
    }

    pub fn source_directories<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.source_directories = dirs.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the destination list with a single directory
    pub fn destination_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.destination_directories = vec![dir.into()];
        self
    }

    pub fn destination_directories<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.destination_directories = dirs.into_iter().map(Into::into).collect();
        self
    }

    pub fn file_type(mut self, file_type: impl Into<String>) -> Self {
        self.rules.file_types = vec![file_type.into()];
        self
    }

    pub fn file_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules.file_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn file_type_regex(mut self, pattern: impl Into<String>) -> Self {
        self.rules.file_type_regex = Some(pattern.into());
        self
    }

    pub fn file_type_exclude_regex(mut self, pattern: impl Into<String>) -> Self {
        self.rules.file_type_exclude_regex = Some(pattern.into());
        self
    }

    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.rules.file_names = vec![name.into()];
        self
    }

    pub fn file_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules.file_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn file_name_regex(mut self, pattern: impl Into<String>) -> Self {
        self.rules.file_name_regex = Some(pattern.into());
        self
    }

    pub fn file_name_exclude_regex(mut self, pattern: impl Into<String>) -> Self {
        self.rules.file_name_exclude_regex = Some(pattern.into());
        self
    }

    pub fn file_name_contains(mut self, needle: impl Into<String>) -> Self {
        self.rules.file_name_contains = Some(needle.into());
        self
    }

    pub fn file_name_starts_with(mut self, prefix: impl Into<String>) -> Self {
        self.rules.file_name_starts_with = Some(prefix.into());
        self
    }

    pub fn file_name_ends_with(mut self, suffix: impl Into<String>) -> Self {
        self.rules.file_name_ends_with = Some(suffix.into());
        self
    }

    /// A disabled pipeline is dropped at build time
    pub fn rename(mut self, rename: RenamePipeline) -> Self {
        self.rename = Some(rename);
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn keep_source_behavior(mut self, behavior: SourceRetention) -> Self {
        self.keep_source_behavior = behavior;
        self
    }

    pub fn destination_collision_behavior(mut self, behavior: DestinationCollision) -> Self {
        self.destination_collision_behavior = behavior;
        self
    }

    pub fn collision_avoidance_behavior(mut self, behavior: CollisionAvoidance) -> Self {
        self.collision_avoidance_behavior = behavior;
        self
    }

    /// Validate and freeze
    pub fn build(self) -> Result<MoverConfig> {
        check_directories(&self.source_directories, "source")?;
        check_directories(&self.destination_directories, "destination")?;
        let match_rules = self.rules.build()?;

        Ok(MoverConfig {
            name: self.name.unwrap_or_else(|| DEFAULT_NAME.to_string()),
            description: self
                .description
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            source_directories: self.source_directories,
            destination_directories: self.destination_directories,
            match_rules,
            rename: self.rename.filter(RenamePipeline::enabled),
            recursive: self.recursive,
            keep_source_behavior: self.keep_source_behavior,
            destination_collision_behavior: self.destination_collision_behavior,
            collision_avoidance_behavior: self.collision_avoidance_behavior,
        })
    }
}

fn check_directories(dirs: &[PathBuf], kind: &str) -> Result<()> {
    if dirs.is_empty() {
        return Err(MoverError::config(format!(
            "at least one {kind} directory must be specified"
        )));
    }
    if dirs.iter().any(|d| d.as_os_str().is_empty()) {
        return Err(MoverError::config(format!("{kind} directory cannot be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> MoverConfigBuilder {
        MoverConfig::builder()
            .source_directory("/in")
            .destination_directory("/out")
            .file_type("txt")
    }

    #[test]
    fn test_builder_defaults() {
        let config = minimal().build().unwrap();
        assert_eq!(config.name(), "default_mover");
        assert_eq!(config.description(), "No description provided");
        assert!(!config.recursive());
        assert!(config.rename().is_none());
        assert_eq!(config.keep_source_behavior(), SourceRetention::NeverKeep);
        assert_eq!(config.destination_collision_behavior(), DestinationCollision::Ignore);
        assert_eq!(config.collision_avoidance_behavior(), CollisionAvoidance::None);
        assert_eq!(config.to_string(), "default_mover: No description provided");
    }

    #[test]
    fn test_missing_directories_rejected() {
        let err = MoverConfig::builder()
            .destination_directory("/out")
            .file_type("txt")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("source"));

        let err = MoverConfig::builder()
            .source_directory("/in")
            .file_type("txt")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("destination"));

        let err = MoverConfig::builder()
            .source_directory("")
            .destination_directory("/out")
            .file_type("txt")
            .build()
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_no_rule_rejected() {
        let err = MoverConfig::builder()
            .source_directory("/in")
            .destination_directory("/out")
            .build()
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_disabled_rename_dropped() {
        let config = minimal()
            .rename(RenamePipeline::builder().prefix("x").enabled(false).build())
            .build()
            .unwrap();
        assert!(config.rename().is_none());
    }

    #[test]
    fn test_from_document_singular_wins() {
        let doc: MoverDocument = serde_json::from_value(serde_json::json!({
            "source_directory": "/a",
            "source_directories": ["/b", "/c"],
            "destination_directories": ["/x", "/y"],
            "file_type": "csv",
            "file_types": ["txt"],
        }))
        .unwrap();
        let config = MoverConfig::from_document(&doc).unwrap();
        assert_eq!(config.source_directories(), &[PathBuf::from("/a")]);
        assert_eq!(config.destination_directories().len(), 2);
        assert_eq!(config.match_rules().file_types(), &["csv".to_string()]);
    }

    #[test]
    fn test_from_document_policies() {
        let doc: MoverDocument = serde_json::from_value(serde_json::json!({
            "source_directory": "/a",
            "destination_directory": "/b",
            "file_name_contains": "data",
            "keep_source_behavior": "keep_if_none_collide",
            "destination_collision_behavior": "overwrite",
            "collision_avoidance_behavior": "cancel_if_any_collide",
        }))
        .unwrap();
        let config = MoverConfig::from_document(&doc).unwrap();
        assert_eq!(config.keep_source_behavior(), SourceRetention::KeepIfNoneCollide);
        assert_eq!(config.destination_collision_behavior(), DestinationCollision::Overwrite);
        assert_eq!(
            config.collision_avoidance_behavior(),
            CollisionAvoidance::CancelIfAnyCollide
        );
    }

    #[test]
    fn test_from_document_legacy_keep_source() {
        let doc: MoverDocument = serde_json::from_value(serde_json::json!({
            "source_directory": "/a",
            "destination_directory": "/b",
            "file_type": "txt",
            "keep_source": true,
        }))
        .unwrap();
        let config = MoverConfig::from_document(&doc).unwrap();
        assert_eq!(config.keep_source_behavior(), SourceRetention::AlwaysKeep);
    }

    #[test]
    fn test_from_document_invalid_values() {
        let base = serde_json::json!({
            "source_directory": "/a",
            "destination_directory": "/b",
            "file_type": "txt",
        });

        for (key, value) in [
            ("keep_source_behavior", serde_json::json!("maybe")),
            ("destination_collision_behavior", serde_json::json!("merge")),
            ("collision_avoidance_behavior", serde_json::json!("always")),
            ("file_name_regex", serde_json::json!("[")),
            ("rename", serde_json::json!({"timestamp": {"timezone": "Mars/Olympus"}})),
            ("rename", serde_json::json!({"timestamp": {"position": "middle"}})),
        ] {
            let mut json = base.clone();
            json[key] = value;
            let doc: MoverDocument = serde_json::from_value(json).unwrap();
            let err = MoverConfig::from_document(&doc).unwrap_err();
            assert!(err.is_configuration(), "{key} should be rejected");
        }
    }

    #[test]
    fn test_from_document_rename_enabled_by_presence() {
        let doc: MoverDocument = serde_json::from_value(serde_json::json!({
            "source_directory": "/a",
            "destination_directory": "/b",
            "file_type": "txt",
            "rename": {
                "prefix": "PRE_",
                "timestamp": {"position": "after_prefix", "timezone": "UTC"}
            },
        }))
        .unwrap();
        let config = MoverConfig::from_document(&doc).unwrap();
        let rename = config.rename().unwrap();
        assert_eq!(rename.prefix(), "PRE_");
        assert!(rename.timestamp().enabled());
        assert_eq!(rename.timestamp().timezone(), Some("UTC"));

        let renamed = rename.apply("file.txt").unwrap();
        assert!(renamed.starts_with("PRE_"));
        assert!(renamed.ends_with("_file.txt"));
    }

    #[test]
    fn test_document_round_trip() {
        let config = minimal()
            .name("docs")
            .source_directories(["/in", "/also"])
            .file_name_regex("^draft")
            .recursive(true)
            .keep_source_behavior(SourceRetention::KeepIfAnyCollide)
            .rename(
                RenamePipeline::builder()
                    .suffix("_old")
                    .replace("draft", "final")
                    .timestamp(
                        TimestampPolicy::new("%Y", Some("Europe/Paris"), TimestampPosition::End)
                            .unwrap(),
                    )
                    .build(),
            )
            .build()
            .unwrap();

        let doc = config.to_document();
        assert_eq!(doc.keep_source_behavior.as_deref(), Some("keep_if_any_collide"));
        let back = MoverConfig::from_document(&doc).unwrap();
        assert_eq!(back, config);
    }
}
