//! Rename pipeline - deriving the destination file name

use chrono::{Local, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};
use std::str::FromStr;

use crate::error::{MoverError, Result};

/// Default timestamp layout, e.g. `2024-03-01_14-05-09`
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// A single literal search/replace step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameRule {
    pub search: String,
    pub replace: String,
}

impl RenameRule {
    pub fn new(search: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            replace: replace.into(),
        }
    }
}

/// Where the timestamp lands relative to prefix and suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampPosition {
    /// Before everything, including the prefix
    Start,
    /// Between prefix and name
    #[default]
    AfterPrefix,
    /// Between name and suffix
    BeforeSuffix,
    /// After everything, including the suffix
    End,
}

impl TimestampPosition {
    pub const ALL: [TimestampPosition; 4] = [
        TimestampPosition::Start,
        TimestampPosition::AfterPrefix,
        TimestampPosition::BeforeSuffix,
        TimestampPosition::End,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimestampPosition::Start => "start",
            TimestampPosition::AfterPrefix => "after_prefix",
            TimestampPosition::BeforeSuffix => "before_suffix",
            TimestampPosition::End => "end",
        }
    }
}

impl FromStr for TimestampPosition {
    type Err = MoverError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| {
                MoverError::config(format!(
                    "invalid timestamp position '{s}', must be one of: start, after_prefix, before_suffix, end"
                ))
            })
    }
}

impl fmt::Display for TimestampPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timestamp insertion settings
#[derive(Debug, Clone, PartialEq)]
pub struct TimestampPolicy {
    enabled: bool,
    format: String,
    /// `None` means the system local time zone
    timezone: Option<Tz>,
    position: TimestampPosition,
}

impl Default for TimestampPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            timezone: None,
            position: TimestampPosition::default(),
        }
    }
}

impl TimestampPolicy {
    /// Build an enabled policy. An empty or absent `timezone` selects local
    /// time; any other value must be an IANA zone name.
    pub fn new(
        format: impl Into<String>,
        timezone: Option<&str>,
        position: TimestampPosition,
    ) -> Result<Self> {
        let timezone = match timezone.filter(|tz| !tz.is_empty()) {
            Some(name) => Some(name.parse::<Tz>().map_err(|_| {
                MoverError::config(format!("invalid timezone '{name}', must be an IANA zone name"))
            })?),
            None => None,
        };

        Ok(Self {
            enabled: true,
            format: format.into(),
            timezone,
            position,
        })
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn timezone(&self) -> Option<&str> {
        self.timezone.as_ref().map(|tz| tz.name())
    }

    pub fn position(&self) -> TimestampPosition {
        self.position
    }

    /// Render the current time. Computed on every call, never cached.
    pub fn timestamp(&self) -> Result<String> {
        let mut out = String::new();
        let written = match self.timezone {
            Some(tz) => write!(out, "{}", Utc::now().with_timezone(&tz).format(&self.format)),
            None => write!(out, "{}", Local::now().format(&self.format)),
        };
        written.map_err(|_| {
            MoverError::InvalidInput(format!("cannot render timestamp format '{}'", self.format))
        })?;
        Ok(out)
    }
}

/// Ordered name transformation: replacements, prefix/suffix, timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct RenamePipeline {
    enabled: bool,
    case_sensitive: bool,
    prefix: String,
    suffix: String,
    rules: Vec<RenameRule>,
    timestamp: TimestampPolicy,
}

impl Default for RenamePipeline {
    fn default() -> Self {
        Self::disabled()
    }
}

impl RenamePipeline {
    pub fn builder() -> RenamePipelineBuilder {
        RenamePipelineBuilder::default()
    }

    /// Identity transform
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            case_sensitive: false,
            prefix: String::new(),
            suffix: String::new(),
            rules: Vec::new(),
            timestamp: TimestampPolicy::disabled(),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn rules(&self) -> &[RenameRule] {
        &self.rules
    }

    pub fn timestamp(&self) -> &TimestampPolicy {
        &self.timestamp
    }

    /// Transform `file_name`.
    ///
    /// In case-insensitive mode every replace step lower-cases the whole
    /// working name, including the parts the search term does not touch.
    pub fn apply(&self, file_name: &str) -> Result<String> {
        if !self.enabled {
            return Ok(file_name.to_string());
        }
        if file_name.is_empty() {
            return Err(MoverError::InvalidInput("file name cannot be empty".into()));
        }

        let mut name = file_name.to_string();

        for rule in &self.rules {
            name = if self.case_sensitive {
                name.replace(&rule.search, &rule.replace)
            } else {
                name.to_lowercase()
                    .replace(&rule.search.to_lowercase(), &rule.replace)
            };
        }

        let ts = &self.timestamp;
        if ts.enabled {
            match ts.position {
                TimestampPosition::AfterPrefix => name = format!("{}_{}", ts.timestamp()?, name),
                TimestampPosition::BeforeSuffix => name = format!("{}_{}", name, ts.timestamp()?),
                TimestampPosition::Start | TimestampPosition::End => {}
            }
        }

        if !self.prefix.is_empty() {
            name.insert_str(0, &self.prefix);
        }
        if !self.suffix.is_empty() {
            name.push_str(&self.suffix);
        }

        if ts.enabled {
            match ts.position {
                TimestampPosition::Start => name = format!("{}_{}", ts.timestamp()?, name),
                TimestampPosition::End => name = format!("{}_{}", name, ts.timestamp()?),
                TimestampPosition::AfterPrefix | TimestampPosition::BeforeSuffix => {}
            }
        }

        if name.is_empty() {
            return Err(MoverError::InvalidInput(format!(
                "renaming '{file_name}' produced an empty name"
            )));
        }

        Ok(name)
    }
}

/// Incremental construction of an enabled [`RenamePipeline`]
#[derive(Debug, Clone)]
pub struct RenamePipelineBuilder {
    enabled: bool,
    case_sensitive: bool,
    prefix: String,
    suffix: String,
    rules: Vec<RenameRule>,
    timestamp: TimestampPolicy,
}

impl Default for RenamePipelineBuilder {
    fn default() -> Self {
        Self {
            enabled: true,
            case_sensitive: false,
            prefix: String::new(),
            suffix: String::new(),
            rules: Vec::new(),
            timestamp: TimestampPolicy::disabled(),
        }
    }
}

impl RenamePipelineBuilder {
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn replace(mut self, search: impl Into<String>, replace: impl Into<String>) -> Self {
        self.rules.push(RenameRule::new(search, replace));
        self
    }

    pub fn rules(mut self, rules: Vec<RenameRule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn timestamp(mut self, timestamp: TimestampPolicy) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn build(self) -> RenamePipeline {
        RenamePipeline {
            enabled: self.enabled,
            case_sensitive: self.case_sensitive,
            prefix: self.prefix,
            suffix: self.suffix,
            rules: self.rules,
            timestamp: self.timestamp,
        }
    }
}
