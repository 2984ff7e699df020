//! Match rules - deciding from a file name whether a file qualifies

use regex::Regex;
use std::fmt;

use crate::error::{MoverError, Result};

/// A regex that only matches from the first character of its input.
///
/// The pattern is not required to consume the whole input: `xl(s|t)x?$`
/// accepts `xls`, and `report` accepts `report_2024`.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self> {
        // Validate on its own first so the error points at the user's text
        Regex::new(source)
            .map_err(|e| MoverError::config(format!("invalid regex '{source}': {e}")))?;
        let regex = Regex::new(&format!(r"\A(?:{source})"))
            .map_err(|e| MoverError::config(format!("invalid regex '{source}': {e}")))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches_start(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// Split a file name into `(name, type)` at the last extension separator.
///
/// Leading dots do not start an extension, so `.bashrc` has no type. A name
/// without a separator has an empty type.
pub fn split_name(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(dot) if file_name[..dot].bytes().any(|b| b != b'.') => {
            (&file_name[..dot], &file_name[dot + 1..])
        }
        _ => (file_name, ""),
    }
}

/// Validated, compiled set of match rules (all configured rules must pass)
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRules {
    file_types: Vec<String>,
    file_type_regex: Option<Pattern>,
    file_type_exclude_regex: Option<Pattern>,
    file_names: Vec<String>,
    file_name_regex: Option<Pattern>,
    file_name_exclude_regex: Option<Pattern>,
    file_name_contains: Option<String>,
    file_name_starts_with: Option<String>,
    file_name_ends_with: Option<String>,
}

impl MatchRules {
    pub fn builder() -> MatchRulesBuilder {
        MatchRulesBuilder::default()
    }

    /// Check whether a file name (with extension, without directory) qualifies
    pub fn matches(&self, file_name: &str) -> bool {
        if file_name.is_empty() {
            return false;
        }

        let (name, file_type) = split_name(file_name);

        // File type
        if !self.file_types.is_empty() && !self.file_types.iter().any(|t| t == file_type) {
            return false;
        }
        if let Some(ref re) = self.file_type_regex
            && !re.matches_start(file_type)
        {
            return false;
        }
        if let Some(ref re) = self.file_type_exclude_regex
            && re.matches_start(file_type)
        {
            return false;
        }

        // File name
        if !self.file_names.is_empty() && !self.file_names.iter().any(|n| n == name) {
            return false;
        }
        if let Some(ref re) = self.file_name_regex
            && !re.matches_start(name)
        {
            return false;
        }
        if let Some(ref re) = self.file_name_exclude_regex
            && re.matches_start(name)
        {
            return false;
        }
        if let Some(ref needle) = self.file_name_contains
            && !name.contains(needle.as_str())
        {
            return false;
        }
        if let Some(ref prefix) = self.file_name_starts_with
            && !name.starts_with(prefix.as_str())
        {
            return false;
        }
        if let Some(ref suffix) = self.file_name_ends_with
            && !name.ends_with(suffix.as_str())
        {
            return false;
        }

        true
    }

    pub fn file_types(&self) -> &[String] {
        &self.file_types
    }

    pub fn file_type_regex(&self) -> Option<&str> {
        self.file_type_regex.as_ref().map(Pattern::as_str)
    }

    pub fn file_type_exclude_regex(&self) -> Option<&str> {
        self.file_type_exclude_regex.as_ref().map(Pattern::as_str)
    }

    pub fn file_names(&self) -> &[String] {
        &self.file_names
    }

    pub fn file_name_regex(&self) -> Option<&str> {
        self.file_name_regex.as_ref().map(Pattern::as_str)
    }

    pub fn file_name_exclude_regex(&self) -> Option<&str> {
        self.file_name_exclude_regex.as_ref().map(Pattern::as_str)
    }

    pub fn file_name_contains(&self) -> Option<&str> {
        self.file_name_contains.as_deref()
    }

    pub fn file_name_starts_with(&self) -> Option<&str> {
        self.file_name_starts_with.as_deref()
    }

    pub fn file_name_ends_with(&self) -> Option<&str> {
        self.file_name_ends_with.as_deref()
    }
}

/// Uncompiled match rules, assembled field by field
#[derive(Debug, Clone, Default)]
pub struct MatchRulesBuilder {
    pub file_types: Vec<String>,
    pub file_type_regex: Option<String>,
    pub file_type_exclude_regex: Option<String>,
    pub file_names: Vec<String>,
    pub file_name_regex: Option<String>,
    pub file_name_exclude_regex: Option<String>,
    pub file_name_contains: Option<String>,
    pub file_name_starts_with: Option<String>,
    pub file_name_ends_with: Option<String>,
}

/// Empty strings count as "not set"
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn compile(value: &Option<String>) -> Result<Option<Pattern>> {
    non_empty(value).map(Pattern::new).transpose()
}

impl MatchRulesBuilder {
    /// True if at least one rule would be active after `build`
    pub fn has_active_rule(&self) -> bool {
        !self.file_types.is_empty()
            || !self.file_names.is_empty()
            || [
                &self.file_type_regex,
                &self.file_type_exclude_regex,
                &self.file_name_regex,
                &self.file_name_exclude_regex,
                &self.file_name_contains,
                &self.file_name_starts_with,
                &self.file_name_ends_with,
            ]
            .into_iter()
            .any(|v| non_empty(v).is_some())
    }

    pub fn build(&self) -> Result<MatchRules> {
        if !self.has_active_rule() {
            return Err(MoverError::config(
                "at least one file matching rule must be specified \
                 (e.g. file_type, file_names, file_name_regex)",
            ));
        }

        Ok(MatchRules {
            file_types: self.file_types.clone(),
            file_type_regex: compile(&self.file_type_regex)?,
            file_type_exclude_regex: compile(&self.file_type_exclude_regex)?,
            file_names: self.file_names.clone(),
            file_name_regex: compile(&self.file_name_regex)?,
            file_name_exclude_regex: compile(&self.file_name_exclude_regex)?,
            file_name_contains: non_empty(&self.file_name_contains).map(str::to_string),
            file_name_starts_with: non_empty(&self.file_name_starts_with).map(str::to_string),
            file_name_ends_with: non_empty(&self.file_name_ends_with).map(str::to_string),
        })
    }
}
