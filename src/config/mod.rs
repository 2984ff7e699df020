//! Configuration management

mod mover;
mod schema;

pub use mover::{MoverConfig, MoverConfigBuilder};
pub use schema::{Config, GeneralConfig, MoverDocument, RenameDocument, TimestampDocument};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// On-disk encoding, picked from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Format::Toml,
            _ => Format::Json,
        }
    }
}

impl Config {
    /// Load configuration from a file or the default location.
    ///
    /// An explicitly given file must exist. A missing default file yields an
    /// empty config.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default = Self::default_path().context("Could not determine config path")?;
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        Self::parse(&content, Format::of(&config_path))
            .with_context(|| format!("Failed to parse config from {}", config_path.display()))
    }

    /// Parse either a wrapper document (`general` / `movers`) or a single
    /// flat mover mapping.
    fn parse(content: &str, format: Format) -> Result<Self> {
        let value: serde_json::Value = match format {
            Format::Json => serde_json::from_str(content)?,
            Format::Toml => toml::from_str(content)?,
        };

        let is_wrapper = value
            .as_object()
            .is_some_and(|map| map.contains_key("movers") || map.contains_key("general"));

        if is_wrapper {
            Ok(serde_json::from_value(value)?)
        } else {
            let mover: MoverDocument = serde_json::from_value(value)?;
            Ok(Self {
                movers: vec![mover],
                ..Default::default()
            })
        }
    }

    /// Validate every mover document
    pub fn movers(&self) -> crate::error::Result<Vec<MoverConfig>> {
        self.movers.iter().map(MoverConfig::from_document).collect()
    }

    /// Save configuration to a file (with advisory file locking)
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = path
            .map(PathBuf::from)
            .or_else(Self::default_path)
            .context("Could not determine config path")?;

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = match Format::of(&config_path) {
            Format::Json => {
                serde_json::to_string_pretty(self).context("Failed to serialize config")?
            }
            Format::Toml => toml::to_string_pretty(self).context("Failed to serialize config")?,
        };

        // Use a lockfile to prevent concurrent writes
        let mut lock_name = config_path.as_os_str().to_owned();
        lock_name.push(".lock");
        let lock_path = PathBuf::from(lock_name);
        let lock_file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&lock_path)
            .with_context(|| format!("Failed to create lock file: {}", lock_path.display()))?;

        use fs2::FileExt;
        lock_file
            .lock_exclusive()
            .with_context(|| "Failed to acquire config file lock")?;

        let result = std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config to {}", config_path.display()));

        let _ = lock_file.unlock();

        result
    }

    /// Get the default config file path
    /// Uses the platform config directory (via dirs::config_dir), falling back to ~/.config
    pub fn default_path() -> Option<PathBuf> {
        let config_base =
            dirs::config_dir().or_else(|| dirs::home_dir().map(|d| d.join(".config")))?;
        Some(config_base.join("filemover").join("config.json"))
    }
}
