//! Filemover - rule-driven file routing
//!
//! Scans source directories, selects files by name and extension, optionally
//! renames them, and places them into one or more destination directories
//! under configurable collision and source-retention policies.

pub mod config;
pub mod error;
pub mod fs_ops;
pub mod rules;
pub mod walker;

pub use config::{Config, MoverConfig, MoverConfigBuilder, MoverDocument};
pub use error::MoverError;
pub use rules::{
    CollisionAvoidance, DestinationCollision, FileOutcome, MatchRules, Mover, Placement,
    RenamePipeline, RunSummary, SourceRetention, TimestampPolicy, TimestampPosition,
};

/// Current version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Expand ~ and environment variables ($VAR, ${VAR}) in a path.
/// Unknown variables are left as written.
pub fn expand_path(path: &std::path::Path) -> std::path::PathBuf {
    let path_str = path.to_string_lossy();

    let home = || dirs::home_dir().map(|h| h.to_string_lossy().to_string());
    let expanded = match path_str.strip_prefix("~/") {
        Some(rest) => home()
            .map(|h| format!("{}/{}", h.trim_end_matches('/'), rest))
            .unwrap_or_else(|| path_str.to_string()),
        None if path_str == "~" => home().unwrap_or_else(|| path_str.to_string()),
        None => path_str.to_string(),
    };

    use std::sync::LazyLock;
    static ENV_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
        regex::Regex::new(r"\$\{([^}]+)\}|\$([A-Za-z_][A-Za-z0-9_]*)").expect("invalid env regex")
    });

    let result = ENV_RE.replace_all(&expanded, |caps: &regex::Captures| {
        let var_name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or("");
        std::env::var(var_name).unwrap_or_else(|_| caps[0].to_string())
    });

    std::path::PathBuf::from(result.as_ref())
}
