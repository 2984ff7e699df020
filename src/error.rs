//! Typed errors for configuration, renaming and filesystem failures.

use std::path::PathBuf;
use thiserror::Error;

/// Failure modes of the matching-and-placement engine
#[derive(Debug, Error)]
pub enum MoverError {
    /// Invalid or incomplete configuration; raised while building, never mid-run
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A value handed to the rename pipeline that it cannot work with
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An I/O failure on a single source or destination path
    #[error("filesystem error on {path}: {source}")]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MoverError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        MoverError::Configuration(message.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MoverError::FileSystem {
            path: path.into(),
            source,
        }
    }

    /// Configuration errors stop a run before any file is touched
    pub fn is_configuration(&self) -> bool {
        matches!(self, MoverError::Configuration(_))
    }
}

pub type Result<T> = std::result::Result<T, MoverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_path() {
        let err = MoverError::io(
            "/tmp/missing.txt",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/tmp/missing.txt"));
        assert!(msg.contains("gone"));
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_configuration_flag() {
        assert!(MoverError::config("no sources").is_configuration());
        assert!(!MoverError::InvalidInput("empty".into()).is_configuration());
    }
}
