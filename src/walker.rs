//! Directory walking - candidate files under a source directory

use std::path::{Path, PathBuf};
use tracing::{trace, warn};
use walkdir::WalkDir;

/// Lazily yield `(directory, file_name)` for every regular file under `root`.
///
/// With `recursive` false only direct children of `root` are visited.
/// Symlinked directories are not followed; symlinks to files are yielded.
/// Each call starts a fresh traversal in directory order (not sorted).
pub fn walk(root: &Path, recursive: bool) -> impl Iterator<Item = (PathBuf, String)> + use<> {
    let mut walker = WalkDir::new(root).min_depth(1).follow_links(false);
    if !recursive {
        walker = walker.max_depth(1);
    }

    walker.into_iter().filter_map(|entry| {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().map(|p| p.display().to_string()).unwrap_or_default();
                warn!("Skipping unreadable entry {}: {}", path, e);
                return None;
            }
        };

        let is_file = entry.file_type().is_file()
            || (entry.path_is_symlink() && entry.path().is_file());
        if !is_file {
            return None;
        }

        let Some(name) = entry.file_name().to_str() else {
            warn!("Skipping non UTF-8 file name: {}", entry.path().display());
            return None;
        };
        let dir = entry.path().parent().unwrap_or(Path::new(".")).to_path_buf();

        trace!("Candidate: {}", entry.path().display());
        Some((dir, name.to_string()))
    })
}
