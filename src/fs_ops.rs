//! Filesystem helpers for placing files.
//! - Copies bytes and permissions, then mirrors access/modification times.
//! - Timestamp preservation is best effort: failures are logged, not returned.

use filetime::{FileTime, set_file_times};
use std::fs;
use std::io;
use std::path::Path;
use tracing::{trace, warn};

use crate::error::{MoverError, Result};

/// True if anything (file, directory, even a dangling symlink) sits at `path`
pub fn entity_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// True if both paths resolve to the same existing file.
/// Symlinks and `..` components are resolved before comparing.
pub fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Copy `src` to `dest` with metadata, creating missing parent directories.
/// An existing file at `dest` is replaced, unless it is `src` itself.
pub fn copy_with_metadata(src: &Path, dest: &Path) -> Result<()> {
    if same_file(src, dest) {
        return Err(MoverError::io(
            dest,
            io::Error::new(io::ErrorKind::InvalidInput, "source and destination are the same file"),
        ));
    }
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| MoverError::io(parent, e))?;
    }

    let src_meta = fs::metadata(src).map_err(|e| MoverError::io(src, e))?;
    fs::copy(src, dest).map_err(|e| MoverError::io(dest, e))?;
    preserve_times(dest, &src_meta);

    Ok(())
}

fn preserve_times(dest: &Path, src_meta: &fs::Metadata) {
    let atime = FileTime::from_last_access_time(src_meta);
    let mtime = FileTime::from_last_modification_time(src_meta);
    if let Err(e) = set_file_times(dest, atime, mtime) {
        warn!(path = %dest.display(), error = %e, "failed to set atime/mtime on destination");
    } else {
        trace!(path = %dest.display(), "set atime/mtime on destination");
    }
}

/// Delete a source file after it has been placed
pub fn remove_source(path: &Path) -> Result<()> {
    fs::remove_file(path).map_err(|e| MoverError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_creates_parents_and_keeps_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.txt");
        fs::write(&src, "contents").unwrap();
        let old = FileTime::from_unix_time(1_000_000_000, 0);
        filetime::set_file_mtime(&src, old).unwrap();

        let dest = dir.path().join("a/b/dest.txt");
        copy_with_metadata(&src, &dest).unwrap();

        assert_eq!(fs::read_to_string(&dest).unwrap(), "contents");
        let meta = fs::metadata(&dest).unwrap();
        assert_eq!(FileTime::from_last_modification_time(&meta), old);
    }

    #[test]
    fn test_copy_onto_itself_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("keep.txt");
        fs::write(&src, "precious").unwrap();

        let same = dir.path().join(".").join("keep.txt");
        let err = copy_with_metadata(&src, &same).unwrap_err();
        assert!(matches!(err, MoverError::FileSystem { .. }));
        assert_eq!(fs::read_to_string(&src).unwrap(), "precious");
    }

    #[cfg(unix)]
    #[test]
    fn test_same_file_follows_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target.txt");
        let link = dir.path().join("link.txt");
        fs::write(&target, "x").unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        assert!(same_file(&target, &link));
        assert!(!same_file(&target, &dir.path().join("other.txt")));
    }

    #[test]
    fn test_copy_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.txt");
        let dest = dir.path().join("dest.txt");
        fs::write(&src, "new").unwrap();
        fs::write(&dest, "old contents").unwrap();

        copy_with_metadata(&src, &dest).unwrap();
        assert_eq!(fs::read_to_string(&dest).unwrap(), "new");
    }

    #[test]
    fn test_copy_missing_source_is_filesystem_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = copy_with_metadata(&dir.path().join("nope"), &dir.path().join("out")).unwrap_err();
        assert!(matches!(err, MoverError::FileSystem { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_preserves_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.sh");
        fs::write(&src, "#!/bin/sh").unwrap();
        fs::set_permissions(&src, fs::Permissions::from_mode(0o750)).unwrap();

        let dest = dir.path().join("dest.sh");
        copy_with_metadata(&src, &dest).unwrap();
        assert_eq!(fs::metadata(&dest).unwrap().permissions().mode() & 0o777, 0o750);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_exists() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(dir.path().join("missing"), &link).unwrap();
        assert!(entity_exists(&link));
        assert!(!entity_exists(&dir.path().join("missing")));
    }

    #[test]
    fn test_remove_source() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("gone.txt");
        fs::write(&src, "x").unwrap();
        remove_source(&src).unwrap();
        assert!(!src.exists());
        assert!(remove_source(&src).is_err());
    }
}
