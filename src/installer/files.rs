//! Low-level file writing honoring a conflict strategy

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{BplateError, Result};
use crate::installer::ConflictStrategy;

/// Visible separator between the existing content and appended content, so
/// repeated appends stay readable.
pub const APPEND_SEPARATOR: &str = "\n\n---\n\n";

fn read_error(path: &Path, err: &std::io::Error) -> BplateError {
    BplateError::FileReadFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

fn write_error(path: &Path, err: &std::io::Error) -> BplateError {
    BplateError::FileWriteFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

/// Ensure parent directory exists for a path
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| write_error(parent, &e))?;
    }
    Ok(())
}

/// Write `content` to `dest` based on the given strategy.
///
/// Returns true if the file was written, false if skipped. Skip performs no
/// filesystem interaction at all. Append treats a missing file as empty,
/// trims the existing content's trailing whitespace and joins both parts
/// with [`APPEND_SEPARATOR`]. No retries; I/O errors propagate to the caller
/// so it can record the failure and continue with the remaining files.
pub fn install_file(content: &str, dest: &Path, strategy: ConflictStrategy) -> Result<bool> {
    if strategy == ConflictStrategy::Skip {
        return Ok(false);
    }

    ensure_parent_dir(dest)?;

    if strategy == ConflictStrategy::Append {
        let existing = match fs::read_to_string(dest) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(e) => return Err(read_error(dest, &e)),
        };
        let trimmed = existing.trim_end();
        let merged = if trimmed.is_empty() {
            content.to_string()
        } else {
            format!("{trimmed}{APPEND_SEPARATOR}{content}")
        };
        fs::write(dest, merged).map_err(|e| write_error(dest, &e))?;
        return Ok(true);
    }

    fs::write(dest, content).map_err(|e| write_error(dest, &e))?;
    Ok(true)
}

/// Check whether a file exists at the given path.
///
/// "Not found" is false; any other I/O error is rethrown, never silently
/// coerced to false.
pub fn file_exists(path: &Path) -> Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(read_error(path, &e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_skip_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("deep/nested/file.md");

        let written = install_file("content", &dest, ConflictStrategy::Skip).unwrap();

        assert!(!written);
        assert!(!dest.exists());
        // Skip must not even create parent directories.
        assert!(!temp.path().join("deep").exists());
    }

    #[test]
    fn test_overwrite_creates_parents_and_replaces() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("a/b/file.md");

        let written = install_file("first", &dest, ConflictStrategy::Overwrite).unwrap();
        assert!(written);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "first");

        install_file("second", &dest, ConflictStrategy::Overwrite).unwrap();
        assert_eq!(fs::read_to_string(&dest).unwrap(), "second");
    }

    #[test]
    fn test_append_to_missing_file_is_plain_write() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("CLAUDE.md");

        install_file("fresh", &dest, ConflictStrategy::Append).unwrap();

        assert_eq!(fs::read_to_string(&dest).unwrap(), "fresh");
    }

    #[test]
    fn test_append_joins_with_separator() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("CLAUDE.md");
        fs::write(&dest, "existing").unwrap();

        install_file("added", &dest, ConflictStrategy::Append).unwrap();

        assert_eq!(
            fs::read_to_string(&dest).unwrap(),
            "existing\n\n---\n\nadded"
        );
    }

    #[test]
    fn test_append_trims_trailing_whitespace_before_separator() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("CLAUDE.md");
        fs::write(&dest, "existing\n\n\n").unwrap();

        install_file("added", &dest, ConflictStrategy::Append).unwrap();

        assert_eq!(
            fs::read_to_string(&dest).unwrap(),
            "existing\n\n---\n\nadded"
        );
    }

    #[test]
    fn test_append_to_whitespace_only_file() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("CLAUDE.md");
        fs::write(&dest, "   \n\n").unwrap();

        install_file("added", &dest, ConflictStrategy::Append).unwrap();

        assert_eq!(fs::read_to_string(&dest).unwrap(), "added");
    }

    #[test]
    fn test_file_exists_true_false() {
        let temp = TempDir::new().unwrap();
        let present = temp.path().join("here.md");
        fs::write(&present, "x").unwrap();

        assert!(file_exists(&present).unwrap());
        assert!(!file_exists(&temp.path().join("missing.md")).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_file_exists_rethrows_non_notfound_errors() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("locked");
        fs::create_dir(&dir).unwrap();
        let inner = dir.join("file.md");
        fs::write(&inner, "x").unwrap();
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o000)).unwrap();

        let result = file_exists(&inner);

        fs::set_permissions(&dir, fs::Permissions::from_mode(0o755)).unwrap();
        assert!(result.is_err());
    }

    #[test]
    fn test_install_error_carries_path() {
        let temp = TempDir::new().unwrap();
        // A file where a parent directory is expected makes create_dir_all fail.
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "x").unwrap();
        let dest = blocker.join("child.md");

        let err = install_file("content", &dest, ConflictStrategy::Overwrite).unwrap_err();
        assert!(matches!(err, BplateError::FileWriteFailed { .. }));
    }
}
