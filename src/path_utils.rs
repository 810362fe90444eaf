//! Cross-platform path utilities
//!
//! Destination paths in bundles and in the lockfile are logical, forward-slash
//! relative paths. These helpers resolve them against the project root and
//! keep serialized paths identical across operating systems.

use std::path::{Component, Path, PathBuf};

use crate::error::{BplateError, Result};

/// Resolve a relative destination path against `root`, rejecting any path
/// that would escape it.
///
/// The resolution is purely lexical: `a/../b` resolves to `root/b`, while
/// `../x` and absolute paths fail with a traversal error. Nothing is touched
/// on disk, so destinations that do not exist yet are fine.
pub fn ensure_within_dir(root: &Path, dest: &str) -> Result<PathBuf> {
    let mut resolved = PathBuf::new();

    for component in Path::new(dest).components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {
                return Err(BplateError::PathTraversal {
                    path: dest.to_string(),
                });
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if !resolved.pop() {
                    return Err(BplateError::PathTraversal {
                        path: dest.to_string(),
                    });
                }
            }
            Component::Normal(part) => resolved.push(part),
        }
    }

    Ok(root.join(resolved))
}

/// Normalize a forward/backslash mixed relative path string to forward slashes
pub fn to_posix_str(path: &str) -> String {
    path.replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_within_dir_plain() {
        let root = Path::new("/project");
        let resolved = ensure_within_dir(root, ".claude/commands/review.md").unwrap();
        assert_eq!(resolved, Path::new("/project/.claude/commands/review.md"));
    }

    #[test]
    fn test_ensure_within_dir_inner_parent_ok() {
        let root = Path::new("/project");
        let resolved = ensure_within_dir(root, "a/../b").unwrap();
        assert_eq!(resolved, Path::new("/project/b"));
    }

    #[test]
    fn test_ensure_within_dir_rejects_escape() {
        let root = Path::new("/project");
        let err = ensure_within_dir(root, "../x").unwrap_err();
        assert!(matches!(err, BplateError::PathTraversal { .. }));
    }

    #[test]
    fn test_ensure_within_dir_rejects_absolute() {
        let root = Path::new("/project");
        let err = ensure_within_dir(root, "/etc/passwd").unwrap_err();
        assert!(matches!(err, BplateError::PathTraversal { .. }));
    }

    #[test]
    fn test_ensure_within_dir_rejects_escape_after_descent() {
        let root = Path::new("/project");
        let err = ensure_within_dir(root, ".claude/../../evil.md").unwrap_err();
        assert!(matches!(err, BplateError::PathTraversal { .. }));
    }

    #[test]
    fn test_ensure_within_dir_empty_is_root() {
        let root = Path::new("/project");
        assert_eq!(ensure_within_dir(root, "").unwrap(), Path::new("/project"));
    }

    #[test]
    fn test_ensure_within_dir_curdir_components() {
        let root = Path::new("/project");
        let resolved = ensure_within_dir(root, "./a/./b").unwrap();
        assert_eq!(resolved, Path::new("/project/a/b"));
    }

    #[test]
    fn test_to_posix_str() {
        assert_eq!(to_posix_str(".claude\\commands\\x.md"), ".claude/commands/x.md");
        assert_eq!(to_posix_str("already/posix"), "already/posix");
    }
}
