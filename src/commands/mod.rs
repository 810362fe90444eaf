//! Command implementations for the bplate CLI

pub mod add;
pub mod completions;
pub mod outdated;
pub mod update;


use std::path::PathBuf;

use crate::error::{BplateError, Result};
use crate::source::{EntryKind, TreeEntry};
use crate::target::{Target, should_skip_file};

/// Resolve the project root: the explicit workspace flag/env if given,
/// otherwise the current directory.
pub(crate) fn project_root(workspace: Option<PathBuf>) -> Result<PathBuf> {
    match workspace {
        Some(dir) => Ok(dir),
        None => std::env::current_dir().map_err(|e| BplateError::IoError {
            message: format!("Failed to get current directory: {e}"),
        }),
    }
}

/// Filter the bundle tree down to one target's installable files.
///
/// Returns `(bundle_path, relative_path)` pairs: entries under the target's
/// source directory, minus transport markers and the bare directory entry
/// itself, in tree order.
pub(crate) fn filter_tree_for_target(tree: &[TreeEntry], target: Target) -> Vec<(String, String)> {
    let prefix = format!("{}/", target.source_dir());
    tree.iter()
        .filter(|entry| entry.kind == EntryKind::Blob)
        .filter_map(|entry| {
            let relative_path = entry.path.strip_prefix(&prefix)?;
            if relative_path.is_empty() || should_skip_file(relative_path) {
                return None;
            }
            Some((entry.path.clone(), relative_path.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod filter_tests {
    use super::*;

    #[test]
    fn test_filter_keeps_only_target_prefix() {
        let tree = vec![
            TreeEntry::blob("claude/CLAUDE.md"),
            TreeEntry::blob("claude/commands/review.md"),
            TreeEntry::blob("codex/AGENTS.md"),
            TreeEntry::blob("README.md"),
        ];

        let files = filter_tree_for_target(&tree, Target::Claude);
        assert_eq!(
            files,
            vec![
                ("claude/CLAUDE.md".to_string(), "CLAUDE.md".to_string()),
                (
                    "claude/commands/review.md".to_string(),
                    "commands/review.md".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_filter_drops_gitkeep_markers() {
        let tree = vec![
            TreeEntry::blob("claude/commands/.gitkeep"),
            TreeEntry::blob("claude/commands/review.md"),
        ];

        let files = filter_tree_for_target(&tree, Target::Claude);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].1, "commands/review.md");
    }

    #[test]
    fn test_filter_requires_directory_separator() {
        // "claudette/x.md" shares the prefix letters but not the directory.
        let tree = vec![TreeEntry::blob("claudette/x.md")];
        assert!(filter_tree_for_target(&tree, Target::Claude).is_empty());
    }

    #[test]
    fn test_filter_preserves_tree_order() {
        let tree = vec![
            TreeEntry::blob("claude/b.md"),
            TreeEntry::blob("claude/a.md"),
        ];

        let files = filter_tree_for_target(&tree, Target::Claude);
        assert_eq!(files[0].1, "b.md");
        assert_eq!(files[1].1, "a.md");
    }
}
