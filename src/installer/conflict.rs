//! Conflict resolution for existing destination files

use std::fmt;

use crate::error::Result;
use crate::prompt::DecisionProvider;

/// What to do with a destination file that already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictStrategy {
    Overwrite,
    Append,
    Skip,
}

impl fmt::Display for ConflictStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictStrategy::Overwrite => f.write_str("overwrite"),
            ConflictStrategy::Append => f.write_str("append"),
            ConflictStrategy::Skip => f.write_str("skip"),
        }
    }
}

/// Decide how to handle an existing destination file.
///
/// With prompts skipped, main documents resolve to append so accumulated
/// project edits are never destroyed non-interactively; everything else is
/// bundle-owned and overwritten. Interactively, the decision provider offers
/// append (main docs only), overwrite, or skip; a cancelled prompt resolves
/// to skip.
pub fn resolve_conflict(
    provider: &dyn DecisionProvider,
    path: &str,
    is_main_doc: bool,
    skip_prompts: bool,
) -> Result<ConflictStrategy> {
    if skip_prompts {
        return Ok(if is_main_doc {
            ConflictStrategy::Append
        } else {
            ConflictStrategy::Overwrite
        });
    }
    provider.choose_conflict_strategy(path, is_main_doc)
}
