//! Assistant target definitions and path mapping
//!
//! A target is one supported AI coding-assistant integration. Each target
//! knows its source directory in the bundle, its main instruction document,
//! how bundle-relative paths map into the project, and where skills live.
//! Everything here is pure: no filesystem access, same inputs same outputs.

use std::fmt;

use serde::{Serialize, Serializer};

/// A supported assistant integration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Target {
    Claude,
    Codex,
    Gemini,
}

impl Target {
    /// All supported targets, in canonical order
    pub const ALL: [Target; 3] = [Target::Claude, Target::Codex, Target::Gemini];

    /// Canonical identifier, as used in manifests and the lockfile
    pub fn id(self) -> &'static str {
        match self {
            Target::Claude => "claude",
            Target::Codex => "codex",
            Target::Gemini => "gemini",
        }
    }

    /// Parse a target identifier. Unknown names yield `None`.
    pub fn parse(id: &str) -> Option<Target> {
        Target::ALL.into_iter().find(|t| t.id() == id)
    }

    /// Top-level directory in the bundle holding this target's files
    pub fn source_dir(self) -> &'static str {
        self.id()
    }

    /// The single canonical instruction file for this target
    pub fn main_doc(self) -> &'static str {
        match self {
            Target::Claude => "CLAUDE.md",
            Target::Codex => "AGENTS.md",
            Target::Gemini => "GEMINI.md",
        }
    }

    /// Project-relative skills directory for this target
    pub fn skills_dir(self) -> &'static str {
        match self {
            Target::Claude => ".claude/skills",
            Target::Codex => ".agents/skills",
            Target::Gemini => ".gemini/skills",
        }
    }

    /// True iff `relative_path` is exactly this target's main document
    pub fn is_main_doc(self, relative_path: &str) -> bool {
        relative_path == self.main_doc()
    }

    /// Map a bundle-relative path (within this target's source dir) to its
    /// project-relative destination.
    ///
    /// Main docs always land at the project root under their canonical name.
    /// Claude and Gemini files go under their hidden config directory; Codex
    /// keeps the bundle layout at the project root (`.codex/` is config-only).
    ///
    /// ```text
    /// claude:  "commands/review.md"   -> ".claude/commands/review.md"
    /// codex:   "utils/AGENTS.md"      -> "utils/AGENTS.md"
    /// gemini:  "commands/review.toml" -> ".gemini/commands/review.toml"
    /// ```
    pub fn map_to_local_path(self, relative_path: &str) -> String {
        if self.is_main_doc(relative_path) {
            return self.main_doc().to_string();
        }

        match self {
            Target::Claude => format!(".claude/{relative_path}"),
            Target::Codex => relative_path.to_string(),
            Target::Gemini => format!(".gemini/{relative_path}"),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl Serialize for Target {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.id())
    }
}

/// Placeholder marker files keep empty directories alive in transport and
/// are never installed.
pub fn should_skip_file(relative_path: &str) -> bool {
    relative_path.ends_with(".gitkeep")
}
