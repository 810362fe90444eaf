//! Remote bundle retrieval
//!
//! The core consumes bundles through the [`PackageSource`] trait so the
//! orchestrators never talk to the network directly. The one production
//! implementation is [`github::GithubSource`].

pub mod github;

use std::fmt;

use serde::Deserialize;

use crate::error::{BplateError, Result};
use crate::manifest::Manifest;

/// Bundle manifest filename at the repository root
pub const MANIFEST_FILENAME: &str = "bplate.json";

/// Skills declaration filename at the repository root
pub const SKILLS_FILENAME: &str = "skills.json";

/// A parsed `owner/repo` package reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    /// Parse an `owner/repo` spec. Anything else is rejected.
    pub fn parse(spec: &str) -> Result<RepoRef> {
        let mut parts = spec.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => {
                Ok(RepoRef {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(BplateError::InvalidPackageRef {
                spec: spec.to_string(),
            }),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Kind of a tree entry as reported by the remote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Blob,
    Tree,
    #[serde(other)]
    Other,
}

/// One file or directory node from the remote bundle tree.
///
/// The `sha` and `size` fields are retrieval metadata only; reconciliation
/// is driven entirely by paths and manifest versions.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub sha: String,
    #[serde(default)]
    pub size: Option<u64>,
}

impl TreeEntry {
    /// Convenience constructor for a blob entry
    #[cfg(test)]
    pub fn blob(path: &str) -> TreeEntry {
        TreeEntry {
            path: path.to_string(),
            kind: EntryKind::Blob,
            sha: "0000000000000000000000000000000000000000".to_string(),
            size: None,
        }
    }
}

/// Remote bundle retrieval interface consumed by the orchestrators.
///
/// `Sync` so the skill-install worker pool may share one source across
/// threads.
pub trait PackageSource: Sync {
    /// Fetch and validate the bundle manifest.
    fn fetch_manifest(&self, repo: &str) -> Result<Manifest>;

    /// Fetch the recursive file tree, blobs only.
    fn fetch_tree(&self, repo: &str) -> Result<Vec<TreeEntry>>;

    /// Fetch one file's content. `Ok(None)` means "not found", which is
    /// distinct from a transport or access fault.
    fn fetch_file(&self, repo: &str, path: &str) -> Result<Option<String>>;

    /// Fetch the raw skills declaration, if the bundle ships one.
    fn fetch_skills_json(&self, repo: &str) -> Result<Option<String>> {
        self.fetch_file(repo, SKILLS_FILENAME)
    }
}
