//! GitHub-backed bundle retrieval
//!
//! Talks to the GitHub REST API for repository metadata and the recursive
//! tree, and to raw.githubusercontent.com for file content. Default-branch
//! lookups are memoized per client instance, so the cache lives exactly as
//! long as one command invocation.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;

use crate::error::{BplateError, Result};
use crate::manifest::Manifest;
use crate::source::{EntryKind, MANIFEST_FILENAME, PackageSource, RepoRef, TreeEntry};
use crate::ui;

const GITHUB_API_URL: &str = "https://api.github.com";
const GITHUB_RAW_URL: &str = "https://raw.githubusercontent.com";
const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("bplate/", env!("CARGO_PKG_VERSION"));

#[derive(Deserialize)]
struct RepoInfo {
    default_branch: String,
}

#[derive(Deserialize)]
struct TreeResponse {
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

/// GitHub implementation of [`PackageSource`]
pub struct GithubSource {
    http: Client,
    token: Option<String>,
    branch_cache: Mutex<HashMap<String, String>>,
}

impl GithubSource {
    pub fn new() -> GithubSource {
        GithubSource {
            http: Client::new(),
            token: std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty()),
            branch_cache: Mutex::new(HashMap::new()),
        }
    }

    fn get(&self, url: &str) -> RequestBuilder {
        let mut request = self
            .http
            .get(url)
            .timeout(FETCH_TIMEOUT)
            .header("User-Agent", USER_AGENT);
        if let Some(ref token) = self.token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }
        request
    }

    /// Map 429/403 responses to actionable errors; other statuses pass through.
    fn check_access(&self, repo: &str, response: &Response) -> Result<()> {
        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => Err(BplateError::RateLimited),
            StatusCode::FORBIDDEN => {
                let remaining = response
                    .headers()
                    .get("x-ratelimit-remaining")
                    .and_then(|v| v.to_str().ok());
                if remaining == Some("0") {
                    Err(BplateError::RateLimited)
                } else {
                    Err(BplateError::AccessDenied {
                        repo: repo.to_string(),
                    })
                }
            }
            _ => Ok(()),
        }
    }

    fn default_branch(&self, repo: &str) -> Result<String> {
        if let Ok(cache) = self.branch_cache.lock() {
            if let Some(branch) = cache.get(repo) {
                return Ok(branch.clone());
            }
        }

        let RepoRef { owner, name } = RepoRef::parse(repo)?;
        let url = format!("{GITHUB_API_URL}/repos/{owner}/{name}");
        let response = self.get(&url).header("Accept", GITHUB_ACCEPT).send()?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(BplateError::RepoNotFound {
                repo: repo.to_string(),
            });
        }
        self.check_access(repo, &response)?;
        if !response.status().is_success() {
            return Err(BplateError::FetchFailed {
                what: format!("repository metadata for {repo}"),
                reason: response.status().to_string(),
            });
        }

        let info: RepoInfo = response.json()?;
        if let Ok(mut cache) = self.branch_cache.lock() {
            cache.insert(repo.to_string(), info.default_branch.clone());
        }
        Ok(info.default_branch)
    }

    fn raw_url(&self, repo: &RepoRef, branch: &str, path: &str) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(GITHUB_RAW_URL).map_err(|e| BplateError::Http {
            message: e.to_string(),
        })?;
        {
            let mut segments = url.path_segments_mut().map_err(|()| BplateError::Http {
                message: "cannot build raw content URL".to_string(),
            })?;
            segments.push(&repo.owner).push(&repo.name).push(branch);
            // Url percent-encodes each pushed segment, so arbitrary file
            // names survive the round trip.
            segments.extend(path.split('/'));
        }
        Ok(url)
    }
}

impl Default for GithubSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageSource for GithubSource {
    fn fetch_manifest(&self, repo: &str) -> Result<Manifest> {
        let content =
            self.fetch_file(repo, MANIFEST_FILENAME)?
                .ok_or_else(|| BplateError::ManifestNotFound {
                    repo: repo.to_string(),
                })?;
        Manifest::parse(&content, repo)
    }

    fn fetch_tree(&self, repo: &str) -> Result<Vec<TreeEntry>> {
        let RepoRef { owner, name } = RepoRef::parse(repo)?;
        let branch = self.default_branch(repo)?;
        let url = format!("{GITHUB_API_URL}/repos/{owner}/{name}/git/trees/{branch}?recursive=1");

        let response = self.get(&url).header("Accept", GITHUB_ACCEPT).send()?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(BplateError::RepoNotFound {
                repo: repo.to_string(),
            });
        }
        self.check_access(repo, &response)?;
        if !response.status().is_success() {
            return Err(BplateError::FetchFailed {
                what: format!("file tree for {repo}"),
                reason: response.status().to_string(),
            });
        }

        let tree: TreeResponse = response.json()?;
        if tree.truncated {
            ui::warn(&format!(
                "Repository tree for {repo} was truncated - some files may be missing."
            ));
        }

        Ok(tree
            .tree
            .into_iter()
            .filter(|entry| entry.kind == EntryKind::Blob)
            .collect())
    }

    fn fetch_file(&self, repo: &str, path: &str) -> Result<Option<String>> {
        let repo_ref = RepoRef::parse(repo)?;
        let branch = self.default_branch(repo)?;
        let url = self.raw_url(&repo_ref, &branch, path)?;

        let response = self.get(url.as_str()).send()?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        self.check_access(repo, &response)?;
        if !response.status().is_success() {
            return Err(BplateError::FetchFailed {
                what: format!("{path} from {repo}"),
                reason: response.status().to_string(),
            });
        }

        Ok(Some(response.text()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_url_encodes_path_segments() {
        let source = GithubSource::new();
        let repo = RepoRef {
            owner: "acme".to_string(),
            name: "starter".to_string(),
        };
        let url = source
            .raw_url(&repo, "main", "claude/has space#hash.md")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://raw.githubusercontent.com/acme/starter/main/claude/has%20space%23hash.md"
        );
    }

    #[test]
    fn test_raw_url_plain_path() {
        let source = GithubSource::new();
        let repo = RepoRef {
            owner: "acme".to_string(),
            name: "starter".to_string(),
        };
        let url = source.raw_url(&repo, "main", "claude/CLAUDE.md").unwrap();
        assert_eq!(
            url.as_str(),
            "https://raw.githubusercontent.com/acme/starter/main/claude/CLAUDE.md"
        );
    }
}
