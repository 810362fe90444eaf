//! Registry telemetry client
//!
//! The registry tracks download counts per boilerplate. Recording is
//! fire-and-forget: failures are swallowed and never affect the exit code
//! or block completion of an install.

use std::time::Duration;

use reqwest::blocking::Client;

const DEFAULT_API_URL: &str = "https://api.bplate.dev/v1";
const API_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("bplate/", env!("CARGO_PKG_VERSION"));

pub struct Registry {
    http: Client,
    base_url: String,
}

impl Registry {
    pub fn new() -> Registry {
        let base_url = std::env::var("BPLATE_API_URL")
            .ok()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Registry {
            http: Client::new(),
            base_url,
        }
    }

    /// Record one download of `repo`. Best-effort; errors are ignored.
    pub fn record_download(&self, repo: &str) {
        let _ = self
            .http
            .post(format!("{}/download", self.base_url))
            .timeout(API_TIMEOUT)
            .header("User-Agent", USER_AGENT)
            .json(&serde_json::json!({ "repo": repo, "dir": null }))
            .send();
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
