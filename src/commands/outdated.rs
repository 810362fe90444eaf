//! Outdated command implementation
//!
//! Compares every locked package's version against its freshly fetched
//! manifest and prints an aligned report. Read-only: never touches the
//! filesystem or the lockfile.

use std::path::{Path, PathBuf};

use console::Style;

use crate::error::Result;
use crate::lockfile::Lockfile;
use crate::source::PackageSource;
use crate::source::github::GithubSource;
use crate::ui;

/// Run the outdated command
pub fn run(workspace: Option<PathBuf>) -> Result<()> {
    let root = super::project_root(workspace)?;
    let source = GithubSource::new();
    execute(&root, &source)
}

struct CheckResult {
    repo: String,
    current: String,
    latest: String,
    outdated: bool,
    error: Option<String>,
}

pub(crate) fn execute(root: &Path, source: &dyn PackageSource) -> Result<()> {
    let lockfile = Lockfile::read(root);

    if lockfile.packages.is_empty() {
        ui::info("No boilerplates installed. Run `bplate add <owner/repo>` to install one.");
        return Ok(());
    }

    let pb = ui::spinner("Checking for updates...");

    let results: Vec<CheckResult> = lockfile
        .packages
        .iter()
        .map(|(repo, entry)| match source.fetch_manifest(repo) {
            Ok(manifest) => CheckResult {
                repo: repo.clone(),
                current: entry.version.clone(),
                outdated: entry.version != manifest.version,
                latest: manifest.version,
                error: None,
            },
            Err(e) => CheckResult {
                repo: repo.clone(),
                current: entry.version.clone(),
                latest: "?".to_string(),
                outdated: false,
                error: Some(e.to_string()),
            },
        })
        .collect();

    pb.finish_and_clear();

    print_report(&results);

    let outdated_count = results.iter().filter(|r| r.outdated).count();
    let error_count = results.iter().filter(|r| r.error.is_some()).count();

    if outdated_count > 0 {
        ui::warn(&format!(
            "{outdated_count} package(s) can be updated. Run `bplate update` to update."
        ));
    } else if error_count == 0 {
        ui::success("All packages are up to date.");
    }

    if error_count > 0 {
        ui::warn(&format!(
            "{error_count} package(s) could not be checked. Check your network or GITHUB_TOKEN."
        ));
    }

    Ok(())
}

fn print_report(results: &[CheckResult]) {
    let bold = Style::new().bold();
    let col_repo = "Package";
    let col_current = "Current";
    let col_latest = "Latest";

    let repo_width = results
        .iter()
        .map(|r| r.repo.len())
        .chain([col_repo.len()])
        .max()
        .unwrap_or(0);
    let current_width = results
        .iter()
        .map(|r| r.current.len())
        .chain([col_current.len()])
        .max()
        .unwrap_or(0);
    let latest_width = results
        .iter()
        .map(|r| r.latest.len())
        .chain([col_latest.len()])
        .max()
        .unwrap_or(0);

    println!();
    println!(
        "  {}  {}  {}",
        bold.apply_to(format!("{col_repo:<repo_width$}")),
        bold.apply_to(format!("{col_current:<current_width$}")),
        bold.apply_to(format!("{col_latest:<latest_width$}")),
    );
    println!(
        "  {}  {}  {}  {}",
        "─".repeat(repo_width),
        "─".repeat(current_width),
        "─".repeat(latest_width),
        "─".repeat(16),
    );

    for result in results {
        let repo = format!("{:<repo_width$}", result.repo);
        let current = format!("{:<current_width$}", result.current);
        let latest = format!("{:<latest_width$}", result.latest);

        if result.error.is_some() {
            println!(
                "  {repo}  {current}  {}  {}",
                Style::new().red().apply_to(latest),
                Style::new().red().apply_to("fetch error"),
            );
        } else if result.outdated {
            println!(
                "  {}  {current}  {}  {}",
                Style::new().yellow().apply_to(repo),
                Style::new().green().apply_to(latest),
                Style::new().yellow().apply_to("update available"),
            );
        } else {
            println!(
                "  {repo}  {current}  {latest}  {}",
                Style::new().green().apply_to("✓ up to date"),
            );
        }
    }
    println!();
}
