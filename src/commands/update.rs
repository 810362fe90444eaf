//! Update command implementation
//!
//! Replays the install pipeline against every locked package (or one named
//! package), using the lockfile as the record of what was previously
//! installed. A package whose remote version matches the locked version is
//! left completely untouched, including its installedAt stamp. On update,
//! only main documents prompt for conflicts; everything else is bundle-owned
//! content and refreshed in place.

use std::path::{Path, PathBuf};

use crate::cli::UpdateArgs;
use crate::commands::filter_tree_for_target;
use crate::error::{BplateError, Result};
use crate::installer::{ConflictStrategy, file_exists, install_file, resolve_conflict};
use crate::lockfile::{LockedPackage, Lockfile, SkillLock, timestamp_now};
use crate::path_utils::ensure_within_dir;
use crate::prompt::{DecisionProvider, InteractivePrompter};
use crate::skills::{install_skills, parse_skills};
use crate::source::PackageSource;
use crate::source::github::GithubSource;
use crate::ui;

/// Run the update command
pub fn run(workspace: Option<PathBuf>, args: UpdateArgs) -> Result<()> {
    let root = super::project_root(workspace)?;
    let source = GithubSource::new();
    execute(
        &root,
        args.package.as_deref(),
        &source,
        &InteractivePrompter,
        args.yes,
        args.dry_run,
    )
}

struct UpdateReport {
    updated: bool,
    installed: usize,
    skipped: usize,
    /// Replacement lockfile entry, present when this package actually changed
    entry: Option<LockedPackage>,
}

/// Update one named package, or every locked package.
pub(crate) fn execute(
    root: &Path,
    package: Option<&str>,
    source: &dyn PackageSource,
    provider: &dyn DecisionProvider,
    skip_prompts: bool,
    dry_run: bool,
) -> Result<()> {
    let mut lockfile = Lockfile::read(root);

    if lockfile.packages.is_empty() {
        ui::info("No boilerplates installed. Run `bplate add <owner/repo>` to install one.");
        return Ok(());
    }

    let repos: Vec<String> = match package {
        Some(name) => {
            if !lockfile.packages.contains_key(name) {
                return Err(BplateError::PackageNotInstalled {
                    repo: name.to_string(),
                });
            }
            vec![name.to_string()]
        }
        None => lockfile.packages.keys().cloned().collect(),
    };

    let mut total_installed = 0usize;
    let mut total_skipped = 0usize;
    let mut packages_updated = 0usize;
    let mut lockfile_dirty = false;

    for repo in &repos {
        let Some(entry) = lockfile.packages.get(repo).cloned() else {
            continue;
        };

        let Some(report) =
            update_package(root, repo, &entry, source, provider, skip_prompts, dry_run)?
        else {
            // Fetch failure, already reported; never aborts the other packages.
            continue;
        };

        if !report.updated {
            continue;
        }

        packages_updated += 1;
        total_installed += report.installed;
        total_skipped += report.skipped;

        if let Some(new_entry) = report.entry {
            lockfile.packages.insert(repo.clone(), new_entry);
            lockfile_dirty = true;
        }
    }

    // One canonical write at the very end, only when something changed.
    if lockfile_dirty && !dry_run {
        lockfile.write(root)?;
    }

    println!();
    if dry_run {
        ui::info("Dry run complete. No files were written.");
    } else if packages_updated > 0 {
        ui::success(&format!(
            "Updated {packages_updated} package(s). {total_installed} file(s) installed, {total_skipped} skipped."
        ));
    } else {
        ui::success("All packages are up to date.");
    }

    Ok(())
}

#[allow(clippy::too_many_lines)]
fn update_package(
    root: &Path,
    repo: &str,
    entry: &LockedPackage,
    source: &dyn PackageSource,
    provider: &dyn DecisionProvider,
    skip_prompts: bool,
    dry_run: bool,
) -> Result<Option<UpdateReport>> {
    // 1. Fetch latest manifest and compare versions
    let pb = ui::spinner(&format!("Checking {repo}..."));
    let manifest = match source.fetch_manifest(repo) {
        Ok(manifest) => manifest,
        Err(e) => {
            ui::spinner_fail(&pb, &format!("Failed to check {repo}"));
            ui::warn(&e.to_string());
            return Ok(None);
        }
    };

    if entry.version == manifest.version {
        ui::spinner_success(&pb, &format!("{repo} is up to date (v{})", entry.version));
        return Ok(Some(UpdateReport {
            updated: false,
            installed: 0,
            skipped: 0,
            entry: None,
        }));
    }

    ui::spinner_success(
        &pb,
        &format!("{repo}: v{} -> v{}", entry.version, manifest.version),
    );

    // 2. Fetch repo tree
    let pb = ui::spinner(&format!("Fetching files for {repo}..."));
    let tree = match source.fetch_tree(repo) {
        Ok(tree) => {
            ui::spinner_success(&pb, "File list fetched");
            tree
        }
        Err(e) => {
            ui::spinner_fail(&pb, "Failed to fetch file list");
            ui::warn(&e.to_string());
            return Ok(None);
        }
    };

    let mut total_installed = 0usize;
    let mut total_skipped = 0usize;
    let mut updated_files = entry.files.clone();

    // 3. Re-run the install pipeline for every previously recorded target
    for &target in &entry.targets {
        let files = filter_tree_for_target(&tree, target);

        if files.is_empty() {
            ui::warn(&format!("No files found for target \"{target}\" in {repo}"));
            continue;
        }

        if dry_run {
            println!();
            ui::info(&format!("Files that would be updated for {repo} [{target}]:"));
            println!();

            let mut count = 0usize;
            for (bundle_path, relative_path) in &files {
                let local_rel = target.map_to_local_path(relative_path);
                ensure_within_dir(root, &local_rel)?;
                println!("  {bundle_path} -> {local_rel}");
                count += 1;
            }

            println!();
            ui::info(&format!("{count} file(s) would be updated for [{target}]."));
            total_installed += count;
            continue;
        }

        println!();
        let mut installed_files: Vec<String> = Vec::new();
        let mut installed = 0usize;
        let mut skipped = 0usize;

        for (bundle_path, relative_path) in &files {
            let local_rel = target.map_to_local_path(relative_path);
            let dest = match ensure_within_dir(root, &local_rel) {
                Ok(dest) => dest,
                Err(e) => {
                    ui::warn(&format!("{e} - skipped"));
                    skipped += 1;
                    continue;
                }
            };

            let main_doc = target.is_main_doc(relative_path);
            let exists = match file_exists(&dest) {
                Ok(exists) => exists,
                Err(e) => {
                    ui::warn(&format!("{e} - skipped"));
                    skipped += 1;
                    continue;
                }
            };

            // Update refreshes bundle-owned content without asking; only the
            // main document is assumed to carry user edits worth protecting.
            let mut strategy = ConflictStrategy::Overwrite;
            if exists && main_doc {
                strategy = resolve_conflict(provider, &local_rel, true, skip_prompts)?;
            }

            if strategy == ConflictStrategy::Skip {
                ui::warn(&format!("Skipped {local_rel}"));
                skipped += 1;
                continue;
            }

            let content = match source.fetch_file(repo, bundle_path) {
                Ok(Some(content)) => content,
                Ok(None) => {
                    ui::warn(&format!("Could not fetch {bundle_path} - skipped"));
                    skipped += 1;
                    continue;
                }
                Err(e) => {
                    ui::warn(&format!("Could not fetch {bundle_path}: {e} - skipped"));
                    skipped += 1;
                    continue;
                }
            };

            match install_file(&content, &dest, strategy) {
                Ok(true) => {
                    ui::success(&format!("Updated {local_rel}"));
                    installed_files.push(local_rel);
                    installed += 1;
                }
                Ok(false) => skipped += 1,
                Err(e) => {
                    ui::warn(&format!("Failed to update {local_rel}: {e}"));
                    skipped += 1;
                }
            }
        }

        // Union with the previous record: files installed by an older bundle
        // version stay tracked even if the new version does not touch them.
        if !installed_files.is_empty() {
            let list = updated_files.entry(target).or_default();
            for file in installed_files {
                if !list.contains(&file) {
                    list.push(file);
                }
            }
        }

        total_installed += installed;
        total_skipped += skipped;
    }

    // 4. Reinstall skills (target-independent, version change implies refresh)
    let mut skills_installed = 0usize;
    let mut updated_skills = entry.skills.clone();

    if dry_run {
        if let Ok(Some(content)) = source.fetch_skills_json(repo) {
            match parse_skills(&content) {
                Ok(skills_manifest) if !skills_manifest.skills.is_empty() => {
                    println!();
                    ui::info("Skills that would be updated:");
                    println!();
                    for skill in &skills_manifest.skills {
                        println!("  {} ({})", skill.name, skill.path);
                        skills_installed += 1;
                    }
                }
                Ok(_) => {}
                Err(_) => ui::warn("Invalid skills.json - skills would be skipped"),
            }
        }
    } else {
        match source.fetch_skills_json(repo) {
            Ok(Some(content)) => match parse_skills(&content) {
                Err(_) => ui::warn("Invalid skills.json - skills update skipped"),
                Ok(skills_manifest) if skills_manifest.skills.is_empty() => {}
                Ok(skills_manifest) => {
                    println!();
                    ui::info("Updating skills...");
                    println!();

                    let results = install_skills(
                        source,
                        provider,
                        repo,
                        &skills_manifest.skills,
                        &entry.targets,
                        root,
                        skip_prompts,
                        &tree,
                    );

                    for (skill, result) in skills_manifest.skills.iter().zip(results) {
                        match result {
                            Ok(per_target) => {
                                for (target, files) in per_target {
                                    let list = updated_files.entry(target).or_default();
                                    for file in files {
                                        if !list.contains(&file) {
                                            list.push(file);
                                        }
                                    }
                                }
                                ui::success(&format!("Updated skill: {}", skill.name));
                                if !updated_skills
                                    .iter()
                                    .any(|s| s.source == repo && s.name == skill.name)
                                {
                                    updated_skills.push(SkillLock {
                                        source: repo.to_string(),
                                        name: skill.name.clone(),
                                    });
                                }
                                skills_installed += 1;
                            }
                            Err(e) => {
                                ui::warn(&format!(
                                    "Failed to update skill \"{}\": {e}",
                                    skill.name
                                ));
                            }
                        }
                    }
                }
            },
            Ok(None) => {}
            Err(e) => ui::warn(&format!("Could not fetch skills.json: {e}")),
        }
    }

    // 5. Replacement lockfile entry, only when something was written
    let new_entry = if (total_installed > 0 || skills_installed > 0) && !dry_run {
        Some(LockedPackage {
            version: manifest.version.clone(),
            targets: entry.targets.clone(),
            installed_at: timestamp_now(),
            files: updated_files,
            skills: updated_skills,
        })
    } else {
        None
    };

    let total = total_installed + skills_installed;
    ui::info(&format!("{repo}: {total} file(s) updated, {total_skipped} skipped."));

    Ok(Some(UpdateReport {
        updated: true,
        installed: total,
        skipped: total_skipped,
        entry: new_entry,
    }))
}
