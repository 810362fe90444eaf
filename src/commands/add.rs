//! Add command implementation
//!
//! Installs one boilerplate into the project:
//! 1. Fetch and validate the manifest
//! 2. Resolve the target set (auto with --yes, interactively otherwise)
//! 3. Fetch the file tree and filter it per selected target
//! 4. Install files through the conflict resolver (or list them in dry-run)
//! 5. Install declared skills on the worker pool
//! 6. Merge the outcome into the lockfile and record telemetry

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::cli::AddArgs;
use crate::commands::filter_tree_for_target;
use crate::error::Result;
use crate::installer::{ConflictStrategy, file_exists, install_file, resolve_conflict};
use crate::lockfile::{LockedPackage, Lockfile, SkillLock, timestamp_now};
use crate::path_utils::ensure_within_dir;
use crate::prompt::{DecisionProvider, InteractivePrompter};
use crate::registry::Registry;
use crate::skills::{install_skills, parse_skills};
use crate::source::github::GithubSource;
use crate::source::{MANIFEST_FILENAME, PackageSource, RepoRef};
use crate::target::Target;
use crate::ui;

/// Run the add command
pub fn run(workspace: Option<PathBuf>, args: AddArgs) -> Result<()> {
    let root = super::project_root(workspace)?;
    let source = GithubSource::new();
    let registry = Registry::new();
    execute(
        &root,
        &args.package,
        &source,
        &InteractivePrompter,
        Some(&registry),
        args.yes,
        args.dry_run,
    )
}

/// Install `package` into the project at `root`.
pub(crate) fn execute(
    root: &Path,
    package: &str,
    source: &dyn PackageSource,
    provider: &dyn DecisionProvider,
    registry: Option<&Registry>,
    skip_prompts: bool,
    dry_run: bool,
) -> Result<()> {
    RepoRef::parse(package)?;

    // 1. Fetch and validate manifest
    let pb = ui::spinner(&format!("Fetching {MANIFEST_FILENAME}..."));
    let manifest = match source.fetch_manifest(package) {
        Ok(manifest) => {
            ui::spinner_success(
                &pb,
                &format!(
                    "Found {} by {} (v{})",
                    manifest.name, manifest.author, manifest.version
                ),
            );
            manifest
        }
        Err(e) => {
            ui::spinner_fail(&pb, "Failed to fetch manifest");
            return Err(e);
        }
    };

    // 2. Select targets
    let selected = if skip_prompts {
        if manifest.targets.len() > 1 {
            let ids: Vec<&str> = manifest.targets.iter().map(|t| t.id()).collect();
            ui::info(&format!("Auto-selected targets: {}", ids.join(", ")));
        }
        manifest.targets.clone()
    } else {
        provider.choose_targets(&manifest.targets)?
    };

    if selected.is_empty() {
        ui::info("Installation cancelled.");
        return Ok(());
    }

    // 3. Fetch repo tree
    let pb = ui::spinner("Fetching file list...");
    let tree = match source.fetch_tree(package) {
        Ok(tree) => {
            ui::spinner_success(&pb, "File list fetched");
            tree
        }
        Err(e) => {
            ui::spinner_fail(&pb, "Failed to fetch file list");
            return Err(e);
        }
    };

    // 4. Filter files for selected targets
    let mut files_by_target: Vec<(Target, Vec<(String, String)>)> = Vec::new();
    for &target in &selected {
        let files = filter_tree_for_target(&tree, target);
        if !files.is_empty() {
            files_by_target.push((target, files));
        }
    }

    if files_by_target.is_empty() {
        ui::warn(&format!("No files found for selected targets in {package}"));
        return Ok(());
    }

    // 5. Dry run: list every mapping, still validating destinations
    if dry_run {
        return dry_run_report(root, package, source, &files_by_target);
    }

    // 6. Install files
    println!();

    let mut installed = 0usize;
    let mut skipped = 0usize;
    let mut installed_by_target: BTreeMap<Target, Vec<String>> = BTreeMap::new();

    for (target, files) in &files_by_target {
        if files_by_target.len() > 1 {
            ui::info(&format!("Installing {target} files..."));
            println!();
        }

        for (bundle_path, relative_path) in files {
            let local_rel = target.map_to_local_path(relative_path);
            let dest = match ensure_within_dir(root, &local_rel) {
                Ok(dest) => dest,
                Err(e) => {
                    ui::warn(&format!("{e} - skipped"));
                    skipped += 1;
                    continue;
                }
            };

            let exists = match file_exists(&dest) {
                Ok(exists) => exists,
                Err(e) => {
                    ui::warn(&format!("{e} - skipped"));
                    skipped += 1;
                    continue;
                }
            };
            let mut strategy = ConflictStrategy::Overwrite;
            if exists {
                strategy = resolve_conflict(
                    provider,
                    &local_rel,
                    target.is_main_doc(relative_path),
                    skip_prompts,
                )?;
            }

            if strategy == ConflictStrategy::Skip {
                ui::warn(&format!("Skipped {local_rel}"));
                skipped += 1;
                continue;
            }

            let content = match source.fetch_file(package, bundle_path) {
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
                    ui::success(&format!("Installed {local_rel}"));
                    installed_by_target
                        .entry(*target)
                        .or_default()
                        .push(local_rel);
                    installed += 1;
                }
                Ok(false) => skipped += 1,
                Err(e) => {
                    ui::warn(&format!("Failed to install {local_rel}: {e}"));
                    skipped += 1;
                }
            }
        }
    }

    // 7. Install skills
    let mut skills_installed = 0usize;
    let mut skill_locks: Vec<SkillLock> = Vec::new();

    match source.fetch_skills_json(package) {
        Err(e) => ui::warn(&format!("Could not fetch skills.json: {e} - skills skipped")),
        Ok(None) => ui::info("No skills.json found - skipping skills installation."),
        Ok(Some(content)) => match parse_skills(&content) {
            Err(_) => ui::warn("Invalid skills.json - skills installation skipped"),
            Ok(skills_manifest) if skills_manifest.skills.is_empty() => {}
            Ok(skills_manifest) => {
                println!();
                ui::info("Installing skills...");
                println!();

                let results = install_skills(
                    source,
                    provider,
                    package,
                    &skills_manifest.skills,
                    &selected,
                    root,
                    skip_prompts,
                    &tree,
                );

                for (skill, result) in skills_manifest.skills.iter().zip(results) {
                    match result {
                        Ok(per_target) => {
                            for (target, files) in per_target {
                                installed_by_target.entry(target).or_default().extend(files);
                            }
                            ui::success(&format!("Installed skill: {}", skill.name));
                            skill_locks.push(SkillLock {
                                source: package.to_string(),
                                name: skill.name.clone(),
                            });
                            skills_installed += 1;
                        }
                        Err(e) => {
                            ui::warn(&format!("Failed to install skill \"{}\": {e}", skill.name));
                        }
                    }
                }
            }
        },
    }

    // 8. Merge into lockfile
    if installed > 0 || skills_installed > 0 {
        let mut lockfile = Lockfile::read(root);
        merge_lockfile_entry(
            &mut lockfile,
            package,
            &manifest.version,
            &selected,
            installed_by_target,
            skill_locks,
        );
        lockfile.write(root)?;
    }

    // 9. Summary and best-effort telemetry
    println!();
    let summary = if skills_installed > 0 {
        format!("{installed} file(s) + {skills_installed} skill(s)")
    } else {
        format!("{installed} file(s)")
    };
    ui::success(&format!("Done! {summary} installed, {skipped} skipped."));

    if installed + skills_installed > 0 {
        if let Some(registry) = registry {
            registry.record_download(package);
        }
    }

    Ok(())
}

/// Merge this run's outcome into the package's lockfile entry: union of
/// targets, last-write-wins per-target file lists, skills deduplicated by
/// source plus name.
fn merge_lockfile_entry(
    lockfile: &mut Lockfile,
    package: &str,
    version: &str,
    selected: &[Target],
    installed_by_target: BTreeMap<Target, Vec<String>>,
    skill_locks: Vec<SkillLock>,
) {
    let mut entry = lockfile
        .packages
        .remove(package)
        .unwrap_or_else(|| LockedPackage {
            version: version.to_string(),
            targets: Vec::new(),
            installed_at: String::new(),
            files: BTreeMap::new(),
            skills: Vec::new(),
        });

    entry.version = version.to_string();
    for &target in selected {
        if !entry.targets.contains(&target) {
            entry.targets.push(target);
        }
    }
    for (target, files) in installed_by_target {
        entry.files.insert(target, files);
    }
    for lock in skill_locks {
        if !entry
            .skills
            .iter()
            .any(|s| s.source == lock.source && s.name == lock.name)
        {
            entry.skills.push(lock);
        }
    }
    entry.installed_at = timestamp_now();

    lockfile.packages.insert(package.to_string(), entry);
}

/// Side-effect-free preview of what a real run would install, applying the
/// same destination validation so rejected paths are rejected here too.
fn dry_run_report(
    root: &Path,
    package: &str,
    source: &dyn PackageSource,
    files_by_target: &[(Target, Vec<(String, String)>)],
) -> Result<()> {
    println!();
    ui::info("Dry run - the following files would be installed:");
    println!();

    let mut count = 0usize;
    for (target, files) in files_by_target {
        println!("  [{target}]");
        for (bundle_path, relative_path) in files {
            let local_rel = target.map_to_local_path(relative_path);
            ensure_within_dir(root, &local_rel)?;
            println!("    {bundle_path} -> {local_rel}");
            count += 1;
        }
    }

    if let Ok(Some(content)) = source.fetch_skills_json(package) {
        match parse_skills(&content) {
            Ok(skills_manifest) if !skills_manifest.skills.is_empty() => {
                println!();
                ui::info("Skills that would be installed:");
                println!();
                for skill in &skills_manifest.skills {
                    if skill.description.is_empty() {
                        println!("  {} ({})", skill.name, skill.path);
                    } else {
                        println!("  {} - {} ({})", skill.name, skill.description, skill.path);
                    }
                }
            }
            Ok(_) => {}
            Err(_) => ui::warn("Invalid skills.json - skills would be skipped"),
        }
    }

    println!();
    ui::info(&format!("Dry run complete. {count} file(s) would be installed."));
    Ok(())
}
