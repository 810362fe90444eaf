//! Skill declaration parsing and installation
//!
//! A skill is an independently installable sub-bundle: a directory of files
//! declared in skills.json, installed under each target's skills directory.
//! A declaration whose path points at a single file is the legacy shape and
//! installs as the skill's SKILL.md entry document.
//!
//! Installing multiple skills runs on a bounded worker pool so their network
//! fetches overlap; one failing skill never aborts the others, and outcomes
//! are aggregated by declaration order regardless of completion order.

use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use serde_json::Value;

use crate::error::{BplateError, Result};
use crate::installer::{ConflictStrategy, file_exists, install_file, resolve_conflict};
use crate::path_utils::ensure_within_dir;
use crate::prompt::DecisionProvider;
use crate::source::{EntryKind, PackageSource, TreeEntry};
use crate::target::Target;

/// Worker pool size for concurrent skill installs
pub const SKILL_CONCURRENCY: usize = 5;

/// Entry document name for a legacy single-file skill
pub const SKILL_ENTRY_FILENAME: &str = "SKILL.md";

/// One declared skill
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skill {
    pub name: String,
    pub description: String,
    pub path: String,
}

/// The parsed skills declaration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillsManifest {
    pub skills: Vec<Skill>,
}

/// Parse a skills.json document.
///
/// The top-level shape must be `{"skills": [...]}`; anything else is an
/// error. Individual entries are dropped when malformed, which also covers
/// the historical shapes (plain command strings, repo+skill pairs) that
/// predate the current schema.
pub fn parse_skills(content: &str) -> Result<SkillsManifest> {
    let raw: Value = serde_json::from_str(content).map_err(|_| BplateError::SkillsInvalid {
        reason: "invalid JSON".to_string(),
    })?;

    let obj = raw.as_object().ok_or_else(|| BplateError::SkillsInvalid {
        reason: "expected an object".to_string(),
    })?;

    let entries = obj
        .get("skills")
        .and_then(Value::as_array)
        .ok_or_else(|| BplateError::SkillsInvalid {
            reason: "\"skills\" must be an array".to_string(),
        })?;

    let skills = entries.iter().filter_map(parse_skill_entry).collect();
    Ok(SkillsManifest { skills })
}

fn parse_skill_entry(value: &Value) -> Option<Skill> {
    let obj = value.as_object()?;
    let name = obj.get("name")?.as_str()?;
    let path = obj.get("path")?.as_str()?;
    if !is_safe_skill_name(name) || path.is_empty() {
        return None;
    }
    let description = obj
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    Some(Skill {
        name: name.to_string(),
        description,
        path: path.to_string(),
    })
}

/// Skill names become directory names, so only word characters and hyphens
/// are allowed.
pub fn is_safe_skill_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Project-relative directory for a skill (e.g. ".claude/skills/review")
pub fn skill_dir(target: Target, skill_name: &str) -> String {
    format!("{}/{skill_name}", target.skills_dir())
}

/// Install one skill for one target.
///
/// Returns the project-relative paths actually written (empty if everything
/// was skipped).
#[allow(clippy::too_many_arguments)]
pub fn install_skill(
    source: &dyn PackageSource,
    provider: &dyn DecisionProvider,
    repo: &str,
    skill: &Skill,
    target: Target,
    root: &Path,
    skip_prompts: bool,
    tree: &[TreeEntry],
) -> Result<Vec<String>> {
    let prefix = if skill.path.ends_with('/') {
        skill.path.clone()
    } else {
        format!("{}/", skill.path)
    };

    let skill_files: Vec<&TreeEntry> = tree
        .iter()
        .filter(|e| e.kind == EntryKind::Blob && e.path.starts_with(&prefix))
        .collect();

    // Directory-based skill: install the whole subtree.
    if !skill_files.is_empty() {
        let mut installed = Vec::new();

        for entry in skill_files {
            let relative_path = &entry.path[prefix.len()..];
            if relative_path.is_empty() {
                continue;
            }

            let dest_rel = format!("{}/{relative_path}", skill_dir(target, &skill.name));
            let dest = ensure_within_dir(root, &dest_rel)?;

            let Some(content) = source.fetch_file(repo, &entry.path)? else {
                continue;
            };

            let mut strategy = ConflictStrategy::Overwrite;
            if file_exists(&dest)? {
                strategy = resolve_conflict(provider, &dest_rel, false, skip_prompts)?;
            }

            if install_file(&content, &dest, strategy)? {
                installed.push(dest_rel);
            }
        }

        return Ok(installed);
    }

    // Legacy single-file skill: install as the skill's entry document.
    let Some(content) = source.fetch_file(repo, &skill.path)? else {
        return Err(BplateError::SkillNotFound {
            path: skill.path.clone(),
        });
    };

    let dest_rel = format!("{}/{SKILL_ENTRY_FILENAME}", skill_dir(target, &skill.name));
    let dest = ensure_within_dir(root, &dest_rel)?;

    let mut strategy = ConflictStrategy::Overwrite;
    if file_exists(&dest)? {
        strategy = resolve_conflict(provider, &dest_rel, false, skip_prompts)?;
    }

    if install_file(&content, &dest, strategy)? {
        Ok(vec![dest_rel])
    } else {
        Ok(vec![])
    }
}

/// Per-skill outcome: installed file paths per target
pub type SkillResult = Result<Vec<(Target, Vec<String>)>>;

/// Install all declared skills for the selected targets.
///
/// A fixed pool of workers pulls the next pending skill from a shared index
/// counter. Results land in the slot of their original index, so the
/// returned vector lines up with `skills` no matter which worker finished
/// first.
#[allow(clippy::too_many_arguments)]
pub fn install_skills(
    source: &dyn PackageSource,
    provider: &dyn DecisionProvider,
    repo: &str,
    skills: &[Skill],
    targets: &[Target],
    root: &Path,
    skip_prompts: bool,
    tree: &[TreeEntry],
) -> Vec<SkillResult> {
    let next = AtomicUsize::new(0);
    let slots: Vec<Mutex<Option<SkillResult>>> =
        skills.iter().map(|_| Mutex::new(None)).collect();
    let workers = SKILL_CONCURRENCY.min(skills.len());

    thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|| {
                loop {
                    let i = next.fetch_add(1, Ordering::SeqCst);
                    if i >= skills.len() {
                        break;
                    }
                    let outcome = run_skill_task(
                        source,
                        provider,
                        repo,
                        &skills[i],
                        targets,
                        root,
                        skip_prompts,
                        tree,
                    );
                    if let Ok(mut slot) = slots[i].lock() {
                        *slot = Some(outcome);
                    }
                }
            });
        }
    });

    slots
        .into_iter()
        .map(|slot| match slot.into_inner() {
            Ok(Some(outcome)) => outcome,
            _ => Err(BplateError::IoError {
                message: "skill install worker terminated unexpectedly".to_string(),
            }),
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn run_skill_task(
    source: &dyn PackageSource,
    provider: &dyn DecisionProvider,
    repo: &str,
    skill: &Skill,
    targets: &[Target],
    root: &Path,
    skip_prompts: bool,
    tree: &[TreeEntry],
) -> SkillResult {
    let mut per_target = Vec::new();
    for &target in targets {
        let files = install_skill(
            source,
            provider,
            repo,
            skill,
            target,
            root,
            skip_prompts,
            tree,
        )?;
        per_target.push((target, files));
    }
    Ok(per_target)
}
