//! Lockfile (bplate-lock.json) persistence
//!
//! The lockfile is the persisted record of installed packages: per-package
//! version, target set, per-target installed-file lists, installed skills,
//! and install timestamp. Reads heal rather than crash: entries that do not
//! match the current schema are dropped with a warning and the rest of the
//! file still loads. Writes are canonical (sorted package keys, forward-
//! slash paths, pretty-printed JSON with a trailing newline) so the artifact
//! is diff-stable across operating systems and repeated runs.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::error::{BplateError, Result};
use crate::path_utils::to_posix_str;
use crate::target::Target;
use crate::ui;

pub const LOCKFILE_NAME: &str = "bplate-lock.json";
const LOCKFILE_VERSION: u64 = 1;

/// One installed skill, keyed by source repo plus skill name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillLock {
    pub source: String,
    pub name: String,
}

/// Lockfile entry for one installed package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockedPackage {
    /// Bundle version string from the manifest at install time
    pub version: String,
    /// Targets this package was installed for
    pub targets: Vec<Target>,
    /// RFC 3339 timestamp of the last install or update
    #[serde(rename = "installedAt")]
    pub installed_at: String,
    /// Installed project-relative file paths, per target
    pub files: BTreeMap<Target, Vec<String>>,
    /// Installed skills
    pub skills: Vec<SkillLock>,
}

/// The whole lockfile: schema version plus packages keyed by `owner/repo`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lockfile {
    pub version: u64,
    pub packages: BTreeMap<String, LockedPackage>,
}

impl Default for Lockfile {
    fn default() -> Self {
        Lockfile {
            version: LOCKFILE_VERSION,
            packages: BTreeMap::new(),
        }
    }
}

impl Lockfile {
    /// Read and validate the lockfile under `root`.
    ///
    /// Absent or unparsable files yield an empty lockfile; structurally
    /// invalid entries are dropped individually with a warning.
    pub fn read(root: &Path) -> Lockfile {
        let path = root.join(LOCKFILE_NAME);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(_) => return Lockfile::default(),
        };

        let raw: Value = match serde_json::from_str(&content) {
            Ok(raw) => raw,
            Err(_) => {
                ui::warn(&format!(
                    "{LOCKFILE_NAME} is corrupted and will be reset. Existing install tracking may be lost."
                ));
                return Lockfile::default();
            }
        };

        let Some(raw_packages) = raw.get("packages").and_then(Value::as_object) else {
            return Lockfile::default();
        };

        let mut packages = BTreeMap::new();
        for (key, entry) in raw_packages {
            match validate_entry(entry) {
                Some(package) => {
                    packages.insert(key.clone(), package);
                }
                None => ui::warn(&format!(
                    "Ignoring invalid lockfile entry for {key}. Run 'bplate add {key}' to restore tracking."
                )),
            }
        }

        Lockfile {
            version: LOCKFILE_VERSION,
            packages,
        }
    }

    /// Write the lockfile canonically under `root`.
    pub fn write(&self, root: &Path) -> Result<()> {
        let path = root.join(LOCKFILE_NAME);
        let canonical = self.canonicalized();
        let json =
            serde_json::to_string_pretty(&canonical).map_err(|e| BplateError::FileWriteFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        fs::write(&path, format!("{json}\n")).map_err(|e| BplateError::FileWriteFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Normalize every file path to forward-slash form. Package key ordering
    /// is already canonical via the BTreeMap.
    fn canonicalized(&self) -> Lockfile {
        let mut copy = self.clone();
        for package in copy.packages.values_mut() {
            for files in package.files.values_mut() {
                for file in files.iter_mut() {
                    *file = to_posix_str(file);
                }
            }
        }
        copy
    }
}

/// Current timestamp in the lockfile's RFC 3339 format
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Validate one raw package entry against the schema.
///
/// All-or-nothing: any structural problem drops the whole entry. Entries of
/// the retired single-target shape (`"target"` plus a flat `files` array)
/// fail here too and are dropped rather than migrated; re-adding the package
/// restores tracking.
fn validate_entry(entry: &Value) -> Option<LockedPackage> {
    let obj = entry.as_object()?;

    let version = obj.get("version")?.as_str()?;
    let installed_at = obj.get("installedAt")?.as_str()?;

    let mut targets = Vec::new();
    for value in obj.get("targets")?.as_array()? {
        let target = Target::parse(value.as_str()?)?;
        if !targets.contains(&target) {
            targets.push(target);
        }
    }
    if targets.is_empty() {
        return None;
    }

    let mut files = BTreeMap::new();
    for (key, value) in obj.get("files")?.as_object()? {
        let target = Target::parse(key)?;
        // Every tracked file list must belong to a declared target.
        if !targets.contains(&target) {
            return None;
        }
        let mut paths = Vec::new();
        for path in value.as_array()? {
            paths.push(path.as_str()?.to_string());
        }
        files.insert(target, paths);
    }

    let mut skills = Vec::new();
    if let Some(raw_skills) = obj.get("skills") {
        for value in raw_skills.as_array()? {
            let skill = value.as_object()?;
            let source = skill.get("source")?.as_str()?;
            let name = skill.get("name")?.as_str()?;
            if source.is_empty() || name.is_empty() {
                return None;
            }
            skills.push(SkillLock {
                source: source.to_string(),
                name: name.to_string(),
            });
        }
    }

    Some(LockedPackage {
        version: version.to_string(),
        targets,
        installed_at: installed_at.to_string(),
        files,
        skills,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_entry() -> LockedPackage {
        LockedPackage {
            version: "1.0.0".to_string(),
            targets: vec![Target::Claude],
            installed_at: "2025-01-01T00:00:00.000Z".to_string(),
            files: BTreeMap::from([(
                Target::Claude,
                vec!["CLAUDE.md".to_string(), ".claude/commands/review.md".to_string()],
            )]),
            skills: vec![SkillLock {
                source: "user/repo".to_string(),
                name: "review".to_string(),
            }],
        }
    }

    #[test]
    fn test_read_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let lockfile = Lockfile::read(temp.path());
        assert!(lockfile.packages.is_empty());
    }

    #[test]
    fn test_read_corrupted_json_is_empty() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(LOCKFILE_NAME), "not valid json {{{").unwrap();
        let lockfile = Lockfile::read(temp.path());
        assert!(lockfile.packages.is_empty());
    }

    #[test]
    fn test_read_missing_packages_key_is_empty() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(LOCKFILE_NAME), r#"{"version": 1}"#).unwrap();
        let lockfile = Lockfile::read(temp.path());
        assert!(lockfile.packages.is_empty());
    }

    #[test]
    fn test_write_read_round_trip() {
        let temp = TempDir::new().unwrap();
        let mut lockfile = Lockfile::default();
        lockfile
            .packages
            .insert("user/repo".to_string(), sample_entry());

        lockfile.write(temp.path()).unwrap();
        let read_back = Lockfile::read(temp.path());

        assert_eq!(read_back, lockfile);
    }

    #[test]
    fn test_write_is_pretty_sorted_with_trailing_newline() {
        let temp = TempDir::new().unwrap();
        let mut lockfile = Lockfile::default();
        lockfile
            .packages
            .insert("z-user/repo".to_string(), sample_entry());
        lockfile
            .packages
            .insert("a-user/repo".to_string(), sample_entry());

        lockfile.write(temp.path()).unwrap();

        let content = fs::read_to_string(temp.path().join(LOCKFILE_NAME)).unwrap();
        assert!(content.ends_with('\n'));
        assert!(content.contains("\n  "));
        let a = content.find("a-user/repo").unwrap();
        let z = content.find("z-user/repo").unwrap();
        assert!(a < z, "packages must be sorted by key");
        let parsed: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["version"], 1);
    }

    #[test]
    fn test_write_normalizes_paths_to_posix() {
        let temp = TempDir::new().unwrap();
        let mut entry = sample_entry();
        entry.files.insert(
            Target::Claude,
            vec![".claude\\commands\\review.md".to_string()],
        );
        let mut lockfile = Lockfile::default();
        lockfile.packages.insert("user/repo".to_string(), entry);

        lockfile.write(temp.path()).unwrap();

        let content = fs::read_to_string(temp.path().join(LOCKFILE_NAME)).unwrap();
        assert!(content.contains(".claude/commands/review.md"));
        assert!(!content.contains("\\\\"));
    }

    #[test]
    fn test_read_drops_entry_with_unknown_target() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(LOCKFILE_NAME),
            r#"{
                "version": 1,
                "packages": {
                    "valid/repo": {
                        "version": "1.0.0",
                        "targets": ["claude"],
                        "installedAt": "2025-01-01T00:00:00.000Z",
                        "files": {"claude": ["CLAUDE.md"]},
                        "skills": []
                    },
                    "invalid/repo": {
                        "version": "1.0.0",
                        "targets": ["cursor"],
                        "installedAt": "2025-01-01T00:00:00.000Z",
                        "files": {},
                        "skills": []
                    }
                }
            }"#,
        )
        .unwrap();

        let lockfile = Lockfile::read(temp.path());
        assert!(lockfile.packages.contains_key("valid/repo"));
        assert!(!lockfile.packages.contains_key("invalid/repo"));
    }

    #[test]
    fn test_read_drops_entry_with_files_for_undeclared_target() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(LOCKFILE_NAME),
            r#"{
                "version": 1,
                "packages": {
                    "user/repo": {
                        "version": "1.0.0",
                        "targets": ["claude"],
                        "installedAt": "2025-01-01T00:00:00.000Z",
                        "files": {"codex": ["AGENTS.md"]},
                        "skills": []
                    }
                }
            }"#,
        )
        .unwrap();

        let lockfile = Lockfile::read(temp.path());
        assert!(lockfile.packages.is_empty());
    }

    #[test]
    fn test_read_drops_entry_with_non_string_files() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(LOCKFILE_NAME),
            r#"{
                "version": 1,
                "packages": {
                    "user/repo": {
                        "version": "1.0.0",
                        "targets": ["claude"],
                        "installedAt": "2025-01-01T00:00:00.000Z",
                        "files": {"claude": [123, 456]},
                        "skills": []
                    }
                }
            }"#,
        )
        .unwrap();

        let lockfile = Lockfile::read(temp.path());
        assert!(lockfile.packages.is_empty());
    }

    #[test]
    fn test_read_drops_legacy_single_target_entry() {
        // The retired schema stored one target and a flat file list. Those
        // entries are dropped, not migrated, and siblings still load.
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(LOCKFILE_NAME),
            r#"{
                "version": 1,
                "packages": {
                    "old/repo": {
                        "version": "1.0.0",
                        "target": "claude",
                        "installedAt": "2025-01-01T00:00:00.000Z",
                        "files": ["CLAUDE.md"]
                    },
                    "new/repo": {
                        "version": "2.0.0",
                        "targets": ["codex"],
                        "installedAt": "2025-01-01T00:00:00.000Z",
                        "files": {"codex": ["AGENTS.md"]},
                        "skills": []
                    }
                }
            }"#,
        )
        .unwrap();

        let lockfile = Lockfile::read(temp.path());
        assert!(!lockfile.packages.contains_key("old/repo"));
        assert!(lockfile.packages.contains_key("new/repo"));
    }

    #[test]
    fn test_read_drops_entry_with_empty_skill_fields() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(LOCKFILE_NAME),
            r#"{
                "version": 1,
                "packages": {
                    "user/repo": {
                        "version": "1.0.0",
                        "targets": ["claude"],
                        "installedAt": "2025-01-01T00:00:00.000Z",
                        "files": {"claude": []},
                        "skills": [{"source": "", "name": "review"}]
                    }
                }
            }"#,
        )
        .unwrap();

        let lockfile = Lockfile::read(temp.path());
        assert!(lockfile.packages.is_empty());
    }

    #[test]
    fn test_read_tolerates_missing_skills_field() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(LOCKFILE_NAME),
            r#"{
                "version": 1,
                "packages": {
                    "user/repo": {
                        "version": "1.0.0",
                        "targets": ["claude"],
                        "installedAt": "2025-01-01T00:00:00.000Z",
                        "files": {"claude": ["CLAUDE.md"]}
                    }
                }
            }"#,
        )
        .unwrap();

        let lockfile = Lockfile::read(temp.path());
        let entry = lockfile.packages.get("user/repo").unwrap();
        assert!(entry.skills.is_empty());
    }

    #[test]
    fn test_timestamp_format() {
        let stamp = timestamp_now();
        assert!(stamp.ends_with('Z'));
        assert!(stamp.contains('T'));
    }
}
