//! Bundle manifest (bplate.json) parsing and validation
//!
//! The manifest describes one remote bundle: its identity, version, and the
//! targets it ships files for. Validation is deliberately forgiving where the
//! ecosystem drifts (unknown targets are dropped with a warning, non-string
//! tags are dropped silently) and strict where identity matters.

use serde_json::Value;

use crate::error::{BplateError, Result};
use crate::target::Target;
use crate::ui;

/// A parsed, validated bundle manifest. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub name: String,
    pub author: String,
    pub version: String,
    pub description: Option<String>,
    pub targets: Vec<Target>,
    pub tags: Vec<String>,
}

impl Manifest {
    /// Parse and validate manifest JSON fetched from `repo`.
    pub fn parse(content: &str, repo: &str) -> Result<Manifest> {
        let raw: Value = serde_json::from_str(content).map_err(|_| invalid(repo, "invalid JSON"))?;

        let obj = raw
            .as_object()
            .ok_or_else(|| invalid(repo, "expected an object"))?;

        Ok(Manifest {
            name: require_string(obj, "name", repo)?,
            author: require_string(obj, "author", repo)?,
            version: require_string(obj, "version", repo)?,
            description: optional_string(obj, "description", repo)?,
            targets: require_targets(obj, repo)?,
            tags: optional_string_array(obj, "tags", repo)?,
        })
    }
}

fn invalid(repo: &str, reason: &str) -> BplateError {
    BplateError::ManifestInvalid {
        repo: repo.to_string(),
        reason: reason.to_string(),
    }
}

fn require_string(
    obj: &serde_json::Map<String, Value>,
    key: &str,
    repo: &str,
) -> Result<String> {
    match obj.get(key).and_then(Value::as_str) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(invalid(
            repo,
            &format!("\"{key}\" is required and must be a non-empty string"),
        )),
    }
}

fn optional_string(
    obj: &serde_json::Map<String, Value>,
    key: &str,
    repo: &str,
) -> Result<Option<String>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(invalid(repo, &format!("\"{key}\" must be a string"))),
    }
}

fn require_targets(obj: &serde_json::Map<String, Value>, repo: &str) -> Result<Vec<Target>> {
    let values = match obj.get("targets").and_then(Value::as_array) {
        Some(values) if !values.is_empty() => values,
        _ => {
            return Err(invalid(
                repo,
                "\"targets\" is required and must be a non-empty array",
            ));
        }
    };

    let valid_names = || {
        Target::ALL
            .iter()
            .map(|t| t.id())
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut targets = Vec::new();
    for value in values {
        let Some(name) = value.as_str() else { continue };
        match Target::parse(name) {
            Some(target) => {
                if !targets.contains(&target) {
                    targets.push(target);
                }
            }
            None => ui::warn(&format!(
                "Unknown target \"{name}\" in manifest - ignored. Valid targets: {}",
                valid_names()
            )),
        }
    }

    if targets.is_empty() {
        return Err(invalid(
            repo,
            &format!("\"targets\" must contain at least one of: {}", valid_names()),
        ));
    }

    Ok(targets)
}

fn optional_string_array(
    obj: &serde_json::Map<String, Value>,
    key: &str,
    repo: &str,
) -> Result<Vec<String>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(values)) => Ok(values
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect()),
        Some(_) => Err(invalid(repo, &format!("\"{key}\" must be an array"))),
    }
}
