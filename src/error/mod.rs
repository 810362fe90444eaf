//! Error types and handling for bplate
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for bplate operations
#[derive(Error, Diagnostic, Debug)]
pub enum BplateError {
    // Package reference errors
    #[error("Invalid repository format: \"{spec}\"")]
    #[diagnostic(
        code(bplate::package::invalid_ref),
        help("Packages are referenced as \"owner/repo\", e.g. \"acme/rust-starter\"")
    )]
    InvalidPackageRef { spec: String },

    #[error("Package \"{repo}\" is not installed")]
    #[diagnostic(
        code(bplate::package::not_installed),
        help("Check bplate-lock.json, or run 'bplate add <owner/repo>' first")
    )]
    PackageNotInstalled { repo: String },

    // Manifest errors
    #[error("No bplate.json found in {repo}")]
    #[diagnostic(
        code(bplate::manifest::not_found),
        help("Is this a bplate boilerplate repository?")
    )]
    ManifestNotFound { repo: String },

    #[error("Invalid bplate.json in {repo}: {reason}")]
    #[diagnostic(code(bplate::manifest::invalid))]
    ManifestInvalid { repo: String, reason: String },

    // Skills declaration errors
    #[error("Invalid skills.json: {reason}")]
    #[diagnostic(code(bplate::skills::invalid))]
    SkillsInvalid { reason: String },

    #[error("Skill not found in repo: {path}")]
    #[diagnostic(code(bplate::skills::not_found))]
    SkillNotFound { path: String },

    // Remote access errors
    #[error("Repository not found: {repo}")]
    #[diagnostic(
        code(bplate::remote::not_found),
        help("Check that the repository exists and is public")
    )]
    RepoNotFound { repo: String },

    #[error("GitHub API rate limit exceeded")]
    #[diagnostic(
        code(bplate::remote::rate_limited),
        help("Set GITHUB_TOKEN to increase the limit")
    )]
    RateLimited,

    #[error("Access denied for repository: {repo}")]
    #[diagnostic(
        code(bplate::remote::forbidden),
        help("The repository may be private, or GITHUB_TOKEN lacks permissions")
    )]
    AccessDenied { repo: String },

    #[error("Failed to fetch {what}: {reason}")]
    #[diagnostic(code(bplate::remote::fetch_failed))]
    FetchFailed { what: String, reason: String },

    #[error("HTTP request failed: {message}")]
    #[diagnostic(code(bplate::remote::http))]
    Http { message: String },

    // File system errors
    #[error("Path traversal detected: \"{path}\" resolves outside the project directory")]
    #[diagnostic(code(bplate::fs::traversal))]
    PathTraversal { path: String },

    #[error("Failed to read file: {path}")]
    #[diagnostic(code(bplate::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}")]
    #[diagnostic(code(bplate::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(bplate::fs::io_error))]
    IoError { message: String },
}

impl From<std::io::Error> for BplateError {
    fn from(err: std::io::Error) -> Self {
        BplateError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for BplateError {
    fn from(err: serde_json::Error) -> Self {
        BplateError::IoError {
            message: format!("JSON error: {err}"),
        }
    }
}

impl From<reqwest::Error> for BplateError {
    fn from(err: reqwest::Error) -> Self {
        BplateError::Http {
            message: err.to_string(),
        }
    }
}

impl From<inquire::InquireError> for BplateError {
    fn from(err: inquire::InquireError) -> Self {
        BplateError::IoError {
            message: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, BplateError>;

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_error_contains {
        ($test_name:ident, $err:expr, $($contains:expr),+ $(,)?) => {
            #[test]
            fn $test_name() {
                let err = $err;
                let error_string = err.to_string();
                $(
                    assert!(error_string.contains($contains),
                        "Error message should contain '{}', got: {}",
                        $contains,
                        error_string
                    );
                )+
            }
        };
    }

    #[test]
    fn test_error_display() {
        let err = BplateError::RepoNotFound {
            repo: "user/missing".to_string(),
        };
        assert_eq!(err.to_string(), "Repository not found: user/missing");
    }

    #[test]
    fn test_error_code() {
        let err = BplateError::RateLimited;
        assert_eq!(
            err.code().map(|c| c.to_string()),
            Some("bplate::remote::rate_limited".to_string())
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: BplateError = io_err.into();
        assert!(matches!(err, BplateError::IoError { .. }));
    }

    #[test]
    fn test_json_error_conversion() {
        let parse_result: std::result::Result<serde_json::Value, _> =
            serde_json::from_str("not json");
        let err: BplateError = parse_result.unwrap_err().into();
        assert!(matches!(err, BplateError::IoError { .. }));
    }

    test_error_contains!(
        test_rate_limited_error,
        BplateError::RateLimited,
        "rate limit exceeded"
    );

    test_error_contains!(
        test_traversal_error,
        BplateError::PathTraversal {
            path: "../etc/passwd".to_string()
        },
        "Path traversal detected",
        "../etc/passwd",
    );

    test_error_contains!(
        test_invalid_package_ref_error,
        BplateError::InvalidPackageRef {
            spec: "no-slash".to_string()
        },
        "Invalid repository format",
        "no-slash",
    );

    test_error_contains!(
        test_manifest_not_found_error,
        BplateError::ManifestNotFound {
            repo: "user/repo".to_string()
        },
        "No bplate.json found in user/repo",
    );
}
