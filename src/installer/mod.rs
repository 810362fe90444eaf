//! File installation for bundles
//!
//! This module handles:
//! - Deciding what to do with an existing destination file (conflict.rs)
//! - Writing content to a destination honoring that decision (files.rs)

pub mod conflict;
pub mod files;

pub use conflict::{ConflictStrategy, resolve_conflict};
pub use files::{APPEND_SEPARATOR, file_exists, install_file};
