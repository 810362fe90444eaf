//! CLI definitions using clap derive API
//!
//! This module is organized into submodules for each command's argument types:
//! - add: Add command arguments
//! - update: Update command arguments
//! - completions: Completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod add;
pub mod completions;
pub mod update;

pub use add::AddArgs;
pub use completions::CompletionsArgs;
pub use update::UpdateArgs;

/// bplate - boilerplate manager for AI coding assistants
///
/// Install reusable instruction documents, command templates, and skills
/// into a project for one or more assistant targets, and keep them updated.
#[derive(Parser, Debug)]
#[command(
    name = "bplate",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Boilerplate manager for AI coding assistants",
    long_about = "bplate installs boilerplate bundles (instruction documents, command templates, \
                  and skills) from GitHub repositories into your project for one or more AI \
                  coding-assistant targets (claude, codex, gemini), and keeps them up to date \
                  through a lockfile.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  bplate add acme/rust-starter          \x1b[90m# Install a boilerplate\x1b[0m\n   \
                  bplate add acme/rust-starter --yes    \x1b[90m# Install without prompts\x1b[0m\n   \
                  bplate update                          \x1b[90m# Update all installed packages\x1b[0m\n   \
                  bplate outdated                        \x1b[90m# Check for newer versions\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Project directory (defaults to current directory)
    #[arg(long, short = 'w', global = true, env = "BPLATE_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install a boilerplate
    Add(AddArgs),

    /// Update installed boilerplates
    Update(UpdateArgs),

    /// Check for outdated boilerplates
    Outdated,

    /// Generate shell completions
    Completions(CompletionsArgs),
}
