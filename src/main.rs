//! bplate - boilerplate manager for AI coding assistants
//!
//! Installs boilerplate bundles (instruction documents, command templates,
//! and skills) from GitHub repositories into a project for one or more
//! assistant targets, and keeps them updated through a lockfile.

use clap::Parser;

mod cli;
mod commands;
mod error;
mod installer;
mod lockfile;
mod manifest;
mod path_utils;
mod prompt;
mod registry;
mod skills;
mod source;
mod target;
mod ui;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Add(args) => commands::add::run(cli.workspace, args),
        Commands::Update(args) => commands::update::run(cli.workspace, args),
        Commands::Outdated => commands::outdated::run(cli.workspace),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
