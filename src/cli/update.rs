use clap::Parser;

/// Arguments for the update command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                   Update all installed boilerplates:\n    bplate update\n\n\
                   Update one package:\n    bplate update acme/rust-starter\n\n\
                   Preview without writing files:\n    bplate update --dry-run")]
pub struct UpdateArgs {
    /// Package to update, as owner/repo (defaults to all installed packages)
    pub package: Option<String>,

    /// Skip all prompts and use defaults
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Preview update without writing files
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn test_cli_parsing_update_with_options() {
        let cli = Cli::try_parse_from(["bplate", "update", "acme/rust-starter", "-y", "--dry-run"])
            .unwrap();
        match cli.command {
            Commands::Update(args) => {
                assert_eq!(args.package, Some("acme/rust-starter".to_string()));
                assert!(args.yes);
                assert!(args.dry_run);
            }
            _ => panic!("Expected Update command"),
        }
    }
}
