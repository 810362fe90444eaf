use clap::Parser;

/// Arguments for the add command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                   Install a boilerplate:\n    bplate add acme/rust-starter\n\n\
                   Install without prompts:\n    bplate add acme/rust-starter --yes\n\n\
                   Preview without writing files:\n    bplate add acme/rust-starter --dry-run")]
pub struct AddArgs {
    /// Package to install, as owner/repo
    pub package: String,

    /// Skip all prompts and use defaults
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Preview install without writing files
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn test_cli_parsing_add_with_options() {
        let cli =
            Cli::try_parse_from(["bplate", "add", "acme/rust-starter", "--yes", "--dry-run"])
                .unwrap();
        match cli.command {
            Commands::Add(args) => {
                assert_eq!(args.package, "acme/rust-starter");
                assert!(args.yes);
                assert!(args.dry_run);
            }
            _ => panic!("Expected Add command"),
        }
    }

    #[test]
    fn test_cli_parsing_add_short_yes() {
        let cli = Cli::try_parse_from(["bplate", "add", "acme/rust-starter", "-y"]).unwrap();
        match cli.command {
            Commands::Add(args) => assert!(args.yes),
            _ => panic!("Expected Add command"),
        }
    }
}
