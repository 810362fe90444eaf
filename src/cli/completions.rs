use clap::Parser;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    bplate completions bash > ~/.bash_completion.d/bplate\n\n\
                  Generate zsh completions:\n    bplate completions zsh > ~/.zfunc/_bplate\n\n\
                  Generate fish completions:\n    bplate completions fish > ~/.config/fish/completions/bplate.fish")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    pub shell: String,
}
