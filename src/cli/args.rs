//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Use this config file instead of the search path
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//! - `--json`: Print the command result as JSON

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// pagewright - edit, build, and publish Git-backed site content
#[derive(Parser, Debug)]
#[command(name = "pw")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file to load (default: search $PAGEWRIGHT_CONFIG, XDG, ~/.pagewright)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print the command result as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Clone or fast-forward the working copy
    #[command(
        name = "sync",
        long_about = "Clone the publish branch into the working directory, or fetch and \
            fast-forward an existing checkout.\n\n\
            Sync never merges. If the local branch has diverged from the remote, \
            sync fails and 'pw clear-cache' is the way back to a clean state."
    )]
    Sync,

    /// Show a content document
    #[command(
        name = "get",
        after_help = "\
EXAMPLES:
    pw get news/launch
    pw get news/launch.md --json"
    )]
    Get {
        /// Content path relative to the content directory
        path: String,
    },

    /// Edit fields or the body of an existing document
    #[command(
        name = "save",
        long_about = "Apply field edits and an optional new body to an existing document.\n\n\
            Fields you do not name keep their exact bytes, including quoting and \
            comments. The site is rebuilt afterwards unless build.rebuild_on_save \
            is false.",
        after_help = "\
EXAMPLES:
    # Change the title and mark as draft
    pw save news/launch -f title='Launch day' -f draft=true

    # Replace the body from a file
    pw save news/launch --body-file launch.md

VALUES:
    true/false      boolean
    null            null (YAML only)
    42, 1.5         numbers
    [a, b]          list of strings
    anything else   string"
    )]
    Save {
        /// Content path relative to the content directory
        path: String,

        #[command(flatten)]
        edit: EditArgs,
    },

    /// Create a new document
    #[command(
        name = "create",
        after_help = "\
EXAMPLES:
    pw create news/launch -f title='Launch day' --body 'Hello.'"
    )]
    Create {
        /// Content path relative to the content directory
        path: String,

        #[command(flatten)]
        edit: EditArgs,
    },

    /// Build the site from the working copy
    Build,

    /// Commit and push pending content changes
    #[command(
        name = "publish",
        long_about = "Commit every pending change under the content directory and push \
            it to the publish branch.\n\n\
            Publishing with nothing to commit succeeds without creating a commit. \
            If the push is rejected the local commit is rolled back and the changes \
            stay pending; run 'pw sync' and publish again."
    )]
    Publish,

    /// Discard the working copy, clone it again, and rebuild
    #[command(
        name = "clear-cache",
        long_about = "Delete the working copy and the build output, clone the publish \
            branch again, and rebuild.\n\n\
            Unpublished edits are lost."
    )]
    ClearCache,

    /// Find the source document for a site URL
    #[command(
        name = "resolve",
        after_help = "\
EXAMPLES:
    pw resolve /news/launch/
    pw resolve /"
    )]
    Resolve {
        /// URL path on the built site
        url: String,
    },

    /// Manage the stored Git access token
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Show or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
EXAMPLES:
    # Bash
    pw completion bash >> ~/.bashrc

    # Zsh
    pw completion zsh >> ~/.zshrc

    # Fish
    pw completion fish > ~/.config/fish/completions/pw.fish"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Field and body edits shared by `save` and `create`.
#[derive(Args, Debug, Clone, Default)]
pub struct EditArgs {
    /// Set a frontmatter field (repeatable)
    #[arg(short = 'f', long = "field", value_name = "KEY=VALUE")]
    pub fields: Vec<String>,

    /// New body text
    #[arg(long, conflicts_with = "body_file")]
    pub body: Option<String>,

    /// Read the new body from a file ('-' for stdin)
    #[arg(long, value_name = "PATH")]
    pub body_file: Option<PathBuf>,
}

/// Token subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum TokenAction {
    /// Store a token (prompts when --token is omitted)
    Set {
        /// Token value; prefer the prompt to keep it out of shell history
        #[arg(long)]
        token: Option<String>,
    },
    /// Show whether a token is available and where it comes from
    Status,
    /// Remove the stored token
    Clear,
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Write a starter config file
    Init {
        /// Remote repository URL
        #[arg(long)]
        url: String,

        /// Publish branch
        #[arg(long)]
        branch: Option<String>,

        /// Where to write (default: ~/.pagewright/config.toml)
        #[arg(long, value_name = "PATH")]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
