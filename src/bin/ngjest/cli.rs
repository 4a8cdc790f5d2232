//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell as CompletionShell;

use ngjest::util::ColorChoice;

/// ngjest - Migrate an Angular CLI workspace from Karma to Jest
#[derive(Parser)]
#[command(name = "ngjest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Print errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    pub color: ColorChoice,

    /// Output format for messages
    #[arg(long, global = true, value_enum, default_value_t = MessageFormat::Human)]
    pub message_format: MessageFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replace Karma with Jest in package.json and angular.json
    Migrate(MigrateArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MessageFormat {
    /// Status lines on stderr
    Human,
    /// One JSON event per line on stdout
    Json,
}

#[derive(Args)]
pub struct MigrateArgs {
    /// Run every step but do not write any file
    #[arg(long)]
    pub dry_run: bool,

    /// npm registry to look up latest versions in
    #[arg(long, env = "NGJEST_REGISTRY", value_name = "URL")]
    pub registry: Option<String>,

    /// Directory holding angular.json and package.json (defaults to searching
    /// upward from the current directory)
    #[arg(long, value_name = "DIR")]
    pub workspace_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: CompletionShell,
}
