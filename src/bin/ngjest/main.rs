//! ngjest CLI - Migrate Angular CLI workspaces from Karma to Jest

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands, MessageFormat};
use ngjest::core::{ManifestFormatError, WorkspaceFormatError};
use ngjest::sources::LookupError;
use ngjest::util::diagnostic::{self, Diagnostic};
use ngjest::util::{LocateError, Shell};

/// Options shared by every command.
pub struct GlobalOptions {
    pub shell: Shell,
}

fn main() {
    let cli = Cli::parse();

    let shell = Shell::from_flags(
        cli.quiet,
        cli.verbose,
        cli.color,
        cli.message_format == MessageFormat::Json,
    );

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("ngjest=debug")
    } else {
        EnvFilter::new("ngjest=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let global_opts = GlobalOptions { shell };

    if let Err(e) = run(cli.command, &global_opts) {
        report_error(&e, &global_opts.shell);
        std::process::exit(1);
    }
}

fn run(command: Commands, global_opts: &GlobalOptions) -> Result<()> {
    match command {
        Commands::Migrate(args) => commands::migrate::execute(args, global_opts),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

fn report_error(e: &anyhow::Error, shell: &Shell) {
    if shell.is_json() {
        shell.error(format!("{:#}", e));
        return;
    }

    match to_diagnostic(e) {
        Some(diag) => diagnostic::emit(&diag, shell.use_color()),
        None => eprintln!("error: {:#}", e),
    }
}

/// Render the typed error behind `e`, keeping any outer context.
fn to_diagnostic(e: &anyhow::Error) -> Option<Diagnostic> {
    let (diag, message) = if let Some(err) = e.downcast_ref::<LookupError>() {
        (err.to_diagnostic(), err.to_string())
    } else if let Some(err) = e.downcast_ref::<ManifestFormatError>() {
        (err.to_diagnostic(), err.to_string())
    } else if let Some(err) = e.downcast_ref::<WorkspaceFormatError>() {
        (err.to_diagnostic(), err.to_string())
    } else if let Some(err) = e.downcast_ref::<LocateError>() {
        (err.to_diagnostic(), err.to_string())
    } else {
        return None;
    };

    let outer = e.to_string();
    if outer != message {
        Some(diag.with_context(outer))
    } else {
        Some(diag)
    }
}
