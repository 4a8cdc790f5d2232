//! Terminal output for the CLI.
//!
//! Human output is one right-aligned status word per line on stderr, plus a
//! progress bar while registry lookups are in flight. With
//! `--message-format=json` the human lines are suppressed and migration
//! events go to stdout, one JSON object per line.

use std::fmt::Display;
use std::io::{self, IsTerminal, Write};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

/// Color output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Color when stderr is a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl std::str::FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            _ => Err(format!(
                "invalid color choice '{}'; expected 'auto', 'always' or 'never'",
                s
            )),
        }
    }
}

/// The word printed in front of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Added,
    Updated,
    Removed,
    Migrated,
    Finished,
    Resolved,
    Writing,
    Note,
    Skipped,
    Warning,
    Error,
}

impl Status {
    fn as_str(&self) -> &'static str {
        match self {
            Status::Added => "Added",
            Status::Updated => "Updated",
            Status::Removed => "Removed",
            Status::Migrated => "Migrated",
            Status::Finished => "Finished",
            Status::Resolved => "Resolved",
            Status::Writing => "Writing",
            Status::Note => "Note",
            Status::Skipped => "Skipped",
            Status::Warning => "Warning",
            Status::Error => "error",
        }
    }

    fn color_code(&self) -> &'static str {
        match self {
            Status::Added
            | Status::Updated
            | Status::Removed
            | Status::Migrated
            | Status::Finished => "\x1b[1;32m",
            Status::Resolved | Status::Writing => "\x1b[1;36m",
            Status::Note => "\x1b[1;34m",
            Status::Skipped | Status::Warning => "\x1b[1;33m",
            Status::Error => "\x1b[1;31m",
        }
    }
}

/// Width the status word is right-aligned to.
const STATUS_WIDTH: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Quiet,
    Normal,
    Verbose,
    Json,
}

/// Where and how the CLI reports what it does.
#[derive(Debug)]
pub struct Shell {
    mode: Mode,
    use_color: bool,
}

impl Shell {
    /// Build a shell from the global flags.
    ///
    /// JSON output wins over `--quiet` and `--verbose`.
    pub fn from_flags(quiet: bool, verbose: bool, color: ColorChoice, json: bool) -> Self {
        let mode = match (json, quiet, verbose) {
            (true, _, _) => Mode::Json,
            (false, true, _) => Mode::Quiet,
            (false, false, true) => Mode::Verbose,
            (false, false, false) => Mode::Normal,
        };
        let use_color = mode != Mode::Json
            && match color {
                ColorChoice::Auto => io::stderr().is_terminal(),
                ColorChoice::Always => true,
                ColorChoice::Never => false,
            };

        Shell { mode, use_color }
    }

    pub fn is_json(&self) -> bool {
        self.mode == Mode::Json
    }

    /// Whether stderr output is colored.
    pub fn use_color(&self) -> bool {
        self.use_color
    }

    /// Print `{status:>12} {msg}` to stderr.
    ///
    /// Nothing is printed in JSON mode; quiet mode prints errors only.
    pub fn status(&self, status: Status, msg: impl Display) {
        match self.mode {
            Mode::Json => {}
            Mode::Quiet if status != Status::Error => {}
            _ => eprintln!("{} {}", self.format_status(status), msg),
        }
    }

    pub fn note(&self, msg: impl Display) {
        self.status(Status::Note, msg);
    }

    pub fn warn(&self, msg: impl Display) {
        self.status(Status::Warning, msg);
    }

    /// Report a failure; an `error` event in JSON mode.
    pub fn error(&self, msg: impl Display) {
        if self.is_json() {
            self.json_event(&serde_json::json!({
                "reason": "error",
                "message": msg.to_string(),
            }));
        } else {
            self.status(Status::Error, msg);
        }
    }

    /// Print one event as a line of JSON on stdout. No-op outside JSON mode.
    pub fn json_event<T: Serialize + ?Sized>(&self, event: &T) {
        if !self.is_json() {
            return;
        }

        let line = match serde_json::to_string(event) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("dropping event that failed to serialize: {}", e);
                return;
            }
        };
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{}", line);
        let _ = stdout.flush();
    }

    /// Print the closing `Finished ... in 0.42s` line.
    pub fn finished(&self, msg: impl Display, elapsed: Duration) {
        self.status(
            Status::Finished,
            format!("{} in {}", msg, format_duration(elapsed)),
        );
    }

    /// Track `total` registry lookups.
    pub fn lookup_progress(&self, total: usize) -> LookupProgress<'_> {
        LookupProgress::new(self, total)
    }

    fn format_status(&self, status: Status) -> String {
        if self.use_color {
            format!(
                "{}{:>width$}\x1b[0m",
                status.color_code(),
                status.as_str(),
                width = STATUS_WIDTH
            )
        } else {
            format!("{:>width$}", status.as_str(), width = STATUS_WIDTH)
        }
    }
}

/// Progress of the concurrent registry lookups.
///
/// Normal mode draws a bar when there is more than one lookup; verbose mode
/// prints a line per resolved package instead.
pub struct LookupProgress<'a> {
    shell: &'a Shell,
    bar: Option<ProgressBar>,
    resolved: usize,
    total: usize,
}

impl<'a> LookupProgress<'a> {
    fn new(shell: &'a Shell, total: usize) -> Self {
        let bar = (shell.mode == Mode::Normal && total > 1).then(|| {
            let bar = ProgressBar::new(total as u64);
            let style = ProgressStyle::default_bar()
                .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-");
            bar.set_style(style);
            bar.set_message("Resolving");
            bar
        });

        LookupProgress {
            shell,
            bar,
            resolved: 0,
            total,
        }
    }

    /// Record one finished lookup.
    pub fn resolved(&mut self, name: &str, version: &str) {
        self.resolved += 1;

        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
        if self.shell.mode == Mode::Verbose {
            self.shell.status(
                Status::Resolved,
                format!("{} {} [{}/{}]", name, version, self.resolved, self.total),
            );
        }
    }

    /// Print a status line above the bar.
    pub fn println(&self, status: Status, msg: impl Display) {
        match &self.bar {
            Some(bar) => bar.suspend(|| self.shell.status(status, msg)),
            None => self.shell.status(status, msg),
        }
    }

    /// Clear the bar.
    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 60.0 {
        format!("{:.2}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}
