//! CLI module for the gauntlet harness
//!
//! ## Commands
//!
//! - `run` - Run the bundled demo suite against a results file
//! - `check <file>` - Validate a results file and summarize its cases
//! - `--lex <file>` - Dump the tokens of a results file (debug)
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::HarnessConfig;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }

    /// Render a diagnostic with source context as a failure.
    pub fn diagnostic(err: impl miette::Diagnostic + Send + Sync + 'static) -> Self {
        Self::failure(format!("{:?}", miette::Report::new(err)))
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Black-box test harness for registered operations
#[derive(Parser, Debug)]
#[command(name = "gauntlet")]
#[command(version = VERSION)]
#[command(about = "Black-box test harness for registered operations", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    // Debug/development flags
    /// Tokenize a results file only (debug)
    #[arg(long = "lex", value_name = "FILE")]
    pub lex_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the demo suite
    Run(RunArgs),

    /// Validate a results file
    Check {
        /// Results file to validate
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Console,
    Json,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Expected-results file (default: the bundled one)
    #[arg(long, value_name = "FILE")]
    pub results: Option<PathBuf>,
    /// Only run cases whose description contains this text
    #[arg(short = 'k', value_name = "CASE")]
    pub filter: Option<String>,
    /// Only print failures and the summary
    #[arg(short, long)]
    pub quiet: bool,
    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Console)]
    pub format: OutputFormat,
    /// Milliseconds per completion poll
    #[arg(long = "poll-ms", value_name = "MS")]
    pub poll_ms: Option<u64>,
    /// Polls before an invocation is abandoned
    #[arg(long = "polls", value_name = "N")]
    pub polls: Option<u32>,
}

impl RunArgs {
    /// Harness settings for these flags; unset flags keep the defaults.
    pub fn config(&self) -> HarnessConfig {
        let mut config = HarnessConfig::new().with_show_passes(!self.quiet);
        if let Some(ms) = self.poll_ms {
            config = config.with_poll_interval(Duration::from_millis(ms));
        }
        if let Some(polls) = self.polls {
            config = config.with_max_polls(polls);
        }
        config
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    // Handle debug flags first
    if let Some(file) = cli.lex_file {
        return commands::lex_file(&file);
    }

    match cli.command {
        Some(Command::Run(args)) => commands::run_suite(&args),
        Some(Command::Check { file }) => commands::check_file(&file),
        None => Err(CliError::failure("Error: expected a command; see `gauntlet --help`")),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_run_defaults() {
        let cli = Cli::try_parse_from(["gauntlet", "run"]).unwrap();
        let Some(Command::Run(args)) = cli.command else {
            panic!("Expected Run command");
        };
        assert!(args.results.is_none());
        assert_eq!(args.format, OutputFormat::Console);
        assert_eq!(args.config(), HarnessConfig::default());
    }

    #[test]
    fn test_cli_parse_run_flags() {
        let cli = Cli::try_parse_from([
            "gauntlet", "run", "--results", "list.results", "-k", "seeded", "-q", "--format", "json", "--poll-ms",
            "5", "--polls", "20",
        ])
        .unwrap();
        let Some(Command::Run(args)) = cli.command else {
            panic!("Expected Run command");
        };
        assert_eq!(args.filter.as_deref(), Some("seeded"));
        assert_eq!(args.format, OutputFormat::Json);
        let config = args.config();
        assert!(!config.show_passes);
        assert_eq!(config.budget(), Duration::from_millis(100));
    }

    #[test]
    fn test_cli_parse_check() {
        let cli = Cli::try_parse_from(["gauntlet", "check", "list.results"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Check { .. })));
    }

    #[test]
    fn test_cli_parse_debug_flags() {
        let cli = Cli::try_parse_from(["gauntlet", "--lex", "list.results"]).unwrap();
        assert!(cli.lex_file.is_some());
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["gauntlet", "run", "--format", "xml"]).is_err());
    }
}
