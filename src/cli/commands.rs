//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::io::{self, Write};
use std::path::Path;

use gauntlet_markup::{ResultsFile, dump_tokens};

use crate::demos;
use crate::engine::{Engine, RunReport};
use crate::report::{ConsoleReporter, JsonReporter};

use super::{CliError, CliResult, ExitCode, OutputFormat, RunArgs};

/// Run the demo suite and report every comparison.
///
/// Exits with a failure code when any comparison failed or any case was aborted.
pub fn run_suite(args: &RunArgs) -> CliResult<ExitCode> {
    let results = match &args.results {
        Some(path) => ResultsFile::load(path).map_err(CliError::diagnostic)?,
        None => demos::bundled_results(),
    };
    let mut cases = demos::suite(&results).map_err(CliError::diagnostic)?;
    if let Some(filter) = &args.filter {
        cases.retain(|case| case.description().contains(filter.as_str()));
        if cases.is_empty() {
            return Err(CliError::failure(format!("Error: no case matches `{}`", filter)));
        }
    }

    let engine = Engine::new(args.config());
    let out = io::stdout().lock();
    let run = match args.format {
        OutputFormat::Console => {
            let mut reporter = ConsoleReporter::new(out, engine.config().show_passes);
            let run = engine.run_all(&cases, &mut reporter);
            drop(reporter.finish().map_err(write_error)?);
            run
        }
        OutputFormat::Json => {
            let mut reporter = JsonReporter::new(out);
            let run = engine.run_all(&cases, &mut reporter);
            drop(reporter.finish().map_err(write_error)?);
            run
        }
    };
    Ok(exit_code(&run))
}

fn exit_code(run: &RunReport) -> ExitCode {
    if run.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn write_error(err: io::Error) -> CliError {
    CliError::failure(format!("Error writing report: {}", err))
}

/// Parse every case of a results file and print a per-case summary.
pub fn check_file(path: &Path) -> CliResult<ExitCode> {
    let file = ResultsFile::load(path).map_err(CliError::diagnostic)?;
    let summary = summarize(&file).map_err(CliError::diagnostic)?;
    print!("{}", summary);
    Ok(ExitCode::SUCCESS)
}

/// One line per case: section count and value count.
pub fn summarize(file: &ResultsFile) -> Result<String, gauntlet_markup::MarkupError> {
    let mut out = String::new();
    for case in file.read_all()? {
        let values: usize = case.iter().map(|section| section.values.len()).sum();
        out.push_str(&format!("{}: {} section(s), {} value(s)\n", case.name, case.len(), values));
    }
    out.push_str(&format!("✓ {} is well-formed\n", file.name()));
    Ok(out)
}

/// Dump the tokens of a results file.
pub fn lex_file(path: &Path) -> CliResult<ExitCode> {
    let file = ResultsFile::load(path).map_err(CliError::diagnostic)?;
    let mut out = io::stdout().lock();
    out.write_all(dump_tokens(file.tokens()).as_bytes())
        .map_err(|e| CliError::failure(format!("Error writing tokens: {}", e)))?;
    Ok(ExitCode::SUCCESS)
}
