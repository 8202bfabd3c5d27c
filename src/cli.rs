//! Command-line interface.
//!
//! Parses arguments, builds the category table, runs the organizer and
//! reports through [`OutputFormatter`].

use crate::file_category::CategoryTable;
use crate::file_organizer::{OrganizeError, Organizer};
use crate::output::OutputFormatter;
use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

/// Sort the files of a directory into category subdirectories by extension.
#[derive(Debug, Parser)]
#[command(name = "dirsort", version, about)]
pub struct Cli {
    /// Directory whose files are sorted
    #[arg(value_name = "SOURCE")]
    pub source: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Print a per-category summary after the run
    #[arg(long)]
    pub summary: bool,

    /// Increase diagnostic logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per moved or failed file
    Text,
    /// A single JSON report
    Json,
}

/// How a run ended, mapped to the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// The listing was processed; individual moves may still have failed.
    Completed,
    /// No source directory was given.
    Usage,
    /// The source was not a directory or could not be listed.
    Failed,
}

impl RunStatus {
    pub fn code(self) -> u8 {
        match self {
            RunStatus::Completed => 0,
            RunStatus::Failed => 1,
            RunStatus::Usage => 2,
        }
    }
}

impl From<RunStatus> for ExitCode {
    fn from(status: RunStatus) -> Self {
        ExitCode::from(status.code())
    }
}

/// Runs one organize pass as described by `cli`.
///
/// Errors are only returned when writing to `output` fails; every
/// organizing failure is reported through `output` and the returned status.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use dirsort::cli::{Cli, run};
/// use dirsort::output::OutputFormatter;
///
/// let cli = Cli::parse_from(["dirsort", "/home/me/Downloads"]);
/// let status = run(&cli, &mut OutputFormatter::stdio())?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn run<O: Write, E: Write>(
    cli: &Cli,
    output: &mut OutputFormatter<O, E>,
) -> anyhow::Result<RunStatus> {
    let Some(source) = cli.source.as_deref() else {
        output.usage("dirsort").context("writing usage")?;
        return Ok(RunStatus::Usage);
    };

    let organizer = Organizer::new(CategoryTable::standard());
    let text = cli.format == OutputFormat::Text;

    let mut write_result: std::io::Result<()> = Ok(());
    let result = organizer.organize_with(source, |outcome| {
        if text && write_result.is_ok() {
            write_result = output.outcome(outcome);
        }
    });
    write_result.context("writing outcome")?;

    let report = match result {
        Ok(report) => report,
        Err(OrganizeError::InvalidSource { path }) => {
            output.invalid_source(&path)?;
            return Ok(RunStatus::Failed);
        }
        Err(e @ OrganizeError::ListFailed { .. }) => {
            output.error(&e.to_string())?;
            return Ok(RunStatus::Failed);
        }
    };

    if report.is_empty_source() {
        output.no_files()?;
    }
    match cli.format {
        OutputFormat::Text if cli.summary => output.summary_table(&report)?,
        OutputFormat::Text => {}
        OutputFormat::Json => output.json_report(&report)?,
    }
    output.flush()?;

    Ok(RunStatus::Completed)
}
