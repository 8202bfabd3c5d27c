//! Output formatting.
//!
//! Every line the user sees goes through [`OutputFormatter`]. Informational
//! lines and successful moves go to the "out" stream, failed moves to the
//! "err" stream. Both are generic writers so tests can capture them.
//! Lines on the err stream are only colored when it is a terminal.

use crate::file_organizer::{FileOutcome, OrganizeReport};
use colored::Colorize;
use std::io::{self, IsTerminal, Stderr, Stdout, Write};
use std::path::Path;

/// Writes user-facing messages to a pair of output streams.
pub struct OutputFormatter<O: Write, E: Write> {
    out: O,
    err: E,
    err_color: bool,
}

impl OutputFormatter<Stdout, Stderr> {
    /// Formatter over the process's stdout and stderr.
    pub fn stdio() -> Self {
        let err_color = io::stderr().is_terminal();
        Self::new(io::stdout(), io::stderr()).with_err_color(err_color)
    }
}

impl<O: Write, E: Write> OutputFormatter<O, E> {
    /// Formatter over arbitrary writers; the err stream starts uncolored.
    pub fn new(out: O, err: E) -> Self {
        Self {
            out,
            err,
            err_color: false,
        }
    }

    pub fn with_err_color(mut self, err_color: bool) -> Self {
        self.err_color = err_color;
        self
    }

    fn write_err(&mut self, line: &str) -> io::Result<()> {
        if self.err_color {
            writeln!(self.err, "{}", line.red())
        } else {
            writeln!(self.err, "{}", line)
        }
    }

    /// Prints the usage line shown when no source directory is given.
    pub fn usage(&mut self, program: &str) -> io::Result<()> {
        writeln!(self.out, "Usage: {} <source_directory>", program)
    }

    pub fn invalid_source(&mut self, path: &Path) -> io::Result<()> {
        writeln!(self.out, "Invalid source directory: {}", path.display())
    }

    pub fn no_files(&mut self) -> io::Result<()> {
        writeln!(self.out, "No files found in the source directory.")
    }

    /// Prints any other fatal error.
    pub fn error(&mut self, message: &str) -> io::Result<()> {
        self.write_err(message)
    }

    /// Prints the line for one processed file.
    ///
    /// ```
    /// use dirsort::file_category::Category;
    /// use dirsort::file_organizer::FileOutcome;
    /// use dirsort::output::OutputFormatter;
    /// use std::path::PathBuf;
    ///
    /// let mut output = OutputFormatter::new(Vec::new(), Vec::new());
    /// output
    ///     .outcome(&FileOutcome::Moved {
    ///         file_name: "song.mp3".into(),
    ///         category: Category::Music,
    ///         destination: PathBuf::from("music/song.mp3"),
    ///     })
    ///     .unwrap();
    /// let (out, _) = output.into_inner();
    /// assert_eq!(String::from_utf8(out).unwrap(), "Moved song.mp3 to music\n");
    /// ```
    pub fn outcome(&mut self, outcome: &FileOutcome) -> io::Result<()> {
        match outcome {
            FileOutcome::Moved { .. } => writeln!(self.out, "{}", outcome),
            FileOutcome::MoveFailed { .. } => self.write_err(&outcome.to_string()),
        }
    }

    /// Prints a per-category table of moved files followed by totals.
    pub fn summary_table(&mut self, report: &OrganizeReport) -> io::Result<()> {
        let counts = report.category_counts();
        writeln!(self.out)?;
        writeln!(self.out, "{}", "SUMMARY".bold())?;

        let width = counts
            .keys()
            .map(|category| category.dir_name().len())
            .max()
            .unwrap_or(0)
            .max("Category".len());

        writeln!(self.out, "{:<width$} | Files", "Category", width = width)?;
        writeln!(self.out, "{}", "-".repeat(width + 10))?;
        for (category, count) in &counts {
            writeln!(
                self.out,
                "{:<width$} | {} {}",
                category.dir_name(),
                count,
                plural(*count),
                width = width
            )?;
        }
        writeln!(self.out, "{}", "-".repeat(width + 10))?;
        writeln!(
            self.out,
            "{:<width$} | {} {}",
            "Moved",
            report.moved_count(),
            plural(report.moved_count()),
            width = width
        )?;
        writeln!(
            self.out,
            "{:<width$} | {} {}",
            "Failed",
            report.failed_count(),
            plural(report.failed_count()),
            width = width
        )?;
        writeln!(
            self.out,
            "{:<width$} | {} {}",
            "Skipped",
            report.unclassified,
            plural(report.unclassified),
            width = width
        )
    }

    /// Prints the whole report as pretty JSON.
    pub fn json_report(&mut self, report: &OrganizeReport) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut self.out, report)?;
        writeln!(self.out)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()?;
        self.err.flush()
    }

    /// Returns the underlying writers.
    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
