use clap::Parser;
use dirsort::cli::{Cli, run};
use dirsort::logging::init_logging;
use dirsort::output::OutputFormatter;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Err(e) = init_logging(cli.verbose, !cli.no_color) {
        eprintln!("Error: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(&cli, &mut OutputFormatter::stdio()) {
        Ok(status) => status.into(),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
