// shelfscan-cli/src/main.rs
//
// Entry point for the `shelfscan` binary.
//
// Responsibilities:
// - Parsing arguments.
// - Installing the logger.
// - Running the pipeline and printing its summary.
// - Reporting any failure once, in red on stderr, with exit status 1.

use clap::Parser;
use owo_colors::OwoColorize;
use shelfscan_cli::logging::init_logging;
use shelfscan_cli::{Cli, CliResult, report_summary, run_process};
use std::io::IsTerminal;
use std::process::ExitCode;

fn run(cli: &Cli) -> CliResult<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;
    let summary = run_process(cli)?;
    report_summary(&summary);
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if std::io::stderr().is_terminal() {
                eprintln!("{}", e.to_string().red().bold());
            } else {
                eprintln!("{e}");
            }
            ExitCode::FAILURE
        }
    }
}
