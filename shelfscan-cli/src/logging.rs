// ============================================================================
// shelfscan-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: Console and File Log Dispatch
//
// The core library only talks to the `log` facade. This module installs a
// fern dispatcher that writes every record to stdout and, when requested,
// to a log file as well.
//
// KEY COMPONENTS:
// - init_logging: installs the global logger
// - Console format: `HH:MM:SS LEVEL message`, level coloured on terminals
// - File format: `YYYY-mm-dd HH:MM:SS [LEVEL] message`, never coloured

// ---- Internal crate imports ----
use crate::error::{CliError, CliResult};

// ---- External crate imports ----
use log::{Level, LevelFilter};
use owo_colors::OwoColorize;

// ---- Standard library imports ----
use std::io::IsTerminal;
use std::path::Path;

/// Selects the level filter for the `--verbose` flag.
pub fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Fixed-width level label used in both console and file output.
fn level_label(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARN ",
        Level::Info => "INFO ",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}

fn colored_label(level: Level) -> String {
    let label = level_label(level);
    match level {
        Level::Error => label.bright_red().to_string(),
        Level::Warn => label.yellow().to_string(),
        Level::Info => label.green().to_string(),
        Level::Debug => label.blue().to_string(),
        Level::Trace => label.magenta().to_string(),
    }
}

/// Installs the global logger.
///
/// Dependencies that log through the facade (the MongoDB driver, ONNX
/// Runtime bindings) are capped at `warn` unless `verbose` is set.
pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> CliResult<()> {
    let level = level_for(verbose);
    let use_color = std::io::stdout().is_terminal();

    let console = fern::Dispatch::new()
        .format(move |out, message, record| {
            let label = if use_color {
                colored_label(record.level())
            } else {
                level_label(record.level()).to_string()
            };
            out.finish(format_args!(
                "{} {} {}",
                chrono::Local::now().format("%H:%M:%S"),
                label,
                message
            ))
        })
        .chain(std::io::stdout());

    let mut dispatch = fern::Dispatch::new()
        .level(if verbose { level } else { LevelFilter::Warn })
        .level_for("shelfscan_core", level)
        .level_for("shelfscan_cli", level)
        .level_for("shelfscan", level)
        .chain(console);

    if let Some(path) = log_file {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                CliError::Logging(format!("cannot create {}: {e}", parent.display()))
            })?;
        }
        let file = fern::log_file(path)
            .map_err(|e| CliError::Logging(format!("cannot open {}: {e}", path.display())))?;

        dispatch = dispatch.chain(
            fern::Dispatch::new()
                .format(|out, message, record| {
                    out.finish(format_args!(
                        "{} [{}] {}",
                        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                        level_label(record.level()).trim_end(),
                        message
                    ))
                })
                .chain(file),
        );
    }

    dispatch
        .apply()
        .map_err(|e| CliError::Logging(e.to_string()))?;

    log::debug!("Logger initialized with level: {}", level);
    Ok(())
}
