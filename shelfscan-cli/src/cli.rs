// shelfscan-cli/src/cli.rs
//
// Defines the command-line argument structure using clap.

use clap::Parser;
use shelfscan_core::config::DEFAULT_CONFIG_PATH;
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Shelfscan: extract product information from shelf videos",
    long_about = "Samples frames from a video, detects and crops products, reads their \
                  labels with OCR and stores one product record per crop."
)]
pub struct Cli {
    /// Path to the input video file
    #[arg(short = 'i', long = "input", required = true, value_name = "VIDEO")]
    pub input: PathBuf,

    /// Path to the YAML configuration file
    #[arg(short = 'c', long = "config", value_name = "FILE", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Enable debug-level logging
    #[arg(short, long, env = "SHELFSCAN_VERBOSE")]
    pub verbose: bool,

    /// Also write the log to this file
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Keep records in memory instead of writing them to MongoDB
    #[arg(long)]
    pub dry_run: bool,
}
