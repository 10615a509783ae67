//! Command implementations for the CLI.

/// Runs the extraction pipeline over one video.
pub mod process;
