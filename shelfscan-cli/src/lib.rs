// shelfscan-cli/src/lib.rs
//
// Library portion of the Shelfscan CLI application.
// Contains argument definitions, logging setup and command logic.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;

// Re-export items needed by the binary or integration tests
pub use cli::Cli;
pub use commands::process::{report_summary, run_process};
pub use error::{CliError, CliResult};
