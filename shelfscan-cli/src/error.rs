// ============================================================================
// shelfscan-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING: Top-level failures of a run
//
// Every failure is reported once by main.rs. A missing input video is told
// apart from failures inside the pipeline because the two are printed
// differently.

// ---- Internal crate imports ----
use shelfscan_core::CoreError;

// ---- Standard library imports ----
use std::fmt;
use std::path::PathBuf;

/// Type alias for CLI results.
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub enum CliError {
    /// The `--input` path does not exist
    VideoNotFound(PathBuf),
    /// Configuration, setup or pipeline failure
    Processing(CoreError),
    /// The logger could not be installed
    Logging(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::VideoNotFound(path) => {
                write!(f, "Error: Video file not found: {}", path.display())
            }
            CliError::Processing(err) => write!(f, "Error processing video: {err}"),
            CliError::Logging(msg) => write!(f, "Error: Failed to set up logging: {msg}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Processing(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        CliError::Processing(err)
    }
}
