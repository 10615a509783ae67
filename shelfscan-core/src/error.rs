//! Error types for the shelfscan-core library.
//!
//! Every fallible operation in the crate returns [`CoreResult`]. External
//! processes (ffmpeg, tesseract) report failures through the helper
//! constructors at the bottom of this module so their messages look alike.

use std::process::ExitStatus;
use thiserror::Error;

/// Custom error types for shelfscan
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to start {0}: {1}")]
    CommandStart(String, std::io::Error),

    #[error("{0} exited with {1}: {2}")]
    CommandFailed(String, ExitStatus, String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Object detection failed: {0}")]
    Detection(String),

    #[error("OCR failed: {0}")]
    Ocr(String),

    #[error("Store operation failed: {0}")]
    Store(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

/// Result type for shelfscan operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

impl From<mongodb::error::Error> for CoreError {
    fn from(err: mongodb::error::Error) -> Self {
        CoreError::Store(err.to_string())
    }
}

pub(crate) fn command_start_error(cmd: impl Into<String>, err: std::io::Error) -> CoreError {
    CoreError::CommandStart(cmd.into(), err)
}

pub(crate) fn command_failed_error(
    cmd: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed(cmd.into(), status, stderr.into())
}
