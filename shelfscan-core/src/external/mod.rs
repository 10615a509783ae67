// ============================================================================
// shelfscan-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with Decoders, Models and OCR Engines
//
// This module encapsulates everything the pipeline delegates to a black box:
// ffmpeg/ffprobe for decoding, an ONNX object-detection model, and the
// tesseract OCR engine. Each collaborator sits behind a trait so the
// processing stages can be driven by test doubles.
//
// KEY COMPONENTS:
// - FrameDecoder: opens a video and yields decoded RGB frames
// - ObjectDetector: scores bounding boxes on one image
// - OcrEngine: recognizes tokens with per-token confidence
// - Concrete implementations: SidecarDecoder, YoloDetector, TesseractEngine
// - Dependency checking for external executables

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult, command_start_error};
use crate::processing::object_locator::Detection;
use crate::processing::text_extractor::OcrToken;

// ---- External crate imports ----
use image::{DynamicImage, RgbImage};

// ---- Standard library imports ----
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Frame decoding through an ffmpeg child process
pub mod ffmpeg_executor;

/// Container probing with ffprobe
pub mod ffprobe_executor;

/// YOLOv8 inference through ONNX Runtime
pub mod onnx_detector;

/// OCR through the tesseract command-line tool
pub mod tesseract_executor;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use ffmpeg_executor::{SidecarDecoder, SidecarFrames};
pub use ffprobe_executor::{VideoInfo, probe_video};
pub use onnx_detector::YoloDetector;
pub use tesseract_executor::TesseractEngine;

// ============================================================================
// COLLABORATOR TRAITS
// ============================================================================

/// Something that can decode a video into a sequence of RGB frames.
pub trait FrameDecoder {
    type Frames: Iterator<Item = RgbImage>;

    /// Opens the video for sequential decoding.
    ///
    /// Implementations must fail here, before yielding anything, when the
    /// video cannot be opened. The returned iterator ends at end-of-stream.
    fn open(&self, video: &Path) -> CoreResult<Self::Frames>;
}

/// A pretrained object-detection model.
pub trait ObjectDetector {
    /// Returns detections scoring at least `confidence_threshold`, in the
    /// model's native output order.
    fn detect(&self, image: &DynamicImage, confidence_threshold: f32) -> CoreResult<Vec<Detection>>;
}

/// An OCR engine producing per-token text and confidence.
pub trait OcrEngine {
    fn recognize(&self, image_path: &Path) -> CoreResult<Vec<OcrToken>>;
}

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks if a required external command is available and executable.
///
/// Runs `cmd_name version_arg` with output discarded and only looks at
/// whether the process could be started.
///
/// # Returns
///
/// * `Ok(())` - The command started
/// * `Err(CoreError::InvalidInput)` - The command was not found
/// * `Err(CoreError::CommandStart)` - The command exists but failed to start
pub fn check_dependency(cmd_name: &Path, version_arg: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg(version_arg)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {}", cmd_name.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{}' not found.", cmd_name.display());
            Err(CoreError::InvalidInput(format!(
                "Required program '{}' was not found",
                cmd_name.display()
            )))
        }
        Err(e) => {
            log::error!(
                "Failed to start dependency check command '{}': {}",
                cmd_name.display(),
                e
            );
            Err(command_start_error(cmd_name.display().to_string(), e))
        }
    }
}
