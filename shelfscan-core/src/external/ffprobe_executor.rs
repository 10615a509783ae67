//! FFprobe integration for checking that a video can be opened.
//!
//! The frame sampler probes its input before spawning the decoder so an
//! unreadable or stream-less file fails before anything is written.

use crate::error::{CoreError, CoreResult};
use ffprobe::{FfProbeError, ffprobe};
use std::path::Path;

/// Basic properties of the first video stream.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    /// Container duration in seconds, when reported
    pub duration_secs: Option<f64>,
    /// Frame count from `nb_frames`, when reported
    pub total_frames: Option<u64>,
}

/// Probes `input_path` and returns its video stream properties.
pub fn probe_video(input_path: &Path) -> CoreResult<VideoInfo> {
    log::debug!(
        "Running ffprobe (via crate) for video info on: {}",
        input_path.display()
    );

    let metadata = ffprobe(input_path).map_err(|err| {
        log::error!("ffprobe failed on {}: {:?}", input_path.display(), err);
        map_ffprobe_error(err, input_path)
    })?;

    let video_stream = metadata
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| {
            CoreError::InvalidInput(format!(
                "Could not open video file: {} (no video stream)",
                input_path.display()
            ))
        })?;

    let width = video_stream.width.unwrap_or(0).max(0) as u32;
    let height = video_stream.height.unwrap_or(0).max(0) as u32;

    Ok(VideoInfo {
        width,
        height,
        duration_secs: metadata
            .format
            .duration
            .as_deref()
            .and_then(|d| d.parse::<f64>().ok()),
        total_frames: video_stream
            .nb_frames
            .as_deref()
            .and_then(|f| f.parse::<u64>().ok()),
    })
}

fn map_ffprobe_error(err: FfProbeError, input_path: &Path) -> CoreError {
    match err {
        FfProbeError::Io(io_err) => CoreError::CommandStart("ffprobe".to_string(), io_err),
        FfProbeError::Status(output) => CoreError::InvalidInput(format!(
            "Could not open video file: {} ({})",
            input_path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )),
        other => CoreError::InvalidInput(format!(
            "Could not open video file: {} ({:?})",
            input_path.display(),
            other
        )),
    }
}
