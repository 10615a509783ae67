// ============================================================================
// shelfscan-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: Frame Decoding via an FFmpeg Child Process
//
// SidecarDecoder spawns ffmpeg with raw rgb24 output and turns the
// OutputFrame events reported by ffmpeg-sidecar into RgbImage values, one per
// decoded frame, in decode order.

use crate::error::{CoreError, CoreResult, command_start_error};
use crate::external::FrameDecoder;
use crate::external::ffprobe_executor::probe_video;
use ffmpeg_sidecar::child::FfmpegChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use ffmpeg_sidecar::iter::FfmpegIterator;
use crate::utils::format_duration;
use image::RgbImage;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// `FrameDecoder` backed by the ffmpeg binary.
#[derive(Debug, Clone, Default)]
pub struct SidecarDecoder;

impl SidecarDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl FrameDecoder for SidecarDecoder {
    type Frames = SidecarFrames;

    fn open(&self, video: &Path) -> CoreResult<SidecarFrames> {
        // Probing first keeps "cannot open" a synchronous error
        let info = probe_video(video)?;
        log::debug!(
            "Decoding {} ({}x{}, {} frames reported, duration {})",
            video.display(),
            info.width,
            info.height,
            info.total_frames
                .map_or_else(|| "unknown".to_string(), |n| n.to_string()),
            info.duration_secs
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
                .map_or_else(|| "unknown".to_string(), format_duration)
        );

        let mut cmd = FfmpegCommand::new();
        cmd.hide_banner();
        cmd.input(video.to_string_lossy().as_ref());
        cmd.rawvideo();

        log::debug!("Running frame decode command: {:?}", cmd);

        let mut child = cmd
            .spawn()
            .map_err(|e| command_start_error("ffmpeg (frame decode)", e))?;
        let events = child.iter().map_err(|e| {
            CoreError::OperationFailed(format!("Failed to read ffmpeg output: {e}"))
        })?;

        Ok(SidecarFrames {
            child,
            events,
            video: video.to_path_buf(),
            finished: false,
        })
    }
}

/// Decoded frames of one running ffmpeg process.
pub struct SidecarFrames {
    child: FfmpegChild,
    events: FfmpegIterator,
    video: PathBuf,
    finished: bool,
}

impl SidecarFrames {
    fn finish(&mut self) {
        self.finished = true;
        match self.child.wait() {
            Ok(status) if !status.success() => log::warn!(
                "ffmpeg exited with {} while decoding {}; treating as end of stream",
                status,
                self.video.display()
            ),
            Ok(_) => log::debug!("Decoder finished for {}", self.video.display()),
            Err(e) => log::warn!("Failed to wait for ffmpeg: {}", e),
        }
    }
}

impl Iterator for SidecarFrames {
    type Item = RgbImage;

    fn next(&mut self) -> Option<RgbImage> {
        if self.finished {
            return None;
        }

        while let Some(event) = self.events.next() {
            match event {
                FfmpegEvent::OutputFrame(frame) => {
                    let (width, height) = (frame.width, frame.height);
                    match RgbImage::from_raw(width, height, frame.data) {
                        Some(image) => return Some(image),
                        None => {
                            log::warn!(
                                "Discarding short frame buffer ({}x{}) from {}",
                                width,
                                height,
                                self.video.display()
                            );
                            let _ = self.child.kill();
                            break;
                        }
                    }
                }
                FfmpegEvent::Log(LogLevel::Error, msg)
                | FfmpegEvent::Log(LogLevel::Fatal, msg)
                | FfmpegEvent::Error(msg) => log::debug!("ffmpeg: {}", msg),
                _ => {}
            }
        }

        self.finish();
        None
    }
}

impl Drop for SidecarFrames {
    fn drop(&mut self) {
        if !self.finished {
            // Abandoned mid-stream
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}
