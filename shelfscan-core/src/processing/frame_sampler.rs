//! Fixed-interval frame sampling.
//!
//! Decodes a video from frame 0 and keeps every frame whose decode index is
//! divisible by the configured interval, writing each kept frame as
//! `frame_NNNN.jpg` with contiguous numbering from 0.

use crate::config::VideoConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::FrameDecoder;
use crate::utils::{frame_path, save_jpeg};
use std::path::{Path, PathBuf};

/// Writes every Nth decoded frame of a video to an output directory.
#[derive(Debug, Clone)]
pub struct FrameSampler<D: FrameDecoder> {
    decoder: D,
    output_dir: PathBuf,
    interval: u32,
}

impl<D: FrameDecoder> FrameSampler<D> {
    /// Creates a sampler from the `video_processing` configuration section.
    pub fn new(decoder: D, config: &VideoConfig) -> CoreResult<Self> {
        Self::with_settings(decoder, config.output_dir.clone(), config.frame_interval)
    }

    /// Creates a sampler with an explicit output directory and interval.
    ///
    /// Returns `CoreError::Config` when `interval` is zero.
    pub fn with_settings(decoder: D, output_dir: PathBuf, interval: u32) -> CoreResult<Self> {
        if interval == 0 {
            return Err(CoreError::Config(
                "frame interval must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            decoder,
            output_dir,
            interval,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// Samples `video` and returns the written frame paths in order.
    ///
    /// Fails with `CoreError::InvalidInput` before touching the filesystem
    /// when the decoder cannot open the video.
    pub fn extract_frames(&self, video: &Path) -> CoreResult<Vec<PathBuf>> {
        let frames = self.decoder.open(video)?;

        std::fs::create_dir_all(&self.output_dir)?;

        let interval = self.interval as usize;
        let mut frame_paths = Vec::new();
        for (decode_index, frame) in frames.enumerate() {
            if decode_index % interval != 0 {
                continue;
            }
            let path = frame_path(&self.output_dir, frame_paths.len());
            save_jpeg(&frame, &path)?;
            log::trace!("Wrote frame {} as {}", decode_index, path.display());
            frame_paths.push(path);
        }

        log::debug!(
            "Sampled {} frame(s) from {} at interval {}",
            frame_paths.len(),
            video.display(),
            self.interval
        );
        Ok(frame_paths)
    }
}
