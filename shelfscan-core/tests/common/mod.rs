// shelfscan-core/tests/common/mod.rs
//
// Test doubles for the external collaborators, shared by the integration
// tests. None of them need ffmpeg, a model file, tesseract or MongoDB.

#![allow(dead_code)]

use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use shelfscan_core::error::{CoreError, CoreResult};
use shelfscan_core::external::{FrameDecoder, ObjectDetector, OcrEngine};
use shelfscan_core::processing::{BoundingBox, Detection, OcrToken};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const FRAME_WIDTH: u32 = 64;
pub const FRAME_HEIGHT: u32 = 48;

/// Creates a placeholder file standing in for a video container.
pub fn create_dummy_video(dir: &Path, filename: &str) -> PathBuf {
    let path = dir.join(filename);
    let mut file = File::create(&path).expect("Failed to create dummy video");
    file.write_all(b"not really a video").expect("Failed to write dummy video");
    path
}

/// Decoder yielding `frame_count` black frames; frames listed in
/// `marked_frames` carry a white square at a fixed position.
#[derive(Debug, Clone)]
pub struct SyntheticDecoder {
    pub frame_count: usize,
    pub marked_frames: Vec<usize>,
}

impl SyntheticDecoder {
    pub fn new(frame_count: usize) -> Self {
        Self {
            frame_count,
            marked_frames: Vec::new(),
        }
    }

    pub fn with_marked_frames(frame_count: usize, marked_frames: &[usize]) -> Self {
        Self {
            frame_count,
            marked_frames: marked_frames.to_vec(),
        }
    }
}

impl FrameDecoder for SyntheticDecoder {
    type Frames = std::vec::IntoIter<RgbImage>;

    fn open(&self, video: &Path) -> CoreResult<Self::Frames> {
        if !video.is_file() {
            return Err(CoreError::InvalidInput(format!(
                "Could not open video file: {}",
                video.display()
            )));
        }

        let frames: Vec<RgbImage> = (0..self.frame_count)
            .map(|index| {
                let mut frame = RgbImage::from_pixel(FRAME_WIDTH, FRAME_HEIGHT, Rgb([0, 0, 0]));
                if self.marked_frames.contains(&index) {
                    for y in 16..32 {
                        for x in 24..40 {
                            frame.put_pixel(x, y, Rgb([255, 255, 255]));
                        }
                    }
                }
                frame
            })
            .collect();
        Ok(frames.into_iter())
    }
}

/// Reports the bounding box of bright pixels as a single detection.
#[derive(Debug, Clone, Copy)]
pub struct BrightSpotDetector {
    pub confidence: f32,
}

impl ObjectDetector for BrightSpotDetector {
    fn detect(&self, image: &DynamicImage, confidence_threshold: f32) -> CoreResult<Vec<Detection>> {
        if self.confidence < confidence_threshold {
            return Ok(Vec::new());
        }

        let luma = image.to_luma8();
        let bright: Vec<(u32, u32)> = luma
            .enumerate_pixels()
            .filter(|(_, _, p)| p[0] > 200)
            .map(|(x, y, _)| (x, y))
            .collect();
        if bright.is_empty() {
            return Ok(Vec::new());
        }

        let x1 = bright.iter().map(|p| p.0).min().unwrap_or(0) as i32;
        let y1 = bright.iter().map(|p| p.1).min().unwrap_or(0) as i32;
        let x2 = bright.iter().map(|p| p.0).max().unwrap_or(0) as i32 + 1;
        let y2 = bright.iter().map(|p| p.1).max().unwrap_or(0) as i32 + 1;

        Ok(vec![Detection {
            bbox: BoundingBox::new(x1, y1, x2, y2),
            confidence: self.confidence,
        }])
    }
}

/// Returns the same detections for every image, filtered by threshold,
/// and remembers the dimensions of every image it saw.
#[derive(Debug, Default)]
pub struct FixedDetector {
    pub detections: Vec<Detection>,
    pub seen: Mutex<Vec<(u32, u32)>>,
}

impl FixedDetector {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self {
            detections,
            seen: Mutex::new(Vec::new()),
        }
    }
}

impl ObjectDetector for FixedDetector {
    fn detect(&self, image: &DynamicImage, confidence_threshold: f32) -> CoreResult<Vec<Detection>> {
        self.seen.lock().unwrap().push(image.dimensions());
        Ok(self
            .detections
            .iter()
            .filter(|d| d.confidence >= confidence_threshold)
            .copied()
            .collect())
    }
}

/// Detector that always fails.
pub struct BrokenDetector;

impl ObjectDetector for BrokenDetector {
    fn detect(&self, _image: &DynamicImage, _confidence_threshold: f32) -> CoreResult<Vec<Detection>> {
        Err(CoreError::Detection("model exploded".to_string()))
    }
}

/// OCR engine returning fixed tokens and recording the images it was given.
#[derive(Debug, Default)]
pub struct ScriptedOcr {
    pub tokens: Vec<OcrToken>,
    pub calls: Mutex<Vec<PathBuf>>,
}

impl ScriptedOcr {
    pub fn new(tokens: Vec<OcrToken>) -> Self {
        Self {
            tokens,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl OcrEngine for ScriptedOcr {
    fn recognize(&self, image_path: &Path) -> CoreResult<Vec<OcrToken>> {
        self.calls.lock().unwrap().push(image_path.to_path_buf());
        Ok(self.tokens.clone())
    }
}

/// OCR engine that always fails.
pub struct FailingOcr;

impl OcrEngine for FailingOcr {
    fn recognize(&self, image_path: &Path) -> CoreResult<Vec<OcrToken>> {
        Err(CoreError::Ocr(format!(
            "engine crashed on {}",
            image_path.display()
        )))
    }
}

/// Writes a solid-colour JPEG test image.
pub fn write_test_image(path: &Path, width: u32, height: u32) {
    let image = RgbImage::from_pixel(width, height, Rgb([120, 60, 30]));
    shelfscan_core::utils::save_jpeg(&image, path).expect("Failed to write test image");
}
