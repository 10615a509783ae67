//! Object detection and cropping.
//!
//! The locator runs the configured [`ObjectDetector`] over one frame and,
//! for `crop_objects`, writes every detected region to its own numbered
//! JPEG. Detection order is whatever the detector returns; nothing here
//! sorts, merges or deduplicates boxes.

use crate::config::DetectionConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::ObjectDetector;
use crate::utils::{object_path, save_jpeg};
use image::{DynamicImage, GenericImageView};
use std::path::{Path, PathBuf};

/// Axis-aligned box in source pixel coordinates (`x2`/`y2` exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BoundingBox {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Clamps the box to a `width` x `height` image and returns
    /// `(x, y, w, h)` for cropping. The result always covers at least one
    /// pixel so every detection yields a writable crop.
    pub fn crop_rect(&self, width: u32, height: u32) -> (u32, u32, u32, u32) {
        let max_x = width.saturating_sub(1) as i64;
        let max_y = height.saturating_sub(1) as i64;

        let x1 = (self.x1 as i64).clamp(0, max_x);
        let y1 = (self.y1 as i64).clamp(0, max_y);
        let x2 = (self.x2 as i64).clamp(x1 + 1, width as i64);
        let y2 = (self.y2 as i64).clamp(y1 + 1, height as i64);

        (x1 as u32, y1 as u32, (x2 - x1) as u32, (y2 - y1) as u32)
    }
}

/// One bounding box with its model confidence in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub bbox: BoundingBox,
    pub confidence: f32,
}

/// Runs detection over frames and crops detected regions.
pub struct ObjectLocator<D: ObjectDetector> {
    detector: D,
    confidence_threshold: f32,
}

impl<D: ObjectDetector> ObjectLocator<D> {
    /// Creates a locator using the `object_detection` threshold.
    pub fn new(detector: D, config: &DetectionConfig) -> Self {
        Self::with_threshold(detector, config.confidence_threshold)
    }

    pub fn with_threshold(detector: D, confidence_threshold: f32) -> Self {
        Self {
            detector,
            confidence_threshold,
        }
    }

    pub fn confidence_threshold(&self) -> f32 {
        self.confidence_threshold
    }

    /// Detects objects in the image at `image_path`.
    pub fn detect_objects(&self, image_path: &Path) -> CoreResult<Vec<Detection>> {
        let image = load_image(image_path)?;
        self.detector.detect(&image, self.confidence_threshold)
    }

    /// Detects objects in `image_path` and writes each region to
    /// `output_dir/object_NNNN.jpg`, returning the paths in detection order.
    ///
    /// `output_dir` is created even when nothing is detected.
    pub fn crop_objects(&self, image_path: &Path, output_dir: &Path) -> CoreResult<Vec<PathBuf>> {
        let image = load_image(image_path)?;
        let detections = self.detector.detect(&image, self.confidence_threshold)?;

        std::fs::create_dir_all(output_dir)?;

        let (width, height) = image.dimensions();
        let mut cropped_paths = Vec::with_capacity(detections.len());
        for (index, detection) in detections.iter().enumerate() {
            let (x, y, w, h) = detection.bbox.crop_rect(width, height);
            let cropped = image.crop_imm(x, y, w, h).to_rgb8();

            let path = object_path(output_dir, index);
            save_jpeg(&cropped, &path)?;
            log::debug!(
                "Cropped object {} ({:.2}) at {:?} -> {}",
                index,
                detection.confidence,
                detection.bbox,
                path.display()
            );
            cropped_paths.push(path);
        }

        Ok(cropped_paths)
    }
}

fn load_image(path: &Path) -> CoreResult<DynamicImage> {
    image::open(path).map_err(|e| {
        CoreError::InvalidInput(format!("Could not read image: {} ({})", path.display(), e))
    })
}
