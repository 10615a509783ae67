//! YOLOv8 object detection through ONNX Runtime.
//!
//! Frames are letterboxed onto a square canvas: scaled by one factor to fit,
//! centred, and padded with grey. The model takes that NCHW float image in
//! [0, 1] and produces a
//! `[1, 4 + classes, candidates]` tensor where each candidate column holds
//! `cx, cy, w, h` in model pixels followed by per-class scores. Candidates
//! below the confidence threshold are dropped, overlapping boxes of the same
//! class are suppressed, and the survivors are scaled back to the source
//! image and returned highest confidence first.

use crate::config::DetectionConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::ObjectDetector;
use crate::processing::object_locator::{BoundingBox, Detection};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use ndarray::Array2;
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use ort::value::{Tensor, Value};
use std::path::Path;
use std::sync::Mutex;

const OUTPUT_NAME: &str = "output0";

/// Grey used for letterbox padding.
const PAD_VALUE: u8 = 114;

/// `ObjectDetector` backed by a YOLOv8 ONNX export.
pub struct YoloDetector {
    session: Mutex<Session>,
    input_size: u32,
    iou_threshold: f32,
}

impl YoloDetector {
    /// Loads the model named by `config.model`.
    pub fn new(config: &DetectionConfig) -> CoreResult<Self> {
        if !config.model.exists() {
            return Err(CoreError::Config(format!(
                "Detection model not found: {}",
                config.model.display()
            )));
        }

        let session = create_session(&config.model)?;
        log::info!(
            "Loaded detection model {} (input {}px)",
            config.model.display(),
            config.input_size
        );

        Ok(Self {
            session: Mutex::new(session),
            input_size: config.input_size,
            iou_threshold: config.iou_threshold,
        })
    }

    fn preprocess(&self, image: &DynamicImage) -> CoreResult<(Value, OutputScale)> {
        let (canvas, scale) = letterbox(image, self.input_size);

        let side = self.input_size as usize;
        let mut chw = Vec::with_capacity(3 * side * side);
        for channel in 0..3 {
            for pixel in canvas.pixels() {
                chw.push(pixel[channel] as f32 / 255.0);
            }
        }

        let tensor = Tensor::from_array((vec![1usize, 3, side, side], chw.into_boxed_slice()))
            .map(Value::from)
            .map_err(|e| CoreError::Detection(format!("Failed to build input tensor: {e}")))?;
        Ok((tensor, scale))
    }

    fn run_inference(&self, input: Value) -> CoreResult<(Vec<i64>, Vec<f32>)> {
        let mut session = self
            .session
            .lock()
            .map_err(|_| CoreError::Detection("Detection session lock poisoned".to_string()))?;

        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| CoreError::Detection(format!("Inference failed: {e}")))?;

        let output = outputs.get(OUTPUT_NAME).ok_or_else(|| {
            CoreError::Detection(format!("Model produced no '{OUTPUT_NAME}' tensor"))
        })?;

        let (shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| CoreError::Detection(format!("Failed to read model output: {e}")))?;

        Ok((shape.iter().copied().collect(), data.to_vec()))
    }
}

impl ObjectDetector for YoloDetector {
    fn detect(&self, image: &DynamicImage, confidence_threshold: f32) -> CoreResult<Vec<Detection>> {
        let (input, scale) = self.preprocess(image)?;
        let (shape, data) = self.run_inference(input)?;

        let detections = decode_output(
            &shape,
            &data,
            scale,
            confidence_threshold,
            self.iou_threshold,
        )?;

        log::debug!(
            "Detected {} object(s) at threshold {:.2}",
            detections.len(),
            confidence_threshold
        );
        Ok(detections)
    }
}

fn create_session(model: &Path) -> CoreResult<Session> {
    Session::builder()
        .map_err(|e| CoreError::Detection(format!("Failed to create session builder: {e}")))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| CoreError::Detection(format!("Failed to set optimization level: {e}")))?
        .commit_from_file(model)
        .map_err(|e| {
            CoreError::Detection(format!("Failed to load model {}: {e}", model.display()))
        })
}

/// Maps model-space coordinates back onto the source image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct OutputScale {
    width: f32,
    height: f32,
    gain: f32,
    pad_x: f32,
    pad_y: f32,
}

impl OutputScale {
    pub(crate) fn new(width: u32, height: u32, input_size: u32) -> Self {
        let (resized_w, resized_h) = fitted_size(width, height, input_size);
        let gain = (input_size as f32 / width.max(1) as f32)
            .min(input_size as f32 / height.max(1) as f32);
        Self {
            width: width as f32,
            height: height as f32,
            gain,
            pad_x: ((input_size - resized_w) / 2) as f32,
            pad_y: ((input_size - resized_h) / 2) as f32,
        }
    }

    fn to_source_x(self, x: f32) -> f32 {
        ((x - self.pad_x) / self.gain).clamp(0.0, self.width)
    }

    fn to_source_y(self, y: f32) -> f32 {
        ((y - self.pad_y) / self.gain).clamp(0.0, self.height)
    }
}

/// Size of the source image once scaled to fit a `size` square.
fn fitted_size(width: u32, height: u32, size: u32) -> (u32, u32) {
    let (width, height) = (width.max(1), height.max(1));
    let gain = (size as f32 / width as f32).min(size as f32 / height as f32);
    let fit = |v: u32| ((v as f32 * gain).round() as u32).clamp(1, size);
    (fit(width), fit(height))
}

/// Scales `image` to fit a `size` square without distortion and centres it
/// on a grey canvas.
pub(crate) fn letterbox(image: &DynamicImage, size: u32) -> (RgbImage, OutputScale) {
    let (width, height) = image.dimensions();
    let scale = OutputScale::new(width, height, size);
    let (resized_w, resized_h) = fitted_size(width, height, size);

    let resized = image
        .resize_exact(resized_w, resized_h, FilterType::Triangle)
        .to_rgb8();
    let mut canvas = RgbImage::from_pixel(size, size, Rgb([PAD_VALUE; 3]));
    imageops::replace(
        &mut canvas,
        &resized,
        i64::from(scale.pad_x as u32),
        i64::from(scale.pad_y as u32),
    );

    (canvas, scale)
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    class_id: usize,
    score: f32,
}

impl Candidate {
    fn area(&self) -> f32 {
        (self.x2 - self.x1).max(0.0) * (self.y2 - self.y1).max(0.0)
    }

    fn iou(&self, other: &Candidate) -> f32 {
        let inter_w = (self.x2.min(other.x2) - self.x1.max(other.x1)).max(0.0);
        let inter_h = (self.y2.min(other.y2) - self.y1.max(other.y1)).max(0.0);
        let intersection = inter_w * inter_h;
        let union = self.area() + other.area() - intersection;
        if union > 0.0 { intersection / union } else { 0.0 }
    }
}

/// Turns a raw `[1, features, candidates]` output into pixel detections.
pub(crate) fn decode_output(
    shape: &[i64],
    data: &[f32],
    scale: OutputScale,
    confidence_threshold: f32,
    iou_threshold: f32,
) -> CoreResult<Vec<Detection>> {
    let (features, count) = match shape {
        [1, f, n] | [f, n] if *f > 4 && *n >= 0 => (*f as usize, *n as usize),
        _ => {
            return Err(CoreError::Detection(format!(
                "Unexpected model output shape {shape:?}"
            )));
        }
    };

    let grid = Array2::from_shape_vec((features, count), data.to_vec())
        .map_err(|e| CoreError::Detection(format!("Failed to reshape model output: {e}")))?;
    let rows = grid.t();

    let mut candidates = Vec::new();
    for row in rows.outer_iter() {
        let (class_id, score) = row
            .iter()
            .skip(4)
            .copied()
            .enumerate()
            .fold((0, f32::MIN), |best, (c, s)| if s > best.1 { (c, s) } else { best });

        if score < confidence_threshold {
            continue;
        }

        let (cx, cy, w, h) = (row[0], row[1], row[2], row[3]);
        candidates.push(Candidate {
            x1: scale.to_source_x(cx - w / 2.0),
            y1: scale.to_source_y(cy - h / 2.0),
            x2: scale.to_source_x(cx + w / 2.0),
            y2: scale.to_source_y(cy + h / 2.0),
            class_id,
            score,
        });
    }

    Ok(non_maximum_suppression(candidates, iou_threshold)
        .into_iter()
        .map(|c| Detection {
            bbox: BoundingBox::new(
                c.x1.round() as i32,
                c.y1.round() as i32,
                c.x2.round() as i32,
                c.y2.round() as i32,
            ),
            confidence: c.score,
        })
        .collect())
}

fn non_maximum_suppression(mut candidates: Vec<Candidate>, iou_threshold: f32) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut kept: Vec<Candidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let overlaps = kept
            .iter()
            .any(|k| k.class_id == candidate.class_id && k.iou(&candidate) > iou_threshold);
        if !overlaps {
            kept.push(candidate);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_IOU_THRESHOLD;

    /// Builds a `[1, 4 + classes, n]` buffer from per-candidate rows.
    fn output(classes: usize, rows: &[[f32; 6]]) -> (Vec<i64>, Vec<f32>) {
        let features = 4 + classes;
        let n = rows.len();
        let mut data = vec![0.0; features * n];
        for (i, row) in rows.iter().enumerate() {
            for (f, value) in row.iter().take(features).enumerate() {
                data[f * n + i] = *value;
            }
        }
        (vec![1, features as i64, n as i64], data)
    }

    #[test]
    fn test_decode_scales_to_source_pixels() {
        // 1280x720 fits as 640x360 with 140px of padding above and below
        let (shape, data) = output(2, &[[320.0, 320.0, 64.0, 64.0, 0.9, 0.1]]);
        let scale = OutputScale::new(1280, 720, 640);

        let detections = decode_output(&shape, &data, scale, 0.5, 0.45).unwrap();
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].bbox, BoundingBox::new(576, 296, 704, 424));
        assert!((detections[0].confidence - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_decode_applies_threshold_inclusively() {
        let (shape, data) = output(
            2,
            &[
                [100.0, 100.0, 20.0, 20.0, 0.5, 0.0],
                [300.0, 300.0, 20.0, 20.0, 0.0, 0.49],
            ],
        );
        let scale = OutputScale::new(640, 640, 640);

        let detections = decode_output(&shape, &data, scale, 0.5, 0.45).unwrap();
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].bbox, BoundingBox::new(90, 90, 110, 110));
    }

    #[test]
    fn test_nms_suppresses_same_class_overlap_only() {
        let (shape, data) = output(
            2,
            &[
                [100.0, 100.0, 40.0, 40.0, 0.7, 0.0],
                [102.0, 102.0, 40.0, 40.0, 0.9, 0.0],
                [101.0, 101.0, 40.0, 40.0, 0.0, 0.8],
            ],
        );
        let scale = OutputScale::new(640, 640, 640);

        let detections = decode_output(&shape, &data, scale, 0.25, 0.45).unwrap();
        let confidences: Vec<f32> = detections.iter().map(|d| d.confidence).collect();
        assert_eq!(confidences, vec![0.9, 0.8]);
    }

    #[test]
    fn test_default_iou_keeps_half_overlapping_neighbours() {
        // Same class, IoU of about 0.51
        let (shape, data) = output(
            1,
            &[
                [100.0, 100.0, 40.0, 40.0, 0.9, 0.0],
                [113.0, 100.0, 40.0, 40.0, 0.8, 0.0],
            ],
        );
        let scale = OutputScale::new(640, 640, 640);

        let kept = decode_output(&shape, &data, scale, 0.25, DEFAULT_IOU_THRESHOLD).unwrap();
        assert_eq!(kept.len(), 2);

        let strict = decode_output(&shape, &data, scale, 0.25, 0.45).unwrap();
        assert_eq!(strict.len(), 1);
    }

    #[test]
    fn test_letterbox_keeps_aspect_ratio_and_pads() {
        let source = DynamicImage::ImageRgb8(RgbImage::from_pixel(200, 100, Rgb([255, 255, 255])));
        let (canvas, scale) = letterbox(&source, 100);

        assert_eq!(canvas.dimensions(), (100, 100));
        assert_eq!(canvas.get_pixel(50, 10), &Rgb([PAD_VALUE; 3]));
        assert_eq!(canvas.get_pixel(50, 50), &Rgb([255, 255, 255]));
        assert_eq!(canvas.get_pixel(50, 90), &Rgb([PAD_VALUE; 3]));
        assert_eq!(
            scale,
            OutputScale {
                width: 200.0,
                height: 100.0,
                gain: 0.5,
                pad_x: 0.0,
                pad_y: 25.0,
            }
        );
    }

    #[test]
    fn test_boxes_are_clamped_to_image() {
        let (shape, data) = output(2, &[[5.0, 5.0, 40.0, 40.0, 0.9, 0.0]]);
        let scale = OutputScale::new(640, 640, 640);

        let detections = decode_output(&shape, &data, scale, 0.5, 0.45).unwrap();
        assert_eq!(detections[0].bbox, BoundingBox::new(0, 0, 25, 25));
    }

    #[test]
    fn test_rejects_unexpected_shape() {
        let scale = OutputScale::new(640, 640, 640);
        let result = decode_output(&[1, 3, 2], &[0.0; 6], scale, 0.5, 0.45);
        assert!(matches!(result, Err(CoreError::Detection(_))));

        let mismatched = decode_output(&[1, 6, 4], &[0.0; 6], scale, 0.5, 0.45);
        assert!(matches!(mismatched, Err(CoreError::Detection(_))));
    }

    #[test]
    fn test_empty_output_yields_no_detections() {
        let scale = OutputScale::new(640, 640, 640);
        let detections = decode_output(&[1, 84, 0], &[], scale, 0.5, 0.45).unwrap();
        assert!(detections.is_empty());
    }
}
