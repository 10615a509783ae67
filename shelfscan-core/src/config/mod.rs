//! Configuration structures and constants for the shelfscan-core library.
//!
//! The pipeline is configured from a single YAML file that is loaded once
//! into a [`PipelineConfig`]. Each component receives only its own section,
//! so nothing re-reads the file after startup.

mod builder;

use crate::error::{CoreError, CoreResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub use builder::PipelineConfigBuilder;

// Default constants

/// Default configuration file path used by the CLI.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

/// Default IoU threshold for non-maximum suppression of YOLO candidates.
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.7;

/// Default square input size of the YOLOv8 ONNX export.
pub const DEFAULT_MODEL_INPUT_SIZE: u32 = 640;

/// Default tesseract executable, resolved through `PATH`.
pub const DEFAULT_TESSERACT_PATH: &str = "tesseract";

/// Top-level pipeline configuration.
///
/// Mirrors the layout of the YAML file:
///
/// ```yaml
/// database:
///   mongodb_uri: mongodb://localhost:27017
///   database_name: products
///   collection_name: extracted
/// object_detection:
///   model: models/yolov8n.onnx
///   confidence_threshold: 0.5
/// ocr_processing:
///   tesseract_config: --oem 3 --psm 6
///   min_confidence: 60
/// video_processing:
///   output_dir: data/frames
///   frame_interval: 30
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PipelineConfig {
    pub database: DatabaseConfig,
    pub object_detection: DetectionConfig,
    pub ocr_processing: OcrConfig,
    pub video_processing: VideoConfig,
}

/// Connection settings for the product document store.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DatabaseConfig {
    pub mongodb_uri: String,
    pub database_name: String,
    pub collection_name: String,
}

/// Settings for the object detection model.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DetectionConfig {
    /// Path to the YOLOv8 ONNX model file
    pub model: PathBuf,

    /// Minimum detection score in [0, 1]
    pub confidence_threshold: f32,

    /// IoU above which a lower-scored box of the same class is suppressed
    #[serde(default = "default_iou_threshold")]
    pub iou_threshold: f32,

    /// Square input resolution the model was exported with
    #[serde(default = "default_input_size")]
    pub input_size: u32,
}

/// Settings for the OCR engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OcrConfig {
    /// Extra tesseract arguments, e.g. `--oem 3 --psm 6`
    pub tesseract_config: String,

    /// Minimum per-token confidence (tesseract scale, 0-100)
    pub min_confidence: f32,

    /// Tesseract executable
    #[serde(default = "default_tesseract_path")]
    pub tesseract_path: PathBuf,
}

/// Settings for frame sampling.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VideoConfig {
    /// Directory that receives `frame_NNNN.jpg` files
    pub output_dir: PathBuf,

    /// Keep every Nth decoded frame
    pub frame_interval: u32,
}

fn default_iou_threshold() -> f32 {
    DEFAULT_IOU_THRESHOLD
}

fn default_input_size() -> u32 {
    DEFAULT_MODEL_INPUT_SIZE
}

fn default_tesseract_path() -> PathBuf {
    PathBuf::from(DEFAULT_TESSERACT_PATH)
}

impl PipelineConfig {
    /// Reads, parses and validates a YAML configuration file.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!(
                "Failed to read configuration file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config = Self::from_yaml_str(&contents)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parses and validates configuration from a YAML string.
    pub fn from_yaml_str(contents: &str) -> CoreResult<Self> {
        let config: PipelineConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates value ranges that serde cannot express.
    pub fn validate(&self) -> CoreResult<()> {
        if self.video_processing.frame_interval == 0 {
            return Err(CoreError::Config(
                "video_processing.frame_interval must be at least 1".to_string(),
            ));
        }

        check_unit_range(
            "object_detection.confidence_threshold",
            self.object_detection.confidence_threshold,
        )?;
        check_unit_range(
            "object_detection.iou_threshold",
            self.object_detection.iou_threshold,
        )?;

        if self.object_detection.input_size == 0 {
            return Err(CoreError::Config(
                "object_detection.input_size must be positive".to_string(),
            ));
        }

        let min_confidence = self.ocr_processing.min_confidence;
        if !(0.0..=100.0).contains(&min_confidence) {
            return Err(CoreError::Config(format!(
                "ocr_processing.min_confidence must be within 0-100, got {min_confidence}"
            )));
        }

        for (key, value) in [
            ("database.mongodb_uri", &self.database.mongodb_uri),
            ("database.database_name", &self.database.database_name),
            ("database.collection_name", &self.database.collection_name),
        ] {
            if value.trim().is_empty() {
                return Err(CoreError::Config(format!("{key} must not be empty")));
            }
        }

        if self.object_detection.model.as_os_str().is_empty() {
            return Err(CoreError::Config(
                "object_detection.model must not be empty".to_string(),
            ));
        }
        if self.video_processing.output_dir.as_os_str().is_empty() {
            return Err(CoreError::Config(
                "video_processing.output_dir must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn check_unit_range(key: &str, value: f32) -> CoreResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(CoreError::Config(format!(
            "{key} must be within 0.0-1.0, got {value}"
        )))
    }
}
