// ============================================================================
// shelfscan-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for PipelineConfig
//
// Provides a fluent API for creating PipelineConfig instances in code (tests,
// embedding applications) without going through a YAML file. Every field has
// a default so only the values that matter need to be set.

// ---- Standard library imports ----
use std::path::PathBuf;

// ---- Internal crate imports ----
use super::{
    DEFAULT_IOU_THRESHOLD, DEFAULT_MODEL_INPUT_SIZE, DEFAULT_TESSERACT_PATH, DatabaseConfig,
    DetectionConfig, OcrConfig, PipelineConfig, VideoConfig,
};
use crate::error::CoreResult;

/// Builder for creating PipelineConfig instances.
///
/// # Examples
///
/// ```rust
/// use shelfscan_core::config::PipelineConfigBuilder;
///
/// let config = PipelineConfigBuilder::new()
///     .output_dir("/tmp/frames")
///     .frame_interval(10)
///     .confidence_threshold(0.4)
///     .min_confidence(50.0)
///     .build()
///     .unwrap();
/// assert_eq!(config.video_processing.frame_interval, 10);
/// ```
#[derive(Debug, Clone)]
pub struct PipelineConfigBuilder {
    // Database
    mongodb_uri: String,
    database_name: String,
    collection_name: String,

    // Detection
    model: PathBuf,
    confidence_threshold: f32,
    iou_threshold: f32,
    input_size: u32,

    // OCR
    tesseract_config: String,
    min_confidence: f32,
    tesseract_path: PathBuf,

    // Video
    output_dir: PathBuf,
    frame_interval: u32,
}

impl Default for PipelineConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineConfigBuilder {
    /// Creates a new PipelineConfigBuilder with default values.
    pub fn new() -> Self {
        Self {
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            database_name: "shelfscan".to_string(),
            collection_name: "products".to_string(),

            model: PathBuf::from("models/yolov8n.onnx"),
            confidence_threshold: 0.5,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            input_size: DEFAULT_MODEL_INPUT_SIZE,

            tesseract_config: String::new(),
            min_confidence: 0.0,
            tesseract_path: PathBuf::from(DEFAULT_TESSERACT_PATH),

            output_dir: PathBuf::from("frames"),
            frame_interval: 30,
        }
    }

    pub fn mongodb_uri(mut self, uri: impl Into<String>) -> Self {
        self.mongodb_uri = uri.into();
        self
    }

    pub fn database_name(mut self, name: impl Into<String>) -> Self {
        self.database_name = name.into();
        self
    }

    pub fn collection_name(mut self, name: impl Into<String>) -> Self {
        self.collection_name = name.into();
        self
    }

    pub fn model(mut self, model: impl Into<PathBuf>) -> Self {
        self.model = model.into();
        self
    }

    pub fn confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn iou_threshold(mut self, threshold: f32) -> Self {
        self.iou_threshold = threshold;
        self
    }

    pub fn input_size(mut self, size: u32) -> Self {
        self.input_size = size;
        self
    }

    pub fn tesseract_config(mut self, config: impl Into<String>) -> Self {
        self.tesseract_config = config.into();
        self
    }

    pub fn min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    pub fn tesseract_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.tesseract_path = path.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn frame_interval(mut self, interval: u32) -> Self {
        self.frame_interval = interval;
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> CoreResult<PipelineConfig> {
        let config = PipelineConfig {
            database: DatabaseConfig {
                mongodb_uri: self.mongodb_uri,
                database_name: self.database_name,
                collection_name: self.collection_name,
            },
            object_detection: DetectionConfig {
                model: self.model,
                confidence_threshold: self.confidence_threshold,
                iou_threshold: self.iou_threshold,
                input_size: self.input_size,
            },
            ocr_processing: OcrConfig {
                tesseract_config: self.tesseract_config,
                min_confidence: self.min_confidence,
                tesseract_path: self.tesseract_path,
            },
            video_processing: VideoConfig {
                output_dir: self.output_dir,
                frame_interval: self.frame_interval,
            },
        };
        config.validate()?;
        Ok(config)
    }
}
