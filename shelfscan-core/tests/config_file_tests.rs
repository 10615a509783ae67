//! Tests for loading pipeline configuration from YAML files
//!
//! These tests verify:
//! - The configuration shipped with the repository parses and validates
//! - Files written by users are loaded with defaults for optional keys
//! - Invalid files are reported as configuration errors

use shelfscan_core::CoreError;
use shelfscan_core::config::{DEFAULT_IOU_THRESHOLD, PipelineConfig, PipelineConfigBuilder};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

#[test]
fn test_shipped_config_is_valid() -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../config/config.yaml");
    let config = PipelineConfig::load(&path)?;

    assert_eq!(config.database.collection_name, "products");
    assert_eq!(config.ocr_processing.tesseract_config, "--oem 3 --psm 6");
    assert_eq!(config.video_processing.frame_interval, 30);
    Ok(())
}

#[test]
fn test_load_user_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("config.yaml");
    fs::write(
        &path,
        r#"
database:
  mongodb_uri: mongodb://db.internal:27017
  database_name: retail
  collection_name: shelf_items
object_detection:
  model: /opt/models/products.onnx
  confidence_threshold: 0.35
ocr_processing:
  tesseract_config: ""
  min_confidence: 0
video_processing:
  output_dir: /tmp/frames
  frame_interval: 1
"#,
    )?;

    let config = PipelineConfig::load(&path)?;
    assert_eq!(config.database.mongodb_uri, "mongodb://db.internal:27017");
    assert_eq!(config.object_detection.model, PathBuf::from("/opt/models/products.onnx"));
    assert_eq!(config.object_detection.iou_threshold, DEFAULT_IOU_THRESHOLD);
    assert_eq!(config.ocr_processing.tesseract_config, "");
    assert_eq!(config.video_processing.frame_interval, 1);
    Ok(())
}

#[test]
fn test_malformed_yaml_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("broken.yaml");
    fs::write(&path, "database: [unclosed\n")?;

    assert!(matches!(PipelineConfig::load(&path), Err(CoreError::Yaml(_))));
    Ok(())
}

#[test]
fn test_builder_matches_loaded_file() -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../config/config.yaml");
    let loaded = PipelineConfig::load(&path)?;

    let built = PipelineConfigBuilder::new()
        .mongodb_uri("mongodb://localhost:27017")
        .database_name("shelfscan")
        .collection_name("products")
        .model("models/yolov8n.onnx")
        .confidence_threshold(0.5)
        .iou_threshold(0.7)
        .input_size(640)
        .tesseract_config("--oem 3 --psm 6")
        .min_confidence(60.0)
        .tesseract_path("tesseract")
        .output_dir("data/frames")
        .frame_interval(30)
        .build()?;

    assert_eq!(built, loaded);
    Ok(())
}
