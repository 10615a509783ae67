//! Core library for extracting product metadata from shelf videos.
//!
//! A run samples every Nth frame of a video, detects and crops objects in
//! each frame, recognizes the text on every crop, and stores one product
//! record per crop with provenance back to its video, frame and crop.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use shelfscan_core::config::PipelineConfig;
//! use shelfscan_core::external::{SidecarDecoder, TesseractEngine, YoloDetector};
//! use shelfscan_core::processing::{FrameSampler, ObjectLocator, TextExtractor};
//! use shelfscan_core::store::MongoStore;
//! use shelfscan_core::process_video;
//! use std::path::Path;
//!
//! let config = PipelineConfig::load(Path::new("config/config.yaml")).unwrap();
//!
//! let sampler = FrameSampler::new(SidecarDecoder::new(), &config.video_processing).unwrap();
//! let detector = YoloDetector::new(&config.object_detection).unwrap();
//! let locator = ObjectLocator::new(detector, &config.object_detection);
//! let extractor = TextExtractor::new(
//!     TesseractEngine::new(&config.ocr_processing),
//!     &config.ocr_processing,
//! );
//! let store = MongoStore::connect(&config.database).unwrap();
//!
//! let summary = process_video(&sampler, &locator, &extractor, &store, Path::new("shelf.mp4")).unwrap();
//! println!("{} frames, {} records", summary.frames.len(), summary.stored.len());
//! ```

pub mod config;
pub mod error;
pub mod external;
pub mod processing;
pub mod store;
pub mod utils;

// Re-exports for public API
pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use error::{CoreError, CoreResult};
pub use processing::{RunSummary, StoredProduct, process_video};
pub use store::{MemoryStore, MongoStore, ProductRecord, ProductStore, ProductUpdate};
pub use utils::{format_bytes, format_duration, truncate_chars};
