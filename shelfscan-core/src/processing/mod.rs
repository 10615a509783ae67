//! The pipeline stages and their orchestration.
//!
//! Each stage is a small struct generic over the external collaborator it
//! drives, so the same code runs against ffmpeg/ONNX/tesseract in production
//! and against test doubles in tests.

/// Every-Nth-frame sampling to JPEG files
pub mod frame_sampler;

/// Object detection and cropping
pub mod object_locator;

/// OCR filtering and product parsing
pub mod text_extractor;

/// Sequential composition of all stages
pub mod pipeline;

pub use frame_sampler::FrameSampler;
pub use object_locator::{BoundingBox, Detection, ObjectLocator};
pub use pipeline::{RunSummary, StoredProduct, objects_dir_for, process_video};
pub use text_extractor::{OcrText, OcrToken, ProductInfo, TextExtractor};
