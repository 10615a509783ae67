// ============================================================================
// shelfscan-core/src/processing/pipeline.rs
// ============================================================================
//
// PIPELINE: Sequential Video-to-Records Orchestration
//
// Wires the four stages together for one input video. Data only flows
// forward: video -> frames -> cropped objects -> product records -> stored
// documents. Any stage error aborts the run; files and documents written
// before the failure are left in place.
//
// WORKFLOW:
// 1. Sample frames into the configured output directory
// 2. For each frame, crop detected objects into `<frame_dir>/objects`
// 3. For each cropped object, extract text and parse a product record
// 4. Insert the record, attaching video/frame/object provenance

// ---- Internal crate imports ----
use crate::error::CoreResult;
use crate::external::{FrameDecoder, ObjectDetector, OcrEngine};
use crate::processing::frame_sampler::FrameSampler;
use crate::processing::object_locator::ObjectLocator;
use crate::processing::text_extractor::TextExtractor;
use crate::store::{ProductRecord, ProductStore};
use crate::utils::truncate_chars;

// ---- Standard library imports ----
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Directory name, next to the frames, that receives cropped objects.
pub const OBJECTS_DIR_NAME: &str = "objects";

/// Number of raw-text characters shown per stored record.
const TEXT_PREVIEW_CHARS: usize = 100;

/// A record as it was stored during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredProduct {
    pub id: String,
    pub record: ProductRecord,
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub video: PathBuf,
    pub frames: Vec<PathBuf>,
    pub objects_cropped: usize,
    pub stored: Vec<StoredProduct>,
    pub duration: Duration,
}

/// Returns the directory cropped objects of `frame` are written to.
pub fn objects_dir_for(frame: &Path) -> PathBuf {
    frame
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(OBJECTS_DIR_NAME)
}

/// Runs every stage over `video` and returns what was produced.
///
/// The function is generic over the stage collaborators so that any decoder,
/// detector, OCR engine and store can be plugged in.
///
/// # Examples
///
/// ```rust,no_run
/// use shelfscan_core::config::PipelineConfig;
/// use shelfscan_core::external::{SidecarDecoder, TesseractEngine, YoloDetector};
/// use shelfscan_core::processing::{FrameSampler, ObjectLocator, TextExtractor, process_video};
/// use shelfscan_core::store::MemoryStore;
/// use std::path::Path;
///
/// # fn main() -> shelfscan_core::CoreResult<()> {
/// let config = PipelineConfig::load(Path::new("config/config.yaml"))?;
/// let sampler = FrameSampler::new(SidecarDecoder::new(), &config.video_processing)?;
/// let locator = ObjectLocator::new(
///     YoloDetector::new(&config.object_detection)?,
///     &config.object_detection,
/// );
/// let extractor = TextExtractor::new(
///     TesseractEngine::new(&config.ocr_processing),
///     &config.ocr_processing,
/// );
/// let store = MemoryStore::new();
///
/// let summary = process_video(&sampler, &locator, &extractor, &store, Path::new("shelf.mp4"))?;
/// println!("Stored {} product(s)", summary.stored.len());
/// # Ok(())
/// # }
/// ```
pub fn process_video<D, M, O, S>(
    sampler: &FrameSampler<D>,
    locator: &ObjectLocator<M>,
    extractor: &TextExtractor<O>,
    store: &S,
    video: &Path,
) -> CoreResult<RunSummary>
where
    D: FrameDecoder,
    M: ObjectDetector,
    O: OcrEngine,
    S: ProductStore,
{
    let start = Instant::now();

    // ========================================================================
    // STEP 1: SAMPLE FRAMES
    // ========================================================================

    log::info!("Extracting frames from video: {}", video.display());
    let frames = sampler.extract_frames(video)?;
    log::info!("Extracted {} frames", frames.len());

    // ========================================================================
    // STEP 2: DETECT, EXTRACT AND STORE PER FRAME
    // ========================================================================

    let mut objects_cropped = 0;
    let mut stored = Vec::new();

    for (index, frame) in frames.iter().enumerate() {
        log::info!(
            "Processing frame {}/{}: {}",
            index + 1,
            frames.len(),
            frame.display()
        );

        let objects = locator.crop_objects(frame, &objects_dir_for(frame))?;
        log::info!("Detected {} objects", objects.len());
        objects_cropped += objects.len();

        for object in &objects {
            log::info!("Processing object: {}", object.display());

            let info = extractor.process_product(object);
            let record = ProductRecord::from_product(info, video, frame, object);

            let id = store.insert(&record)?;
            log::info!("Stored product with ID: {}", id);
            log::info!(
                "Extracted text: {}...",
                truncate_chars(&record.raw_text, TEXT_PREVIEW_CHARS)
            );

            stored.push(StoredProduct { id, record });
        }
    }

    let duration = start.elapsed();
    log::debug!(
        "Pipeline finished for {}: {} frame(s), {} object(s), {} record(s)",
        video.display(),
        frames.len(),
        objects_cropped,
        stored.len()
    );

    Ok(RunSummary {
        video: video.to_path_buf(),
        frames,
        objects_cropped,
        stored,
        duration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_objects_dir_is_sibling_of_frame() {
        assert_eq!(
            objects_dir_for(Path::new("out/frames/frame_0003.jpg")),
            PathBuf::from("out/frames/objects")
        );
        assert_eq!(
            objects_dir_for(Path::new("frame_0000.jpg")),
            PathBuf::from("objects")
        );
    }
}
