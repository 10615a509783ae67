//! Implementation of the single `shelfscan` command.
//!
//! Validates the input path, loads configuration, checks the external tools,
//! builds each pipeline stage from its configuration section and runs the
//! pipeline against MongoDB (or an in-memory store with `--dry-run`).

use crate::cli::Cli;
use crate::error::{CliError, CliResult};

use shelfscan_core::config::PipelineConfig;
use shelfscan_core::external::{SidecarDecoder, TesseractEngine, YoloDetector, check_dependency};
use shelfscan_core::processing::{FrameSampler, ObjectLocator, TextExtractor};
use shelfscan_core::utils::total_file_size;
use shelfscan_core::{
    MemoryStore, MongoStore, RunSummary, format_bytes, format_duration, process_video,
};

use log::{debug, info};
use std::path::Path;

/// Fails with [`CliError::VideoNotFound`] when `input` does not exist.
pub fn ensure_input_exists(input: &Path) -> CliResult<()> {
    if input.exists() {
        Ok(())
    } else {
        Err(CliError::VideoNotFound(input.to_path_buf()))
    }
}

fn check_external_tools(config: &PipelineConfig) -> CliResult<()> {
    info!("Checking for required external commands...");
    check_dependency(Path::new("ffmpeg"), "-version")?;
    check_dependency(Path::new("ffprobe"), "-version")?;
    check_dependency(&config.ocr_processing.tesseract_path, "--version")?;
    debug!("External dependency check passed.");
    Ok(())
}

/// Runs the pipeline as described by the parsed arguments.
pub fn run_process(args: &Cli) -> CliResult<RunSummary> {
    ensure_input_exists(&args.input)?;

    let config = PipelineConfig::load(&args.config)?;
    debug!("Using configuration from {}", args.config.display());

    check_external_tools(&config)?;

    let sampler = FrameSampler::new(SidecarDecoder::new(), &config.video_processing)?;
    debug!(
        "Sampling every {} frame(s) into {}",
        sampler.interval(),
        sampler.output_dir().display()
    );

    let locator = ObjectLocator::new(
        YoloDetector::new(&config.object_detection)?,
        &config.object_detection,
    );
    debug!(
        "Detection confidence threshold: {:.2}",
        locator.confidence_threshold()
    );

    let engine = TesseractEngine::new(&config.ocr_processing);
    debug!(
        "OCR command: {} {}",
        engine.binary().display(),
        engine.extra_args().join(" ")
    );
    let extractor = TextExtractor::new(engine, &config.ocr_processing);

    let summary = if args.dry_run {
        info!("Dry run: records are kept in memory only");
        let store = MemoryStore::new();
        process_video(&sampler, &locator, &extractor, &store, &args.input)?
    } else {
        let store = MongoStore::connect(&config.database)?;
        process_video(&sampler, &locator, &extractor, &store, &args.input)?
    };

    Ok(summary)
}

/// Builds the closing summary lines of a run.
pub fn summary_lines(summary: &RunSummary) -> Vec<String> {
    vec![
        "========================================".to_string(),
        format!("Run summary for {}", summary.video.display()),
        format!(
            "  Frames sampled:  {} ({})",
            summary.frames.len(),
            format_bytes(total_file_size(&summary.frames))
        ),
        format!("  Objects cropped: {}", summary.objects_cropped),
        format!("  Records stored:  {}", summary.stored.len()),
        format!("  Elapsed time:    {}", format_duration(summary.duration)),
        "========================================".to_string(),
    ]
}

/// Logs the closing summary of a run.
pub fn report_summary(summary: &RunSummary) {
    for line in summary_lines(summary) {
        info!("{}", line);
    }
}
