//! Utility functions for formatting and file operations.
//!
//! General-purpose helpers shared by the pipeline stages and the CLI:
//! numbered output file names, JPEG encoding, and formatting for log output.

use crate::error::CoreResult;
use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// JPEG quality used for sampled frames and cropped objects.
pub const JPEG_QUALITY: u8 = 95;

/// Returns the path of the numbered frame file, e.g. `frame_0007.jpg`.
#[must_use]
pub fn frame_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("frame_{index:04}.jpg"))
}

/// Returns the path of the numbered object crop, e.g. `object_0002.jpg`.
#[must_use]
pub fn object_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("object_{index:04}.jpg"))
}

/// Encodes an RGB image as JPEG at [`JPEG_QUALITY`].
pub fn save_jpeg(image: &RgbImage, path: &Path) -> CoreResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    let mut encoder = JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY);
    encoder.encode(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ColorType::Rgb8,
    )?;
    Ok(())
}

/// Formats a duration as HH:MM:SS (e.g., 3725s -> "01:02:05").
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Formats a byte count with binary units (e.g., 1536 -> "1.50 KiB").
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    const GIB: f64 = MIB * 1024.0;

    let value = bytes as f64;
    if value >= GIB {
        format!("{:.2} GiB", value / GIB)
    } else if value >= MIB {
        format!("{:.2} MiB", value / MIB)
    } else if value >= KIB {
        format!("{:.2} KiB", value / KIB)
    } else {
        format!("{bytes} B")
    }
}

/// Sums the sizes of `paths`, skipping files that cannot be read.
pub fn total_file_size<P: AsRef<Path>>(paths: &[P]) -> u64 {
    paths
        .iter()
        .filter_map(|p| std::fs::metadata(p).ok())
        .map(|m| m.len())
        .sum()
}

/// Returns at most `max_chars` characters of `text`, never splitting a
/// multi-byte character.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
