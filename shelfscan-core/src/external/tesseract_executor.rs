//! OCR through the `tesseract` command-line tool.
//!
//! Tesseract is run once per image with the `tsv` output config, which
//! reports one row per layout element. Only word rows carry text; all other
//! rows have a confidence of -1 and are kept as such so the caller can
//! filter them.

use crate::config::OcrConfig;
use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error};
use crate::external::OcrEngine;
use crate::processing::text_extractor::OcrToken;
use std::path::{Path, PathBuf};
use std::process::Command;

const CONF_COLUMN: usize = 10;
const TEXT_COLUMN: usize = 11;

/// `OcrEngine` backed by the tesseract binary.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    binary: PathBuf,
    extra_args: Vec<String>,
}

impl TesseractEngine {
    /// Builds an engine from the `ocr_processing` section.
    ///
    /// `tesseract_config` is split on whitespace and passed before the
    /// `tsv` output config, e.g. `--oem 3 --psm 6`.
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            binary: config.tesseract_path.clone(),
            extra_args: config
                .tesseract_config
                .split_whitespace()
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn extra_args(&self) -> &[String] {
        &self.extra_args
    }

    fn build_command(&self, image_path: &Path) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg(image_path).arg("stdout").args(&self.extra_args).arg("tsv");
        cmd
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, image_path: &Path) -> CoreResult<Vec<OcrToken>> {
        let mut cmd = self.build_command(image_path);
        log::trace!("Running OCR command: {:?}", cmd);

        let output = cmd
            .output()
            .map_err(|e| command_start_error(self.binary.display().to_string(), e))?;

        if !output.status.success() {
            return Err(command_failed_error(
                self.binary.display().to_string(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim(),
            ));
        }

        parse_tsv(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parses tesseract TSV output into tokens, skipping the header row.
pub(crate) fn parse_tsv(tsv: &str) -> CoreResult<Vec<OcrToken>> {
    let mut tokens = Vec::new();

    for (line_no, line) in tsv.lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }

        let columns: Vec<&str> = line.splitn(TEXT_COLUMN + 1, '\t').collect();
        let conf_field = columns.get(CONF_COLUMN).ok_or_else(|| {
            CoreError::Ocr(format!("Malformed tesseract output on line {}", line_no + 1))
        })?;
        let confidence: f32 = conf_field.trim().parse().map_err(|_| {
            CoreError::Ocr(format!(
                "Invalid confidence '{}' on line {}",
                conf_field,
                line_no + 1
            ))
        })?;
        let text = columns.get(TEXT_COLUMN).copied().unwrap_or_default();

        tokens.push(OcrToken {
            text: text.to_string(),
            confidence,
        });
    }

    Ok(tokens)
}
