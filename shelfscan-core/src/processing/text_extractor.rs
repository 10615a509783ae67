//! OCR text extraction and naive product parsing.
//!
//! The extractor keeps OCR tokens that carry a real confidence (tesseract
//! reports -1 for layout rows) at or above the configured minimum, joins
//! them with single spaces and averages their confidences. OCR failures do
//! not abort the pipeline: `extract_text` logs them and yields
//! [`OcrText::empty`].

use crate::config::OcrConfig;
use crate::error::CoreResult;
use crate::external::OcrEngine;
use std::path::Path;

/// Confidence tesseract assigns to rows that hold no recognized text.
pub const NO_CONFIDENCE: f32 = -1.0;

/// One recognized token as reported by the OCR engine.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrToken {
    pub text: String,
    /// 0-100, or [`NO_CONFIDENCE`]
    pub confidence: f32,
}

impl OcrToken {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// Filtered OCR output for one image.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OcrText {
    pub text: String,
    /// Mean confidence of the kept tokens, 0.0 when none were kept
    pub confidence: f64,
}

impl OcrText {
    /// The "no result" value: empty text with zero confidence.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Keeps tokens with a real confidence of at least `min_confidence`.
    pub fn from_tokens(tokens: &[OcrToken], min_confidence: f32) -> Self {
        let kept: Vec<&OcrToken> = tokens
            .iter()
            .filter(|t| t.confidence != NO_CONFIDENCE && t.confidence >= min_confidence)
            .collect();

        if kept.is_empty() {
            return Self::empty();
        }

        let text = kept
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let confidence =
            kept.iter().map(|t| t.confidence as f64).sum::<f64>() / kept.len() as f64;

        Self { text, confidence }
    }
}

/// Product fields parsed from OCR text, without provenance.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductInfo {
    pub product_name: String,
    /// Never populated; kept so stored records have a stable shape
    pub company_name: String,
    pub product_description: String,
    pub raw_text: String,
    pub confidence: f64,
}

impl ProductInfo {
    /// First line becomes the name, the remaining lines the description.
    pub fn from_text(raw_text: &str, confidence: f64) -> Self {
        let mut lines = raw_text.split('\n');
        let product_name = lines.next().unwrap_or_default().to_string();
        let product_description = lines.collect::<Vec<_>>().join("\n");

        Self {
            product_name,
            company_name: String::new(),
            product_description,
            raw_text: raw_text.to_string(),
            confidence,
        }
    }
}

impl From<OcrText> for ProductInfo {
    fn from(ocr: OcrText) -> Self {
        Self::from_text(&ocr.text, ocr.confidence)
    }
}

/// Runs an [`OcrEngine`] over cropped object images.
pub struct TextExtractor<O: OcrEngine> {
    engine: O,
    min_confidence: f32,
}

impl<O: OcrEngine> TextExtractor<O> {
    /// Creates an extractor using the `ocr_processing` minimum confidence.
    pub fn new(engine: O, config: &OcrConfig) -> Self {
        Self::with_min_confidence(engine, config.min_confidence)
    }

    pub fn with_min_confidence(engine: O, min_confidence: f32) -> Self {
        Self {
            engine,
            min_confidence,
        }
    }

    pub fn min_confidence(&self) -> f32 {
        self.min_confidence
    }

    /// Recognizes and filters the text in `image_path`, surfacing OCR errors.
    pub fn try_extract_text(&self, image_path: &Path) -> CoreResult<OcrText> {
        let tokens = self.engine.recognize(image_path)?;
        Ok(OcrText::from_tokens(&tokens, self.min_confidence))
    }

    /// Like [`try_extract_text`](Self::try_extract_text), but any error is
    /// logged and replaced by [`OcrText::empty`].
    pub fn extract_text(&self, image_path: &Path) -> OcrText {
        match self.try_extract_text(image_path) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Error extracting text from {}: {}", image_path.display(), e);
                OcrText::empty()
            }
        }
    }

    /// Extracts text from `image_path` and parses it into product fields.
    pub fn process_product(&self, image_path: &Path) -> ProductInfo {
        ProductInfo::from(self.extract_text(image_path))
    }
}
