use std::collections::VecDeque;
use std::sync::Mutex;
use thiserror::Error;

/// Sentinel reported when an engine does not expose a confidence score.
/// Real confidences lie in [0, 1].
pub const CONFIDENCE_UNAVAILABLE: f32 = -1.0;

/// Text recognized from one preprocessed image, with the engine's mean
/// confidence (or [`CONFIDENCE_UNAVAILABLE`]).
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    pub text: String,
    pub confidence: f32,
}

impl Recognition {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self { text: text.into(), confidence }
    }

    pub fn without_confidence(text: impl Into<String>) -> Self {
        Self { text: text.into(), confidence: CONFIDENCE_UNAVAILABLE }
    }

    pub fn has_confidence(&self) -> bool {
        self.confidence >= 0.0
    }
}

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("OCR engine initialization failed: {0}")]
    Init(String),
    #[error("OCR engine not available: {0}")]
    NotAvailable(String),
}

/// Abstraction over an OCR backend.
/// Implementations accept PNG image bytes and return the recognized text
/// plus a confidence score.
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, image_bytes: &[u8]) -> Result<Recognition, OcrError>;
}

impl<T: OcrBackend + ?Sized> OcrBackend for Box<T> {
    fn recognize(&self, image_bytes: &[u8]) -> Result<Recognition, OcrError> {
        (**self).recognize(image_bytes)
    }
}

// ── Mock backends (always available, used for tests) ──────────────────────────

/// Returns a pre-set result for every image — useful for unit testing the
/// extraction pipeline without an engine installed.
pub struct MockRecognizer {
    pub result: Recognition,
}

impl MockRecognizer {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self { result: Recognition::new(text, confidence) }
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<Recognition, OcrError> {
        Ok(self.result.clone())
    }
}

/// Returns a queued sequence of results, one per call — used to test the
/// rotation selector, where each call corresponds to one candidate rotation.
pub struct ScriptedRecognizer {
    script: Mutex<VecDeque<Recognition>>,
}

impl ScriptedRecognizer {
    pub fn new(results: impl IntoIterator<Item = Recognition>) -> Self {
        Self { script: Mutex::new(results.into_iter().collect()) }
    }
}

impl OcrBackend for ScriptedRecognizer {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<Recognition, OcrError> {
        self.script
            .lock()
            .expect("script lock poisoned")
            .pop_front()
            .ok_or_else(|| OcrError::Engine("script exhausted".into()))
    }
}

// ── Tesseract backend (optional, gated behind `tesseract` feature) ─────────────

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use super::{OcrBackend, OcrError, Recognition, CONFIDENCE_UNAVAILABLE};
    use leptess::LepTess;

    pub struct TesseractRecognizer {
        data_path: Option<String>,
        lang: String,
    }

    impl TesseractRecognizer {
        /// Language codes are joined with `+` per Tesseract convention.
        pub fn new(data_path: Option<String>, languages: &[String]) -> Self {
            let lang = if languages.is_empty() {
                "eng".to_string()
            } else {
                languages.join("+")
            };
            Self { data_path, lang }
        }
    }

    impl OcrBackend for TesseractRecognizer {
        fn recognize(&self, image_bytes: &[u8]) -> Result<Recognition, OcrError> {
            let mut lt = LepTess::new(self.data_path.as_deref(), &self.lang)
                .map_err(|e| OcrError::Init(e.to_string()))?;
            lt.set_image_from_mem(image_bytes)
                .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
            let text = lt
                .get_utf8_text()
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            // mean_text_conf averages Tesseract's word confidences (0-100).
            let confidence = if text.trim().is_empty() {
                CONFIDENCE_UNAVAILABLE
            } else {
                lt.mean_text_conf() as f32 / 100.0
            };
            Ok(Recognition::new(text, confidence))
        }
    }
}
