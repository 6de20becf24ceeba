//! Pure-Rust OCR backend using the `ocrs` engine with `rten` neural models.
//!
//! The engine needs two model files, resolved from `$XDG_CACHE_HOME/ocrs`
//! (falling back to `~/.cache/ocrs`) by default. Running `ocrs-cli` once
//! downloads them. Missing models are a fatal configuration error reported
//! before any image is processed.

use std::path::{Path, PathBuf};

use ocrs::{ImageSource, OcrEngine as OcrsEngine, OcrEngineParams};
use rten::Model;
use tracing::info;

use crate::recognizer::{OcrBackend, OcrError, Recognition};

const DETECTION_MODEL_FILENAME: &str = "text-detection.rten";
const RECOGNITION_MODEL_FILENAME: &str = "text-recognition.rten";

fn default_model_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
        PathBuf::from(xdg).join("ocrs")
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".cache").join("ocrs")
    } else {
        PathBuf::from("ocrs-models")
    }
}

/// Model file locations for the ocrs engine.
#[derive(Debug, Clone)]
pub struct OcrsConfig {
    pub detection_model_path: PathBuf,
    pub recognition_model_path: PathBuf,
}

impl Default for OcrsConfig {
    fn default() -> Self {
        Self::from_dir(default_model_dir())
    }
}

impl OcrsConfig {
    /// Expects `dir` to contain `text-detection.rten` and
    /// `text-recognition.rten`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            detection_model_path: dir.join(DETECTION_MODEL_FILENAME),
            recognition_model_path: dir.join(RECOGNITION_MODEL_FILENAME),
        }
    }

    fn validate(&self) -> Result<(), OcrError> {
        for path in [&self.detection_model_path, &self.recognition_model_path] {
            if !path.exists() {
                return Err(OcrError::Init(format!(
                    "model not found at {}; run `ocrs-cli` once to download models",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

/// OCR backend over the `ocrs` engine. Models are loaded once at
/// construction; `ocrs` exposes no aggregate confidence, so every result
/// reports the sentinel.
pub struct OcrsRecognizer {
    engine: OcrsEngine,
}

impl std::fmt::Debug for OcrsRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrsRecognizer").finish_non_exhaustive()
    }
}

impl OcrsRecognizer {
    pub fn new(config: OcrsConfig) -> Result<Self, OcrError> {
        config.validate()?;

        info!(
            detection = %config.detection_model_path.display(),
            recognition = %config.recognition_model_path.display(),
            "Loading ocrs models"
        );
        let detection_model = Model::load_file(&config.detection_model_path)
            .map_err(|e| OcrError::Init(format!("failed to load detection model: {e}")))?;
        let recognition_model = Model::load_file(&config.recognition_model_path)
            .map_err(|e| OcrError::Init(format!("failed to load recognition model: {e}")))?;

        let engine = OcrsEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|e| OcrError::Init(format!("failed to initialize ocrs engine: {e}")))?;

        Ok(Self { engine })
    }

    pub fn with_defaults() -> Result<Self, OcrError> {
        Self::new(OcrsConfig::default())
    }
}

impl OcrBackend for OcrsRecognizer {
    fn recognize(&self, image_bytes: &[u8]) -> Result<Recognition, OcrError> {
        let img = image::load_from_memory(image_bytes)
            .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();

        let source = ImageSource::from_bytes(rgb.as_raw(), (width, height))
            .map_err(|e| OcrError::Engine(format!("failed to create image source: {e}")))?;
        let input = self
            .engine
            .prepare_input(source)
            .map_err(|e| OcrError::Engine(format!("OCR preprocessing failed: {e}")))?;
        let text = self
            .engine
            .get_text(&input)
            .map_err(|e| OcrError::Engine(format!("OCR recognition failed: {e}")))?;

        Ok(Recognition::without_confidence(text))
    }
}
