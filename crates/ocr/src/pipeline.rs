use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::extract::Extractor;
use crate::preprocess::{self, PreprocessError};
use crate::recognizer::{OcrBackend, OcrError};
use crate::rotation;
use plateread_core::{FailureKind, NameplateRecord, RotationMode};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to load image: {0}")]
    Load(#[from] PreprocessError),
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
}

impl PipelineError {
    /// Stage classification for the per-run failure list.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            PipelineError::Load(_) => FailureKind::Read,
            PipelineError::Ocr(_) => FailureKind::Ocr,
        }
    }
}

/// The outcome of one image: the extracted record plus the raw OCR text,
/// which the caller writes to the image's companion file.
#[derive(Debug)]
pub struct ProcessedImage {
    pub record: NameplateRecord,
    pub ocr_text: String,
    /// File stem of the source image, for naming companion outputs.
    pub stem: String,
}

/// Orchestrates: load → rotation-select (preprocess + OCR) → field
/// extraction → record.
pub struct NameplatePipeline<R: OcrBackend> {
    recognizer: R,
    preprocessed_dir: Option<PathBuf>,
    rotation_mode: RotationMode,
}

impl<R: OcrBackend> NameplatePipeline<R> {
    pub fn new(
        recognizer: R,
        preprocessed_dir: Option<PathBuf>,
        rotation_mode: RotationMode,
    ) -> Self {
        Self { recognizer, preprocessed_dir, rotation_mode }
    }

    /// Process one staged image file into a record. Exactly one record per
    /// successful call; failures are returned for the caller to aggregate.
    pub fn process_image(&self, path: &Path) -> Result<ProcessedImage, PipelineError> {
        let image = preprocess::load_image(path)?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        let best = rotation::select_best(
            &self.recognizer,
            &image,
            self.rotation_mode,
            self.preprocessed_dir.as_deref(),
            &stem,
        )?;
        debug!(
            rotation = best.rotation_deg,
            confidence = best.confidence,
            "Selected OCR result for {}",
            path.display()
        );

        let fields = Extractor::extract(&best.text);
        let record = NameplateRecord {
            source_file: path.display().to_string(),
            manufacturer: fields.manufacturer,
            model_number: fields.model_number,
            serial_number: fields.serial_number,
            capacity: fields.capacity,
            date_of_manufacture: fields.date_of_manufacture,
            ocr_confidence: if best.confidence >= 0.0 {
                format!("{:.3}", best.confidence)
            } else {
                String::new()
            },
            rotation_deg: best.rotation_deg.to_string(),
            extra: Default::default(),
        };

        Ok(ProcessedImage { record, ocr_text: best.text, stem })
    }
}
