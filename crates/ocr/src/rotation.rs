use image::DynamicImage;
use std::path::Path;
use tracing::{debug, warn};

use crate::preprocess;
use crate::recognizer::{OcrBackend, OcrError};
use plateread_core::RotationMode;

/// The winning OCR attempt across the candidate rotations.
#[derive(Debug, Clone, PartialEq)]
pub struct BestOcr {
    pub text: String,
    pub confidence: f32,
    pub rotation_deg: u32,
}

/// Run preprocess + OCR for each candidate rotation and keep the result
/// with the strictly greatest confidence.
///
/// The first successful attempt seeds the best result; later attempts must
/// beat it strictly. Ties therefore keep the earliest-tried rotation, and a
/// run where no attempt reports a confidence keeps rotation 0's text.
/// Per-attempt errors only surface if every attempt fails.
pub fn select_best<R: OcrBackend>(
    backend: &R,
    image: &DynamicImage,
    mode: RotationMode,
    save_dir: Option<&Path>,
    stem: &str,
) -> Result<BestOcr, OcrError> {
    let mut best: Option<BestOcr> = None;
    let mut last_err: Option<OcrError> = None;

    for &rot in mode.candidates() {
        let processed = preprocess::preprocess_for_ocr(image, rot);

        if let Some(dir) = save_dir {
            let suffix = if rot == 0 { String::new() } else { format!("_r{rot}") };
            let out = dir.join(format!("{stem}{suffix}_prep.png"));
            if let Err(e) = preprocess::save_png(&processed, &out) {
                warn!("Failed to save preprocessed image {}: {e}", out.display());
            }
        }

        let png = match preprocess::encode_png(&processed) {
            Ok(bytes) => bytes,
            Err(e) => {
                last_err = Some(OcrError::ImageDecode(e.to_string()));
                continue;
            }
        };

        match backend.recognize(&png) {
            Ok(result) => {
                let replace = match &best {
                    Some(b) => result.confidence > b.confidence,
                    None => true,
                };
                if replace {
                    best = Some(BestOcr {
                        text: result.text,
                        confidence: result.confidence,
                        rotation_deg: rot,
                    });
                }
            }
            Err(e) => {
                debug!("OCR attempt at {rot}° failed: {e}");
                last_err = Some(e);
            }
        }
    }

    best.ok_or_else(|| {
        last_err.unwrap_or_else(|| OcrError::Engine("no rotation attempt produced a result".into()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::{MockRecognizer, Recognition, ScriptedRecognizer};
    use image::{GrayImage, ImageBuffer, Luma};

    fn tiny_image() -> DynamicImage {
        let img: GrayImage = ImageBuffer::from_fn(8, 8, |_, _| Luma([200u8]));
        DynamicImage::ImageLuma8(img)
    }

    #[test]
    fn highest_confidence_rotation_wins() {
        let backend = ScriptedRecognizer::new([
            Recognition::new("r0", 0.2),
            Recognition::new("r90", 0.9),
            Recognition::new("r180", 0.5),
            Recognition::new("r270", 0.1),
        ]);
        let best =
            select_best(&backend, &tiny_image(), RotationMode::Auto, None, "img").unwrap();
        assert_eq!(best.rotation_deg, 90);
        assert_eq!(best.text, "r90");
        assert_eq!(best.confidence, 0.9);
    }

    #[test]
    fn ties_keep_the_earliest_rotation() {
        let backend = ScriptedRecognizer::new([
            Recognition::new("r0", 0.5),
            Recognition::new("r90", 0.5),
            Recognition::new("r180", 0.5),
            Recognition::new("r270", 0.5),
        ]);
        let best =
            select_best(&backend, &tiny_image(), RotationMode::Auto, None, "img").unwrap();
        assert_eq!(best.rotation_deg, 0);
        assert_eq!(best.text, "r0");
    }

    #[test]
    fn all_sentinel_confidences_keep_rotation_zero() {
        let backend = ScriptedRecognizer::new([
            Recognition::without_confidence("r0"),
            Recognition::without_confidence("r90"),
            Recognition::without_confidence("r180"),
            Recognition::without_confidence("r270"),
        ]);
        let best =
            select_best(&backend, &tiny_image(), RotationMode::Auto, None, "img").unwrap();
        assert_eq!(best.rotation_deg, 0);
        assert_eq!(best.text, "r0");
    }

    #[test]
    fn real_confidence_beats_sentinel() {
        let backend = ScriptedRecognizer::new([
            Recognition::without_confidence("r0"),
            Recognition::without_confidence("r90"),
            Recognition::new("r180", 0.05),
            Recognition::without_confidence("r270"),
        ]);
        let best =
            select_best(&backend, &tiny_image(), RotationMode::Auto, None, "img").unwrap();
        assert_eq!(best.rotation_deg, 180);
    }

    #[test]
    fn none_mode_tries_only_the_unrotated_image() {
        // A single scripted result; a second attempt would exhaust the script.
        let backend = ScriptedRecognizer::new([Recognition::new("upright", 0.3)]);
        let best =
            select_best(&backend, &tiny_image(), RotationMode::None, None, "img").unwrap();
        assert_eq!(best.rotation_deg, 0);
        assert_eq!(best.text, "upright");
    }

    #[test]
    fn all_attempts_failing_surfaces_an_error() {
        // Empty script: every recognize call errors.
        let backend = ScriptedRecognizer::new([]);
        let result = select_best(&backend, &tiny_image(), RotationMode::Auto, None, "img");
        assert!(result.is_err());
    }

    #[test]
    fn preprocessed_attempts_are_saved_when_requested() {
        let dir = tempfile::tempdir().unwrap();
        let backend = MockRecognizer::new("text", 0.5);
        select_best(
            &backend,
            &tiny_image(),
            RotationMode::Auto,
            Some(dir.path()),
            "photo",
        )
        .unwrap();

        assert!(dir.path().join("photo_prep.png").exists());
        for rot in [90, 180, 270] {
            assert!(dir.path().join(format!("photo_r{rot}_prep.png")).exists());
        }
    }
}
