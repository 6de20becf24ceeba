pub mod extract;
pub mod normalize;
#[cfg(feature = "ocrs")]
pub mod ocrs_backend;
pub mod pipeline;
pub mod preprocess;
pub mod recognizer;
pub mod rotation;

pub use extract::{Extractor, NameplateFields};
pub use normalize::{is_image_file, prepare_images, NormalizeError};
#[cfg(feature = "ocrs")]
pub use ocrs_backend::{OcrsConfig, OcrsRecognizer};
pub use pipeline::{NameplatePipeline, PipelineError, ProcessedImage};
pub use preprocess::{preprocess_for_ocr, PreprocessError};
pub use recognizer::{
    MockRecognizer, OcrBackend, OcrError, Recognition, ScriptedRecognizer, CONFIDENCE_UNAVAILABLE,
};
#[cfg(feature = "tesseract")]
pub use recognizer::tesseract_backend::TesseractRecognizer;
pub use rotation::{select_best, BestOcr};
