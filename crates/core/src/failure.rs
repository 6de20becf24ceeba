use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// What went wrong with one input file. Per-file failures never abort a
/// run; they are collected and reported in the end-of-run summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// HEIC/HEIF conversion failed (or support was not compiled in).
    Convert,
    /// Staging copy into the converted directory failed.
    Copy,
    /// The staged image could not be read or decoded.
    Read,
    /// Every OCR attempt for the image errored.
    Ocr,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Convert => write!(f, "convert"),
            FailureKind::Copy => write!(f, "copy"),
            FailureKind::Read => write!(f, "read"),
            FailureKind::Ocr => write!(f, "ocr"),
        }
    }
}

/// One skipped file, with the stage it failed at and the underlying message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunFailure {
    pub path: PathBuf,
    pub kind: FailureKind,
    pub message: String,
}

impl RunFailure {
    pub fn new(path: impl Into<PathBuf>, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}]: {}",
            self.path.display(),
            self.kind,
            self.message
        )
    }
}
