use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Policy controlling which image rotations are attempted during OCR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationMode {
    /// Try 0°, 90°, 180° and 270°, keeping the best-scoring result.
    Auto,
    /// Only the image as captured.
    None,
}

impl RotationMode {
    /// Candidate rotations in evaluation order. 0° is always first, so ties
    /// in the selector keep the unrotated image.
    pub fn candidates(self) -> &'static [u32] {
        match self {
            RotationMode::Auto => &[0, 90, 180, 270],
            RotationMode::None => &[0],
        }
    }
}

impl fmt::Display for RotationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotationMode::Auto => write!(f, "auto"),
            RotationMode::None => write!(f, "none"),
        }
    }
}

impl FromStr for RotationMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(RotationMode::Auto),
            "none" => Ok(RotationMode::None),
            other => Err(format!("Unknown rotation mode: '{other}'")),
        }
    }
}

/// Which OCR engine backs the run. Chosen once at startup and passed into
/// the pipeline as an explicit value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    /// Pure-Rust ocrs engine. Reports no confidence score.
    Ocrs,
    /// Tesseract via leptess. Reports averaged word confidences.
    Tesseract,
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineKind::Ocrs => write!(f, "ocrs"),
            EngineKind::Tesseract => write!(f, "tesseract"),
        }
    }
}

impl FromStr for EngineKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ocrs" => Ok(EngineKind::Ocrs),
            "tesseract" => Ok(EngineKind::Tesseract),
            other => Err(format!("Invalid engine: '{other}'")),
        }
    }
}

/// Split a comma-separated language list, dropping empty entries.
pub fn parse_languages(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}
