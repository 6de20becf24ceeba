//! Input normalization: stage every recognized image into the converted
//! directory, decoding HEIC/HEIF to PNG along the way.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use plateread_core::{FailureKind, RunFailure};

const IMAGE_EXTENSIONS: &[&str] = &[
    "heic", "heif", "jpg", "jpeg", "png", "bmp", "tif", "tiff",
];

const HEIC_EXTENSIONS: &[&str] = &["heic", "heif"];

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HEIC decode failed: {0}")]
    Heic(String),
    #[error("Failed to encode converted image: {0}")]
    Encode(#[from] image::ImageError),
    #[error("HEIC support not compiled in — rebuild with the `heic` feature")]
    HeicUnavailable,
}

fn extension_lowercase(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_lowercase())
}

/// Whether the file's extension marks it as a supported image format.
pub fn is_image_file(path: &Path) -> bool {
    extension_lowercase(path)
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

fn is_heic(path: &Path) -> bool {
    extension_lowercase(path)
        .map(|ext| HEIC_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Depth-first directory walk with lexicographically sorted entries, so the
/// record order of a run is deterministic.
fn walk_sorted(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .collect();
    entries.sort();
    for path in entries {
        if path.is_dir() {
            walk_sorted(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

/// Stage every image under `input_dir` into `converted_dir` and return the
/// staged paths in traversal order.
///
/// HEIC/HEIF files are converted to `<stem>.png`; other recognized formats
/// are copied as-is. Both steps are skipped when the target already exists,
/// so reruns reuse prior conversions. Files that fail to convert or copy
/// are recorded in `failures` and skipped; they never abort the run.
pub fn prepare_images(
    input_dir: &Path,
    converted_dir: &Path,
    failures: &mut Vec<RunFailure>,
) -> Result<Vec<PathBuf>, NormalizeError> {
    fs::create_dir_all(converted_dir)?;

    let mut files = Vec::new();
    walk_sorted(input_dir, &mut files)?;

    let mut ready = Vec::new();
    for path in files.iter().filter(|p| is_image_file(p)) {
        let staged = if is_heic(path) {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "image".to_string());
            let out = converted_dir.join(format!("{stem}.png"));
            if !out.exists() {
                if let Err(e) = convert_heic_to_png(path, &out) {
                    warn!("Failed to convert {}: {e}", path.display());
                    failures.push(RunFailure::new(path, FailureKind::Convert, e.to_string()));
                    continue;
                }
            }
            out
        } else {
            let name = match path.file_name() {
                Some(name) => name,
                None => continue,
            };
            let out = converted_dir.join(name);
            if !out.exists() {
                if let Err(e) = fs::copy(path, &out) {
                    warn!("Failed to copy {}: {e}", path.display());
                    failures.push(RunFailure::new(path, FailureKind::Copy, e.to_string()));
                    continue;
                }
            }
            out
        };
        ready.push(staged);
    }

    Ok(ready)
}

/// Decode a HEIC/HEIF file and write it as PNG.
#[cfg(feature = "heic")]
pub fn convert_heic_to_png(src: &Path, dest: &Path) -> Result<(), NormalizeError> {
    use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

    let path = src
        .to_str()
        .ok_or_else(|| NormalizeError::Heic("non-UTF-8 path".into()))?;
    let lib_heif = LibHeif::new();
    let ctx =
        HeifContext::read_from_file(path).map_err(|e| NormalizeError::Heic(e.to_string()))?;
    let handle = ctx
        .primary_image_handle()
        .map_err(|e| NormalizeError::Heic(e.to_string()))?;
    let decoded = lib_heif
        .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)
        .map_err(|e| NormalizeError::Heic(e.to_string()))?;

    let planes = decoded.planes();
    let interleaved = planes
        .interleaved
        .ok_or_else(|| NormalizeError::Heic("no interleaved RGB plane".into()))?;
    let (width, height) = (interleaved.width, interleaved.height);
    let stride = interleaved.stride;

    // Rows may be padded; copy them out at the pixel width.
    let mut rgb = image::RgbImage::new(width, height);
    for y in 0..height {
        let row = &interleaved.data[y as usize * stride..][..width as usize * 3];
        for x in 0..width {
            let i = x as usize * 3;
            rgb.put_pixel(x, y, image::Rgb([row[i], row[i + 1], row[i + 2]]));
        }
    }

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    rgb.save(dest)?;
    Ok(())
}

#[cfg(not(feature = "heic"))]
pub fn convert_heic_to_png(_src: &Path, _dest: &Path) -> Result<(), NormalizeError> {
    Err(NormalizeError::HeicUnavailable)
}
