use image::imageops::FilterType;
use image::{DynamicImage, GrayImage};
use imageproc::contrast::equalize_histogram;
use imageproc::filter::{bilateral_filter, sharpen_gaussian};
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Failed to load image: {0}")]
    Load(#[from] image::ImageError),
    #[error("Failed to encode processed image: {0}")]
    Encode(String),
}

/// Nameplate photos are often full-resolution phone captures; OCR engines
/// gain nothing above roughly this size.
const MAX_DIMENSION: u32 = 2800;

/// Load an image file for processing.
pub fn load_image(path: &Path) -> Result<DynamicImage, PreprocessError> {
    Ok(image::open(path)?)
}

/// Rotate clockwise by a multiple of 90 degrees. Other angles are a no-op.
pub fn rotate(img: &DynamicImage, degrees: u32) -> DynamicImage {
    match degrees % 360 {
        90 => img.rotate90(),
        180 => img.rotate180(),
        270 => img.rotate270(),
        _ => img.clone(),
    }
}

/// The fixed filter chain: rotate, downscale very large images, grayscale,
/// contrast equalization, unsharp-mask sharpening, bilateral denoise.
pub fn preprocess_for_ocr(img: &DynamicImage, rotation_deg: u32) -> GrayImage {
    let img = rotate(img, rotation_deg);
    let img = if img.width() > MAX_DIMENSION || img.height() > MAX_DIMENSION {
        img.resize(MAX_DIMENSION, MAX_DIMENSION, FilterType::Lanczos3)
    } else {
        img
    };

    let gray = img.to_luma8();
    let equalized = equalize_histogram(&gray);
    let sharpened = sharpen_gaussian(&equalized, 1.0, 0.5);
    bilateral_filter(&sharpened, 7, 50.0, 50.0)
}

/// Encode a processed image as PNG bytes ready for an OCR backend.
pub fn encode_png(img: &GrayImage) -> Result<Vec<u8>, PreprocessError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| PreprocessError::Encode(e.to_string()))?;
    Ok(buf)
}

/// Save a processed image, creating parent directories as needed.
pub fn save_png(img: &GrayImage, path: &Path) -> Result<(), PreprocessError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| PreprocessError::Encode(e.to_string()))?;
    }
    img.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma};

    fn solid_gray(width: u32, height: u32, value: u8) -> DynamicImage {
        let img: GrayImage = ImageBuffer::from_fn(width, height, |_, _| Luma([value]));
        DynamicImage::ImageLuma8(img)
    }

    fn gradient_gray(width: u32, height: u32) -> DynamicImage {
        let img: GrayImage =
            ImageBuffer::from_fn(width, height, |x, _| Luma([(x * 255 / width) as u8]));
        DynamicImage::ImageLuma8(img)
    }

    #[test]
    fn rotate_90_swaps_dimensions() {
        let img = solid_gray(20, 10, 128);
        let rotated = rotate(&img, 90);
        assert_eq!((rotated.width(), rotated.height()), (10, 20));
        let back = rotate(&img, 180);
        assert_eq!((back.width(), back.height()), (20, 10));
    }

    #[test]
    fn rotate_0_is_identity() {
        let img = gradient_gray(16, 8);
        let rotated = rotate(&img, 0);
        assert_eq!(rotated.to_luma8(), img.to_luma8());
    }

    #[test]
    fn preprocess_uniform_image_does_not_panic() {
        let img = solid_gray(32, 32, 128);
        let result = preprocess_for_ocr(&img, 0);
        assert_eq!((result.width(), result.height()), (32, 32));
    }

    #[test]
    fn preprocess_applies_rotation() {
        let img = solid_gray(30, 12, 200);
        let result = preprocess_for_ocr(&img, 270);
        assert_eq!((result.width(), result.height()), (12, 30));
    }

    #[test]
    fn large_image_is_resized() {
        let img = solid_gray(3000, 1500, 200);
        let result = preprocess_for_ocr(&img, 0);
        assert!(result.width() <= 2800 && result.height() <= 2800);
    }

    #[test]
    fn encode_png_produces_png_header() {
        let img = solid_gray(4, 4, 100).to_luma8();
        let bytes = encode_png(&img).unwrap();
        assert_eq!(&bytes[..4], b"\x89PNG");
    }

    #[test]
    fn save_png_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let img = solid_gray(4, 4, 50).to_luma8();
        let out = dir.path().join("nested").join("out_prep.png");
        save_png(&img, &out).unwrap();
        assert!(out.exists());
    }
}
