//! Conversion of processed buffers into displayable images.
//!
//! Presentation code (viewers, previews) consumes these; the pipeline
//! never does.

use image::{DynamicImage, ImageEncoder, RgbaImage};
use tagprep_pipeline::GrayImage;

/// Errors that can occur during display conversion.
#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    /// PNG encoding failed.
    #[error("PNG encoding failed: {0}")]
    PngEncode(#[from] image::ImageError),
}

/// Expand a grayscale buffer through an opaque gray palette: each value
/// `v` becomes `(v, v, v, 255)`.
#[must_use = "returns the expanded image"]
pub fn to_display_rgba(image: &GrayImage) -> RgbaImage {
    DynamicImage::ImageLuma8(image.clone()).to_rgba8()
}

/// Encode a grayscale buffer as an 8-bit grayscale PNG.
///
/// # Errors
///
/// Returns [`DisplayError::PngEncode`] if encoding fails.
pub fn to_png_bytes(image: &GrayImage) -> Result<Vec<u8>, DisplayError> {
    let mut png_bytes = Vec::new();
    image::codecs::png::PngEncoder::new(&mut png_bytes).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::L8,
    )?;
    Ok(png_bytes)
}
