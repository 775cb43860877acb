//! Decode/encode seam between the batch runner and the filesystem.
//!
//! The [`ImageCodec`] trait is the only way the batch runner touches
//! image files, so tests can substitute a codec that records calls or
//! fails on demand. [`FsCodec`] is the production implementation on top
//! of the `image` crate.

use std::path::Path;

use tagprep_pipeline::GrayImage;

/// Trait for reading and writing single-channel images.
pub trait ImageCodec {
    /// Decode the image at `path` into an 8-bit grayscale buffer.
    ///
    /// # Errors
    ///
    /// Returns an [`image::ImageError`] if the file cannot be opened or
    /// decoded.
    fn read(&self, path: &Path) -> Result<GrayImage, image::ImageError>;

    /// Encode `image` to `path`. The format follows the path extension.
    ///
    /// # Errors
    ///
    /// Returns an [`image::ImageError`] if encoding or the filesystem
    /// write fails.
    fn write(&self, image: &GrayImage, path: &Path) -> Result<(), image::ImageError>;
}

/// [`ImageCodec`] backed by the local filesystem.
///
/// Color inputs are converted to luma on read; output format is
/// selected from the output file extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsCodec;

impl ImageCodec for FsCodec {
    fn read(&self, path: &Path) -> Result<GrayImage, image::ImageError> {
        Ok(image::open(path)?.to_luma8())
    }

    fn write(&self, image: &GrayImage, path: &Path) -> Result<(), image::ImageError> {
        image.save(path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn png_roundtrip_preserves_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.png");
        let img = GrayImage::from_fn(5, 3, |x, y| {
            #[allow(clippy::cast_possible_truncation)]
            image::Luma([(x * 40 + y) as u8])
        });
        FsCodec.write(&img, &path).unwrap();
        assert_eq!(FsCodec.read(&path).unwrap(), img);
    }

    #[test]
    fn color_input_is_converted_to_luma() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("color.png");
        image::RgbImage::from_pixel(2, 2, image::Rgb([255, 255, 255]))
            .save(&path)
            .unwrap();
        let gray = FsCodec.read(&path).unwrap();
        assert!(gray.pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn missing_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FsCodec.read(&dir.path().join("missing.png")).is_err());
    }

    #[test]
    fn unknown_extension_fails_to_write() {
        let dir = tempfile::tempdir().unwrap();
        let img = GrayImage::new(2, 2);
        assert!(FsCodec.write(&img, &dir.path().join("out.unknownext")).is_err());
    }
}
