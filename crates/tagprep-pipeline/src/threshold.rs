//! Adaptive (local Gaussian mean) thresholding and mask blending.
//!
//! Each pixel is compared against the Gaussian-weighted mean of its
//! `BLOCK_SIZE x BLOCK_SIZE` neighbourhood. Pixels brighter than their
//! local mean become foreground (255), the rest background (0). This
//! adapts to uneven illumination where a single global threshold would
//! swallow whole regions.
//!
//! The pipeline either keeps the binary mask as its output, or blends
//! it back into the original with fixed weights so tag structure is
//! sharpened without losing the grayscale detail.

use image::{GrayImage, ImageBuffer, Luma};
use imageproc::definitions::Image;
use imageproc::filter::separable_filter_equal;

/// Side length of the square neighbourhood used for the local mean.
pub const BLOCK_SIZE: u32 = 51;

/// Value subtracted from the local mean before comparison.
pub const OFFSET: i16 = 0;

/// Intensity assigned to foreground pixels of the mask.
pub const MAX_VALUE: u8 = 255;

/// Weight of the original pixel in the blended output.
pub const WEIGHT_ORIGINAL: f64 = 0.7;

/// Weight of the mask pixel in the blended output.
pub const WEIGHT_MASK: f64 = 0.3;

/// Run the threshold stage.
///
/// With `binary == true` the result is the raw binary mask. Otherwise
/// the mask is blended into `image` with [`WEIGHT_ORIGINAL`] and
/// [`WEIGHT_MASK`].
#[must_use = "returns the thresholded image"]
pub fn threshold_and_blend(image: &GrayImage, binary: bool) -> GrayImage {
    let mask = adaptive_threshold(image, BLOCK_SIZE, OFFSET);
    if binary { mask } else { blend(image, &mask) }
}

/// Binary mask: 255 where a pixel exceeds its local Gaussian mean minus
/// `offset`, 0 elsewhere.
///
/// `block_size` must be odd so the neighbourhood has a centre pixel.
#[must_use = "returns the binary mask"]
pub fn adaptive_threshold(image: &GrayImage, block_size: u32, offset: i16) -> GrayImage {
    let mean = local_mean(image, block_size);
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let threshold = i16::from(mean.get_pixel(x, y).0[0]) - offset;
        if i16::from(image.get_pixel(x, y).0[0]) > threshold {
            Luma([MAX_VALUE])
        } else {
            Luma([0])
        }
    })
}

/// Blend a mask into the original: `round(0.7 * original + 0.3 * mask)`.
///
/// Both images must have the same dimensions.
#[must_use = "returns the blended image"]
pub fn blend(original: &GrayImage, mask: &GrayImage) -> GrayImage {
    debug_assert_eq!(original.dimensions(), mask.dimensions());
    GrayImage::from_fn(original.width(), original.height(), |x, y| {
        Luma([blend_value(
            original.get_pixel(x, y).0[0],
            mask.get_pixel(x, y).0[0],
        )])
    })
}

/// Weighted blend of a single original/mask pixel pair.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn blend_value(original: u8, mask: u8) -> u8 {
    let value = WEIGHT_MASK.mul_add(f64::from(mask), WEIGHT_ORIGINAL * f64::from(original));
    value.round().clamp(0.0, 255.0) as u8
}

/// Gaussian-weighted local mean over a `block_size x block_size`
/// window, rounded to 8 bits.
///
/// Both separable passes run on an `f32` copy so the intermediate
/// result is not quantized. Samples outside the image replicate the
/// nearest edge pixel.
#[must_use = "returns the local mean image"]
pub fn local_mean(image: &GrayImage, block_size: u32) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    #[allow(clippy::cast_possible_truncation)]
    let kernel: Vec<f32> = gaussian_kernel(block_size)
        .into_iter()
        .map(|w| w as f32)
        .collect();
    let samples: Image<Luma<f32>> = ImageBuffer::from_fn(width, height, |x, y| {
        Luma([f32::from(image.get_pixel(x, y).0[0])])
    });
    let mean = separable_filter_equal(&samples, &kernel);

    GrayImage::from_fn(width, height, |x, y| {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Luma([mean.get_pixel(x, y).0[0].round().clamp(0.0, 255.0) as u8])
    })
}

/// Normalized 1-D Gaussian kernel with `size` taps.
///
/// The standard deviation is derived from the size as
/// `0.3 * ((size - 1) / 2 - 1) + 0.8`, which gives 8.0 for the
/// 51-tap kernel used by the pipeline.
#[must_use]
pub fn gaussian_kernel(size: u32) -> Vec<f64> {
    let size = size.max(1);
    let half = f64::from(size - 1) * 0.5;
    let sigma = 0.3f64.mul_add(half - 1.0, 0.8);
    let denom = 2.0 * sigma * sigma;

    let weights: Vec<f64> = (0..size)
        .map(|i| {
            let d = f64::from(i) - half;
            (-(d * d) / denom).exp()
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}
