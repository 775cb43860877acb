//! tagprep-pipeline: Pure grayscale preprocessing stages (sans-IO).
//!
//! Normalizes an image for a downstream tag classifier through:
//! border padding -> tiled contrast normalization -> adaptive
//! threshold / blend. Each stage is optional; enabled stages always
//! run in that order.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! `GrayImage` buffers. Decoding, encoding, batch orchestration, and
//! the output manifest live in `tagprep-io`.

pub mod border;
pub mod contrast;
pub mod stage;
pub mod threshold;
pub mod types;

pub use border::Margins;
pub use stage::{ImageStage, Stage};
pub use types::{ConfigError, GrayImage, PipelineConfig, TAG_HEIGHT, TAG_WIDTH};

/// Apply `stages` to `image` in order.
///
/// The buffer is moved through each stage; the returned image is the
/// output of the last stage (or the input when `stages` is empty).
#[must_use = "returns the processed image"]
pub fn apply_stages(image: GrayImage, stages: &[Stage]) -> GrayImage {
    stages.iter().fold(image, |image, stage| {
        let before = image.dimensions();
        let out = stage.apply(image);
        tracing::trace!(%stage, ?before, after = ?out.dimensions(), "stage applied");
        out
    })
}

/// Run every stage enabled by `config` on `image`.
///
/// Convenience wrapper around [`PipelineConfig::stages`] and
/// [`apply_stages`] for one-off use. Batch callers should build the
/// stage list once and reuse it.
#[must_use = "returns the processed image"]
pub fn process(image: GrayImage, config: &PipelineConfig) -> GrayImage {
    apply_stages(image, &config.stages())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A patterned image that exercises every stage.
    fn patterned(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            #[allow(clippy::cast_possible_truncation)]
            image::Luma([((x * 3 + y * 5) % 200 + 20) as u8])
        })
    }

    #[test]
    fn empty_stage_list_is_identity() {
        let img = patterned(10, 10);
        assert_eq!(apply_stages(img.clone(), &[]), img);
    }

    #[test]
    fn default_config_only_pads() {
        let img = patterned(30, 20);
        let out = process(img, &PipelineConfig::default());
        assert_eq!(out.dimensions(), (30 + TAG_WIDTH, 20 + TAG_HEIGHT));
    }

    #[test]
    fn full_pipeline_is_deterministic() {
        let img = patterned(57, 43);
        let config = PipelineConfig::new(true, true, true, false);
        let first = process(img.clone(), &config);
        let second = process(img, &config);
        assert_eq!(first.as_raw(), second.as_raw());
    }

    #[test]
    fn border_then_contrast_keeps_uniform_image_uniform() {
        // 37x23 pads to 137x123: neither side is a whole number of tiles.
        let img = GrayImage::from_pixel(37, 23, image::Luma([90]));
        let out = apply_stages(img, &[Stage::Border, Stage::ContrastNorm]);
        assert_eq!(out.dimensions(), (37 + TAG_WIDTH, 23 + TAG_HEIGHT));
        let first = out.get_pixel(0, 0).0[0];
        assert!(out.pixels().all(|p| p.0[0] == first));
    }

    #[test]
    fn binary_output_produces_binary_image() {
        let img = patterned(40, 40);
        let config = PipelineConfig::new(true, true, false, true);
        let out = process(img, &config);
        assert!(out.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }

    #[test]
    fn stages_run_in_order() {
        // Border before threshold: the mask covers the padded geometry.
        let img = patterned(16, 16);
        let out = apply_stages(img, &[Stage::Border, Stage::Threshold { binary: true }]);
        assert_eq!(out.dimensions(), (16 + TAG_WIDTH, 16 + TAG_HEIGHT));
    }
}
