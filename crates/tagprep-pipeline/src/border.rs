//! Border padding by edge replication.
//!
//! Grows an image by a fixed margin on every side. Margin pixels copy
//! the nearest pixel of the original image, so each side is filled
//! from its own edge row/column and corner regions take the value of
//! the corresponding corner pixel. Nothing wraps around and adjacent
//! sides never blend into each other.

use image::GrayImage;

use crate::types::{TAG_HEIGHT, TAG_WIDTH};

/// Pixel margins added on each side of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Margins {
    /// Rows added above the image.
    pub top: u32,
    /// Rows added below the image.
    pub bottom: u32,
    /// Columns added left of the image.
    pub left: u32,
    /// Columns added right of the image.
    pub right: u32,
}

impl Margins {
    /// Margins derived from the tag size: half a tag on every side, so
    /// the padded image grows by exactly one tag in each dimension.
    pub const TAG: Self = Self {
        top: TAG_HEIGHT / 2,
        bottom: TAG_HEIGHT / 2,
        left: TAG_WIDTH / 2,
        right: TAG_WIDTH / 2,
    };
}

/// Pad `image` by `margins`, replicating edge pixels outward.
///
/// The output is `(width + left + right) x (height + top + bottom)`.
///
/// The image must be non-empty; an empty image has no edge to
/// replicate and is a caller error.
#[must_use = "returns the padded image"]
pub fn pad_replicate(image: &GrayImage, margins: Margins) -> GrayImage {
    let (width, height) = image.dimensions();
    debug_assert!(
        width > 0 && height > 0,
        "cannot replicate the border of an empty image"
    );

    let out_width = width + margins.left + margins.right;
    let out_height = height + margins.top + margins.bottom;

    GrayImage::from_fn(out_width, out_height, |x, y| {
        let src_x = x.saturating_sub(margins.left).min(width - 1);
        let src_y = y.saturating_sub(margins.top).min(height - 1);
        *image.get_pixel(src_x, src_y)
    })
}

/// Add the tag-sized border: `TAG_HEIGHT / 2` rows above and below,
/// `TAG_WIDTH / 2` columns left and right.
#[must_use = "returns the padded image"]
pub fn add_tag_border(image: &GrayImage) -> GrayImage {
    pad_replicate(image, Margins::TAG)
}
