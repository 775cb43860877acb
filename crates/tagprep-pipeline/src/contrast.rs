//! Tiled contrast-limited adaptive histogram equalization (CLAHE).
//!
//! The image is cut into a grid of non-overlapping tiles. Each tile gets
//! its own equalization lookup table built from a clipped histogram, so
//! near-uniform regions (background) are not blown up into noise. Every
//! pixel is then remapped by bilinearly interpolating the lookup tables
//! of the four nearest tile centres, which hides the tile seams.
//!
//! Tiles have a fixed pixel size (the tag size by default). When the
//! image dimensions are not a multiple of the tile size, the last row
//! and column of tiles extend past the image; their histograms are taken
//! over the full tile window with out-of-range coordinates mirrored back
//! inside (reflect-101, `dcb|abcd|cba`). Every tile therefore counts the
//! same number of pixels.

use image::GrayImage;

use crate::types::{TAG_HEIGHT, TAG_WIDTH};

/// Number of intensity levels in an 8-bit histogram.
const BINS: usize = 256;

/// Histogram clip limit used by the pipeline's contrast stage.
pub const CLIP_LIMIT: f32 = 2.0;

/// Per-tile intensity lookup table.
type Lut = [u8; BINS];

/// Equalize `image` with tag-sized tiles and the default [`CLIP_LIMIT`].
#[must_use = "returns the equalized image"]
pub fn normalize_contrast(image: &GrayImage) -> GrayImage {
    clahe(image, TAG_WIDTH, TAG_HEIGHT, CLIP_LIMIT)
}

/// Contrast-limited adaptive histogram equalization with tiles of
/// `tile_width x tile_height` pixels.
///
/// `clip_limit` caps each histogram bin at `clip_limit` times the mean
/// bin height. Values `<= 0.0` disable clipping (plain tiled
/// equalization). Zero-sized images or tiles return the input unchanged.
#[must_use = "returns the equalized image"]
pub fn clahe(image: &GrayImage, tile_width: u32, tile_height: u32, clip_limit: f32) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 || tile_width == 0 || tile_height == 0 {
        return image.clone();
    }

    let grid = TileGrid {
        tiles_x: width.div_ceil(tile_width),
        tiles_y: height.div_ceil(tile_height),
        tile_width,
        tile_height,
    };
    let luts = tile_luts(image, &grid, clip_limit);

    let inv_tw = 1.0 / f64::from(tile_width);
    let inv_th = 1.0 / f64::from(tile_height);

    GrayImage::from_fn(width, height, |x, y| {
        let v = usize::from(image.get_pixel(x, y).0[0]);

        let (tx0, tx1, ax) = neighbours(f64::from(x).mul_add(inv_tw, -0.5), grid.tiles_x);
        let (ty0, ty1, ay) = neighbours(f64::from(y).mul_add(inv_th, -0.5), grid.tiles_y);

        let lut = |tx: usize, ty: usize| f64::from(luts[ty * grid.tiles_x as usize + tx][v]);
        let top = lut(tx0, ty0).mul_add(1.0 - ax, lut(tx1, ty0) * ax);
        let bottom = lut(tx0, ty1).mul_add(1.0 - ax, lut(tx1, ty1) * ax);
        let value = top.mul_add(1.0 - ay, bottom * ay);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        image::Luma([value.round().clamp(0.0, 255.0) as u8])
    })
}

/// Layout of the tile grid over an image.
struct TileGrid {
    tiles_x: u32,
    tiles_y: u32,
    tile_width: u32,
    tile_height: u32,
}

/// Locate the two tile indices straddling a fractional tile coordinate
/// and the interpolation weight of the second one.
///
/// Indices are clamped to the grid, so pixels beyond the outermost tile
/// centres use that tile's table alone.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]
fn neighbours(coord: f64, tiles: u32) -> (usize, usize, f64) {
    let floor = coord.floor();
    let weight = coord - floor;
    let last = i64::from(tiles) - 1;
    let lo = (floor as i64).clamp(0, last) as usize;
    let hi = (floor as i64 + 1).clamp(0, last) as usize;
    (lo, hi, weight)
}

/// Build one clipped-equalization lookup table per tile, row-major.
fn tile_luts(image: &GrayImage, grid: &TileGrid, clip_limit: f32) -> Vec<Lut> {
    let (width, height) = image.dimensions();
    let pixels = grid.tile_width * grid.tile_height;
    let limit = (clip_limit > 0.0).then(|| clip_threshold(clip_limit, pixels));
    let mut luts = Vec::with_capacity((grid.tiles_x * grid.tiles_y) as usize);

    for ty in 0..grid.tiles_y {
        let y0 = ty * grid.tile_height;
        for tx in 0..grid.tiles_x {
            let x0 = tx * grid.tile_width;

            let window = GrayImage::from_fn(grid.tile_width, grid.tile_height, |x, y| {
                *image.get_pixel(reflect_101(x0 + x, width), reflect_101(y0 + y, height))
            });
            let mut hist = imageproc::stats::histogram(&window).channels[0];

            if let Some(limit) = limit {
                clip_histogram(&mut hist, limit);
            }
            luts.push(equalization_lut(&hist, pixels));
        }
    }

    luts
}

/// Mirror `coord` into `0..len` without repeating the edge sample:
/// for `len == 4`, coordinates `4, 5, 6` map to `2, 1, 0`.
fn reflect_101(coord: u32, len: u32) -> u32 {
    if len <= 1 {
        return 0;
    }
    let period = 2 * (len - 1);
    let m = coord % period;
    if m < len { m } else { period - m }
}

/// Per-bin count ceiling for a tile of `pixels` pixels.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn clip_threshold(clip_limit: f32, pixels: u32) -> u32 {
    let limit = (f64::from(clip_limit) * f64::from(pixels) / BINS as f64) as u32;
    limit.max(1)
}

/// Clip every bin at `limit` and hand the excess back out evenly.
///
/// The part of the excess that does not divide evenly across all bins
/// is spread one count at a time at a regular stride from bin 0.
fn clip_histogram(hist: &mut [u32; BINS], limit: u32) {
    let mut excess = 0u32;
    for bin in hist.iter_mut() {
        if *bin > limit {
            excess += *bin - limit;
            *bin = limit;
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    let bins = BINS as u32;
    let batch = excess / bins;
    let residual = (excess % bins) as usize;
    for bin in hist.iter_mut() {
        *bin += batch;
    }
    if residual > 0 {
        let step = (BINS / residual).max(1);
        for bin in hist.iter_mut().step_by(step).take(residual) {
            *bin += 1;
        }
    }
}

/// Cumulative-distribution lookup table scaled to the 0..=255 range.
fn equalization_lut(hist: &[u32; BINS], pixels: u32) -> Lut {
    #[allow(clippy::cast_precision_loss)]
    let scale = (BINS - 1) as f64 / f64::from(pixels);
    let mut lut = [0u8; BINS];
    let mut sum = 0u32;
    for (out, &count) in lut.iter_mut().zip(hist) {
        sum += count;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            *out = (f64::from(sum) * scale).round().min(255.0) as u8;
        }
    }
    lut
}
