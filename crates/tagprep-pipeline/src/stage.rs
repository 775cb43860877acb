//! Preprocessing stages and their fixed ordering.
//!
//! This module defines the [`ImageStage`] trait for a single buffer
//! transformation and the [`Stage`] enum naming every stage the
//! pipeline knows about.
//!
//! # Strategy list
//!
//! A [`PipelineConfig`] is turned into an ordered `Vec<Stage>` exactly
//! once via [`PipelineConfig::stages`]. The runner then walks that list
//! without looking at the configuration again, so adding or reordering
//! a stage only touches [`PipelineConfig::stages`].

use std::fmt;

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::types::PipelineConfig;

/// One enabled preprocessing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    /// Tag-sized edge-replicated border.
    Border,
    /// Tiled CLAHE with the tag size as tile size.
    ContrastNorm,
    /// Adaptive Gaussian threshold.
    Threshold {
        /// Emit the raw mask instead of blending it into the original.
        binary: bool,
    },
}

/// Trait for a single buffer-to-buffer preprocessing step.
///
/// A stage takes ownership of the buffer for the duration of the call
/// and hands back the transformed one. Stages never see the batch
/// state around them.
pub trait ImageStage {
    /// Transform `image`.
    fn apply(&self, image: GrayImage) -> GrayImage;
}

impl ImageStage for Stage {
    fn apply(&self, image: GrayImage) -> GrayImage {
        match *self {
            Self::Border => crate::border::add_tag_border(&image),
            Self::ContrastNorm => crate::contrast::normalize_contrast(&image),
            Self::Threshold { binary } => crate::threshold::threshold_and_blend(&image, binary),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Border => f.write_str("border"),
            Self::ContrastNorm => f.write_str("contrast-norm"),
            Self::Threshold { binary: true } => f.write_str("threshold(binary)"),
            Self::Threshold { binary: false } => f.write_str("threshold(blend)"),
        }
    }
}

impl PipelineConfig {
    /// The enabled stages in application order:
    /// border, then contrast normalization, then threshold.
    #[must_use]
    pub fn stages(&self) -> Vec<Stage> {
        let mut stages = Vec::with_capacity(3);
        if self.apply_border() {
            stages.push(Stage::Border);
        }
        if self.apply_contrast_norm() {
            stages.push(Stage::ContrastNorm);
        }
        if self.apply_threshold() {
            stages.push(Stage::Threshold {
                binary: self.binary_output(),
            });
        }
        stages
    }
}
