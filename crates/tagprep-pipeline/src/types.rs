//! Shared types for the tagprep preprocessing pipeline.

use serde::{Deserialize, Serialize};

/// Re-export `GrayImage` so downstream crates can pass pixel buffers
/// around without depending on `image` directly.
pub use image::GrayImage;

/// Width in pixels of one tag as seen by the downstream classifier.
///
/// Shared by the border margin and the contrast-normalization tiling.
pub const TAG_WIDTH: u32 = 100;

/// Height in pixels of one tag as seen by the downstream classifier.
pub const TAG_HEIGHT: u32 = 100;

/// Configuration for the preprocessing stages.
///
/// Fields are private so that the `binary_output => apply_threshold`
/// invariant can only be established through [`PipelineConfig::new`]
/// (or deserialization, which routes through the same constructor).
/// A binary mask is produced by the threshold stage, so asking for one
/// without thresholding would be meaningless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PipelineConfigProxy", into = "PipelineConfigProxy")]
#[allow(clippy::struct_excessive_bools)]
pub struct PipelineConfig {
    apply_border: bool,
    apply_contrast_norm: bool,
    apply_threshold: bool,
    binary_output: bool,
}

impl PipelineConfig {
    /// Default for [`apply_border`](Self::apply_border).
    pub const DEFAULT_APPLY_BORDER: bool = true;
    /// Default for [`apply_contrast_norm`](Self::apply_contrast_norm).
    pub const DEFAULT_APPLY_CONTRAST_NORM: bool = false;
    /// Default for [`apply_threshold`](Self::apply_threshold).
    pub const DEFAULT_APPLY_THRESHOLD: bool = false;
    /// Default for [`binary_output`](Self::binary_output).
    pub const DEFAULT_BINARY_OUTPUT: bool = false;

    /// Build a configuration from the four stage flags.
    ///
    /// `binary_output == true` forces `apply_threshold` on regardless of
    /// the value passed in.
    #[must_use]
    pub const fn new(
        apply_border: bool,
        apply_contrast_norm: bool,
        apply_threshold: bool,
        binary_output: bool,
    ) -> Self {
        Self {
            apply_border,
            apply_contrast_norm,
            apply_threshold: apply_threshold || binary_output,
            binary_output,
        }
    }

    /// Parse a configuration from a JSON object.
    ///
    /// Missing fields take their defaults. The threshold invariant is
    /// applied exactly as in [`PipelineConfig::new`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] if `json` is not a valid
    /// configuration object.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Whether the tag-sized border is added.
    #[must_use]
    pub const fn apply_border(&self) -> bool {
        self.apply_border
    }

    /// Whether tiled contrast normalization runs.
    #[must_use]
    pub const fn apply_contrast_norm(&self) -> bool {
        self.apply_contrast_norm
    }

    /// Whether the adaptive threshold stage runs.
    #[must_use]
    pub const fn apply_threshold(&self) -> bool {
        self.apply_threshold
    }

    /// Whether the threshold stage emits the raw binary mask instead of
    /// blending it into the original.
    #[must_use]
    pub const fn binary_output(&self) -> bool {
        self.binary_output
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_APPLY_BORDER,
            Self::DEFAULT_APPLY_CONTRAST_NORM,
            Self::DEFAULT_APPLY_THRESHOLD,
            Self::DEFAULT_BINARY_OUTPUT,
        )
    }
}

/// Serde-compatible proxy for `PipelineConfig`.
///
/// Deserialization goes through [`PipelineConfig::new`] so that the
/// binary-output invariant holds for configs loaded from JSON.
#[derive(Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
struct PipelineConfigProxy {
    apply_border: bool,
    apply_contrast_norm: bool,
    apply_threshold: bool,
    binary_output: bool,
}

impl Default for PipelineConfigProxy {
    fn default() -> Self {
        Self {
            apply_border: PipelineConfig::DEFAULT_APPLY_BORDER,
            apply_contrast_norm: PipelineConfig::DEFAULT_APPLY_CONTRAST_NORM,
            apply_threshold: PipelineConfig::DEFAULT_APPLY_THRESHOLD,
            binary_output: PipelineConfig::DEFAULT_BINARY_OUTPUT,
        }
    }
}

impl From<PipelineConfigProxy> for PipelineConfig {
    fn from(proxy: PipelineConfigProxy) -> Self {
        Self::new(
            proxy.apply_border,
            proxy.apply_contrast_norm,
            proxy.apply_threshold,
            proxy.binary_output,
        )
    }
}

impl From<PipelineConfig> for PipelineConfigProxy {
    fn from(config: PipelineConfig) -> Self {
        Self {
            apply_border: config.apply_border,
            apply_contrast_norm: config.apply_contrast_norm,
            apply_threshold: config.apply_threshold,
            binary_output: config.binary_output,
        }
    }
}

/// Errors that can occur while building a [`PipelineConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The JSON configuration could not be parsed.
    #[error("invalid pipeline configuration: {0}")]
    Json(#[from] serde_json::Error),
}
