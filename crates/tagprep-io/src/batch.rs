//! Sequential batch orchestrator.
//!
//! Each descriptor is decoded, pushed through the enabled stages, and
//! written under the output directory, strictly in input order. The
//! first failure aborts the batch; the manifest is written only once
//! every image has been written.
//!
//! [`run_batch`] is the production entry point. [`run_batch_with_codec`]
//! takes the [`ImageCodec`] explicitly so tests can inject failures.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tagprep_pipeline::{PipelineConfig, apply_stages};

use crate::codec::{FsCodec, ImageCodec};
use crate::manifest::{default_manifest_path, write_manifest};
use crate::naming::output_path;
use crate::pathfile::ImageDescriptor;
use crate::progress::{Clock, Progress, ProgressReporter, RunContext};

/// Where and how a batch runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Directory receiving the processed images. Created if absent.
    pub output_dir: PathBuf,
    /// Manifest location; `None` means `output_dir/images.txt`.
    pub manifest_path: Option<PathBuf>,
    /// Stage selection.
    pub pipeline: PipelineConfig,
}

impl BatchConfig {
    /// Batch writing to `output_dir` with the default manifest location.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>, pipeline: PipelineConfig) -> Self {
        Self {
            output_dir: output_dir.into(),
            manifest_path: None,
            pipeline,
        }
    }

    /// Manifest path this batch will write.
    #[must_use]
    pub fn resolved_manifest_path(&self) -> PathBuf {
        self.manifest_path
            .clone()
            .unwrap_or_else(|| default_manifest_path(&self.output_dir))
    }
}

/// Result of a batch that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    /// Written image paths, in input order.
    pub outputs: Vec<PathBuf>,
    /// Where the manifest was written.
    pub manifest_path: PathBuf,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

impl BatchSummary {
    /// Number of images written.
    #[must_use]
    pub fn count(&self) -> usize {
        self.outputs.len()
    }
}

/// Errors that abort a batch.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// The output directory could not be created.
    #[error("failed to create output directory {}: {source}", path.display())]
    CreateOutputDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// An input image could not be decoded. Outputs written before
    /// this one remain on disk.
    #[error("failed to read image {} after {completed} completed: {source}", path.display())]
    Decode {
        /// Input that failed.
        path: PathBuf,
        /// Underlying codec error.
        source: image::ImageError,
        /// Images written before the failure.
        completed: usize,
    },

    /// A processed image could not be written. Outputs written before
    /// this one remain on disk.
    #[error("failed to write image {} after {completed} completed: {source}", path.display())]
    Write {
        /// Output that failed.
        path: PathBuf,
        /// Underlying codec error.
        source: image::ImageError,
        /// Images written before the failure.
        completed: usize,
    },

    /// The manifest could not be written. Every output image is on
    /// disk but unlisted.
    #[error("failed to write manifest {}: {source}", path.display())]
    Manifest {
        /// Manifest path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
        /// Images written before the failure.
        completed: usize,
    },
}

impl BatchError {
    /// Path named by the error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::CreateOutputDir { path, .. }
            | Self::Decode { path, .. }
            | Self::Write { path, .. }
            | Self::Manifest { path, .. } => path,
        }
    }

    /// Number of output images left on disk by the failed batch.
    #[must_use]
    pub const fn completed(&self) -> usize {
        match self {
            Self::Decode { completed, .. }
            | Self::Write { completed, .. }
            | Self::Manifest { completed, .. } => *completed,
            Self::CreateOutputDir { .. } => 0,
        }
    }
}

/// Run a batch against the local filesystem.
///
/// # Errors
///
/// See [`run_batch_with_codec`].
pub fn run_batch<C: Clock, R: ProgressReporter>(
    descriptors: &[ImageDescriptor],
    config: &BatchConfig,
    ctx: &mut RunContext<C, R>,
) -> Result<BatchSummary, BatchError> {
    run_batch_with_codec(&FsCodec, descriptors, config, ctx)
}

/// Run a batch using `codec` for every image read and write.
///
/// Progress is reported at 0% before the first image and after each
/// successful write.
///
/// # Errors
///
/// Returns the first [`BatchError`] encountered. Nothing after the
/// failing descriptor is read, and no manifest is written.
pub fn run_batch_with_codec<C: Clock, R: ProgressReporter>(
    codec: &impl ImageCodec,
    descriptors: &[ImageDescriptor],
    config: &BatchConfig,
    ctx: &mut RunContext<C, R>,
) -> Result<BatchSummary, BatchError> {
    let start = ctx.clock.now();
    let total = descriptors.len();
    let stages = config.pipeline.stages();

    tracing::info!(
        total,
        output_dir = %config.output_dir.display(),
        stages = ?stages,
        "starting batch"
    );

    std::fs::create_dir_all(&config.output_dir).map_err(|source| {
        BatchError::CreateOutputDir {
            path: config.output_dir.clone(),
            source,
        }
    })?;

    ctx.reporter.report(&Progress {
        completed: 0,
        total,
        elapsed: ctx.clock.elapsed(&start),
    });

    let mut outputs = Vec::with_capacity(total);
    for desc in descriptors {
        let input = &desc.filename;
        let image = match codec.read(input) {
            Ok(image) => image,
            Err(source) => {
                warn_partial(&config.output_dir, outputs.len());
                return Err(BatchError::Decode {
                    path: input.clone(),
                    source,
                    completed: outputs.len(),
                });
            }
        };

        let processed = apply_stages(image, &stages);

        let target = output_path(&config.output_dir, input);
        if let Err(source) = codec.write(&processed, &target) {
            warn_partial(&config.output_dir, outputs.len());
            return Err(BatchError::Write {
                path: target,
                source,
                completed: outputs.len(),
            });
        }

        tracing::debug!(
            input = %input.display(),
            output = %target.display(),
            "wrote image"
        );
        outputs.push(target);

        ctx.reporter.report(&Progress {
            completed: outputs.len(),
            total,
            elapsed: ctx.clock.elapsed(&start),
        });
    }

    let manifest_path = config.resolved_manifest_path();
    if let Err(source) = write_manifest(&manifest_path, &outputs) {
        warn_partial(&config.output_dir, outputs.len());
        return Err(BatchError::Manifest {
            path: manifest_path,
            source,
            completed: outputs.len(),
        });
    }

    let elapsed = ctx.clock.elapsed(&start);
    tracing::info!(
        count = outputs.len(),
        manifest = %manifest_path.display(),
        ?elapsed,
        "batch complete"
    );

    Ok(BatchSummary {
        outputs,
        manifest_path,
        elapsed,
    })
}

/// Log that an aborted batch left `completed` unlisted outputs behind.
fn warn_partial(output_dir: &Path, completed: usize) {
    if completed > 0 {
        tracing::warn!(
            completed,
            output_dir = %output_dir.display(),
            "batch aborted; earlier outputs remain without a manifest"
        );
    }
}
