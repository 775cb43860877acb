//! Filesystem side of tagprep.
//!
//! Loads input pathfiles, decodes and encodes images, runs the
//! sequential batch over [`tagprep_pipeline`], and writes the output
//! manifest. All image math lives in the pipeline crate; this crate only
//! moves bytes and tracks progress.

pub mod batch;
pub mod codec;
pub mod display;
pub mod manifest;
pub mod naming;
pub mod pathfile;
pub mod progress;

pub use batch::{BatchConfig, BatchError, BatchSummary, run_batch, run_batch_with_codec};
pub use codec::{FsCodec, ImageCodec};
pub use display::{DisplayError, to_display_rgba, to_png_bytes};
pub use manifest::{MANIFEST_FILE_NAME, default_manifest_path, to_manifest, write_manifest};
pub use naming::{OUTPUT_SUFFIX, output_path};
pub use pathfile::{ImageDescriptor, PathfileError, parse_pathfile, read_pathfile};
pub use progress::{Clock, LogReporter, Progress, ProgressReporter, RunContext, StdClock};
