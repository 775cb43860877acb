//! Output filename convention.
//!
//! `dir/in/photo.png` processed into `out/` becomes `out/photo_wb.png`.
//! Only the file name of the input survives; its directory structure
//! does not.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Suffix appended to the input stem.
pub const OUTPUT_SUFFIX: &str = "_wb";

/// Derive the output path for `input` under `output_dir`:
/// `output_dir / (stem + "_wb" + "." + extension)`.
///
/// An input without an extension yields `output_dir / (stem + "_wb")`.
#[must_use]
pub fn output_path(output_dir: &Path, input: &Path) -> PathBuf {
    let mut name = input
        .file_stem()
        .map_or_else(OsString::new, ToOwned::to_owned);
    name.push(OUTPUT_SUFFIX);
    if let Some(extension) = input.extension() {
        name.push(".");
        name.push(extension);
    }
    output_dir.join(name)
}
