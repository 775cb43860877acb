//! Output manifest: one written image path per line, in batch order.

use std::path::{Path, PathBuf};

/// File name of the manifest when no explicit path is configured.
pub const MANIFEST_FILE_NAME: &str = "images.txt";

/// Manifest location used when none is configured: `output_dir/images.txt`.
#[must_use]
pub fn default_manifest_path(output_dir: &Path) -> PathBuf {
    output_dir.join(MANIFEST_FILE_NAME)
}

/// Render manifest contents. Every line, including the last, ends with
/// `\n`; an empty list renders as an empty string.
#[must_use]
pub fn to_manifest(paths: &[PathBuf]) -> String {
    paths.iter().fold(String::new(), |mut out, path| {
        out.push_str(&path.to_string_lossy());
        out.push('\n');
        out
    })
}

/// Write the manifest for `paths` to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns the underlying I/O error if the file cannot be written.
pub fn write_manifest(path: &Path, paths: &[PathBuf]) -> std::io::Result<()> {
    std::fs::write(path, to_manifest(paths))
}
