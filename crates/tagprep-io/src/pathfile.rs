//! Input pathfile parsing.
//!
//! A pathfile lists one input image path per line. Trailing whitespace
//! (including a Windows `\r`) is stripped and blank lines are skipped.
//! Line order is the batch order.

use std::path::{Path, PathBuf};

/// One input image, in batch order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDescriptor {
    /// Path of the source image.
    pub filename: PathBuf,
}

impl ImageDescriptor {
    /// Describe the image at `filename`.
    #[must_use]
    pub fn new(filename: impl Into<PathBuf>) -> Self {
        Self {
            filename: filename.into(),
        }
    }
}

/// Errors that can occur while loading a pathfile.
#[derive(Debug, thiserror::Error)]
pub enum PathfileError {
    /// The pathfile could not be read.
    #[error("failed to read pathfile {}: {source}", path.display())]
    Read {
        /// The pathfile that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Parse pathfile contents into descriptors.
#[must_use]
pub fn parse_pathfile(contents: &str) -> Vec<ImageDescriptor> {
    contents
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(ImageDescriptor::new)
        .collect()
}

/// Read and parse the pathfile at `path`.
///
/// # Errors
///
/// Returns [`PathfileError::Read`] if the file cannot be read as UTF-8
/// text.
pub fn read_pathfile(path: &Path) -> Result<Vec<ImageDescriptor>, PathfileError> {
    let contents = std::fs::read_to_string(path).map_err(|source| PathfileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let descriptors = parse_pathfile(&contents);
    tracing::debug!(
        pathfile = %path.display(),
        count = descriptors.len(),
        "loaded pathfile"
    );
    Ok(descriptors)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn one_descriptor_per_line_in_order() {
        let descs = parse_pathfile("a/one.png\nb/two.jpg\nthree.png\n");
        let names: Vec<_> = descs.iter().map(|d| d.filename.clone()).collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("a/one.png"),
                PathBuf::from("b/two.jpg"),
                PathBuf::from("three.png"),
            ]
        );
    }

    #[test]
    fn blank_lines_are_skipped() {
        let descs = parse_pathfile("\none.png\n\n   \ntwo.png");
        assert_eq!(descs.len(), 2);
        assert_eq!(descs[1], ImageDescriptor::new("two.png"));
    }

    #[test]
    fn crlf_and_trailing_spaces_are_trimmed() {
        let descs = parse_pathfile("one.png  \r\ntwo.png\r\n");
        assert_eq!(descs[0].filename, PathBuf::from("one.png"));
        assert_eq!(descs[1].filename, PathBuf::from("two.png"));
    }

    #[test]
    fn empty_contents_yield_no_descriptors() {
        assert!(parse_pathfile("").is_empty());
    }

    #[test]
    fn missing_pathfile_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.txt");
        let err = read_pathfile(&missing).unwrap_err();
        assert!(matches!(err, PathfileError::Read { .. }));
        assert!(err.to_string().contains("nope.txt"));
    }

    #[test]
    fn reads_pathfile_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let pathfile = dir.path().join("images.txt");
        std::fs::write(&pathfile, "x.png\ny.png\n").unwrap();
        let descs = read_pathfile(&pathfile).unwrap();
        assert_eq!(descs.len(), 2);
    }
}
