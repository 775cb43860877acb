//! tagprep: batch preprocessing of grayscale images for tag classification.
//!
//! Reads a pathfile listing one input image per line, runs every image
//! through the enabled stages (border, local contrast normalization,
//! adaptive threshold), writes `<stem>_wb.<ext>` files into the output
//! directory, and finally writes a manifest listing the outputs.
//!
//! # Usage
//!
//! ```text
//! tagprep --output-dir out/ --use-hist-eq true images.txt
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::builder::BoolishValueParser;
use tagprep_io::{BatchConfig, Progress, ProgressReporter, RunContext, StdClock};
use tagprep_pipeline::PipelineConfig;

/// Width of the stderr progress bar in characters.
const BAR_WIDTH: usize = 40;

/// Normalize a batch of grayscale images before tagging.
///
/// Every image listed in PATHFILE is optionally padded with a replicated
/// border, contrast-normalized, and thresholded, then written to the
/// output directory with a `_wb` suffix.
#[derive(Parser, Debug)]
#[command(name = "tagprep", version)]
struct Cli {
    /// File with one input image path per line.
    pathfile: PathBuf,

    /// Write processed images to this directory.
    #[arg(short, long, value_name = "DIR")]
    output_dir: PathBuf,

    /// Write the list of output paths to this file [default: <DIR>/images.txt].
    #[arg(long, value_name = "FILE")]
    output_pathfile: Option<PathBuf>,

    /// Add a border around the image.
    #[arg(
        long,
        value_name = "BOOL",
        default_value_t = PipelineConfig::DEFAULT_APPLY_BORDER,
        value_parser = BoolishValueParser::new(),
        action = clap::ArgAction::Set,
    )]
    border: bool,

    /// Apply local histogram equalization.
    #[arg(
        long,
        value_name = "BOOL",
        default_value_t = PipelineConfig::DEFAULT_APPLY_CONTRAST_NORM,
        value_parser = BoolishValueParser::new(),
        action = clap::ArgAction::Set,
    )]
    use_hist_eq: bool,

    /// Apply adaptive thresholding.
    #[arg(
        long,
        value_name = "BOOL",
        default_value_t = PipelineConfig::DEFAULT_APPLY_THRESHOLD,
        value_parser = BoolishValueParser::new(),
        action = clap::ArgAction::Set,
    )]
    use_threshold: bool,

    /// Save the binary thresholding mask instead of the blend. Implies
    /// thresholding.
    #[arg(
        long,
        value_name = "BOOL",
        default_value_t = PipelineConfig::DEFAULT_BINARY_OUTPUT,
        value_parser = BoolishValueParser::new(),
        action = clap::ArgAction::Set,
    )]
    binary_image: bool,

    /// Full stage configuration as a JSON string.
    ///
    /// When provided, the four stage flags are ignored. Missing fields
    /// take their defaults.
    #[arg(long, value_name = "JSON")]
    config_json: Option<String>,
}

impl Cli {
    fn pipeline_config(&self) -> Result<PipelineConfig, String> {
        match &self.config_json {
            Some(json) => {
                PipelineConfig::from_json(json).map_err(|e| format!("Invalid --config-json: {e}"))
            }
            None => Ok(PipelineConfig::new(
                self.border,
                self.use_hist_eq,
                self.use_threshold,
                self.binary_image,
            )),
        }
    }

    fn batch_config(&self) -> Result<BatchConfig, String> {
        Ok(BatchConfig {
            output_dir: self.output_dir.clone(),
            manifest_path: self.output_pathfile.clone(),
            pipeline: self.pipeline_config()?,
        })
    }
}

/// Redraws a single-line progress bar on stderr.
struct StderrBar {
    width: usize,
}

impl ProgressReporter for StderrBar {
    fn report(&mut self, progress: &Progress) {
        eprint!("\r{}", render_bar(progress, self.width));
        if progress.completed >= progress.total {
            eprintln!();
        }
    }
}

fn render_bar(progress: &Progress, width: usize) -> String {
    let filled = if progress.total == 0 {
        width
    } else {
        (progress.completed * width / progress.total).min(width)
    };
    let eta = progress
        .eta()
        .map_or_else(|| "--".to_owned(), |d| format!("{:.1}s", d.as_secs_f64()));
    format!(
        "[{}{}] {:5.1}% ({}/{}) elapsed {:.1}s eta {eta}",
        "#".repeat(filled),
        "-".repeat(width - filled),
        progress.fraction() * 100.0,
        progress.completed,
        progress.total,
        progress.elapsed.as_secs_f64(),
    )
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match cli.batch_config() {
        Ok(c) => c,
        Err(msg) => {
            tracing::error!("{msg}");
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(?config, "resolved configuration");

    let descriptors = match tagprep_io::read_pathfile(&cli.pathfile) {
        Ok(d) => d,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut ctx = RunContext::new(StdClock, StderrBar { width: BAR_WIDTH });
    match tagprep_io::run_batch(&descriptors, &config, &mut ctx) {
        Ok(summary) => {
            println!(
                "Processed {} images. Saved output paths to:",
                summary.count()
            );
            println!("{}", summary.manifest_path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!();
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("tagprep").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults_match_pipeline_defaults() {
        let cli = parse(&["-o", "out", "list.txt"]);
        assert_eq!(cli.pipeline_config().unwrap(), PipelineConfig::default());
        assert_eq!(cli.pathfile, PathBuf::from("list.txt"));
        assert_eq!(cli.output_pathfile, None);
    }

    #[test]
    fn bool_flags_take_values() {
        let cli = parse(&[
            "--output-dir",
            "out",
            "--border",
            "false",
            "--use-hist-eq",
            "yes",
            "--use-threshold",
            "1",
            "list.txt",
        ]);
        let config = cli.pipeline_config().unwrap();
        assert!(!config.apply_border());
        assert!(config.apply_contrast_norm());
        assert!(config.apply_threshold());
        assert!(!config.binary_output());
    }

    #[test]
    fn binary_image_forces_threshold() {
        let cli = parse(&["-o", "out", "--binary-image", "true", "list.txt"]);
        let config = cli.pipeline_config().unwrap();
        assert!(config.apply_threshold());
        assert!(config.binary_output());
    }

    #[test]
    fn output_dir_is_required() {
        let err = Cli::try_parse_from(["tagprep", "list.txt"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn pathfile_is_required() {
        let err = Cli::try_parse_from(["tagprep", "-o", "out"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn config_json_overrides_flags() {
        let cli = parse(&[
            "-o",
            "out",
            "--border",
            "true",
            "--config-json",
            r#"{"apply_border": false, "apply_contrast_norm": true}"#,
            "list.txt",
        ]);
        let config = cli.pipeline_config().unwrap();
        assert!(!config.apply_border());
        assert!(config.apply_contrast_norm());
    }

    #[test]
    fn invalid_config_json_is_reported() {
        let cli = parse(&["-o", "out", "--config-json", "{not json", "list.txt"]);
        assert!(cli.pipeline_config().unwrap_err().contains("--config-json"));
    }

    #[test]
    fn manifest_override_is_passed_through() {
        let cli = parse(&["-o", "out", "--output-pathfile", "done.txt", "list.txt"]);
        let config = cli.batch_config().unwrap();
        assert_eq!(config.resolved_manifest_path(), PathBuf::from("done.txt"));
    }

    #[test]
    fn bar_fills_proportionally() {
        let p = Progress {
            completed: 1,
            total: 4,
            elapsed: Duration::from_secs(2),
        };
        assert_eq!(
            render_bar(&p, 8),
            "[##------]  25.0% (1/4) elapsed 2.0s eta 6.0s"
        );
    }

    #[test]
    fn bar_at_start_has_no_eta() {
        let p = Progress {
            completed: 0,
            total: 3,
            elapsed: Duration::ZERO,
        };
        assert_eq!(
            render_bar(&p, 4),
            "[----]   0.0% (0/3) elapsed 0.0s eta --"
        );
    }
}
