//! Integration test: drive the `tagprep` binary over a temporary directory.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::Path;
use std::process::{Command, Output};

fn tagprep(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tagprep"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to spawn tagprep")
}

fn write_gray(path: &Path, width: u32, height: u32) {
    image::GrayImage::from_fn(width, height, |x, y| {
        image::Luma([u8::try_from((x + y) * 7 % 256).unwrap()])
    })
    .save(path)
    .unwrap();
}

#[test]
fn processes_pathfile_and_prints_manifest_location() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.png");
    let b = dir.path().join("b.png");
    write_gray(&a, 12, 9);
    write_gray(&b, 7, 7);
    let pathfile = dir.path().join("list.txt");
    std::fs::write(&pathfile, format!("{}\n\n{}\n", a.display(), b.display())).unwrap();
    let out = dir.path().join("out");

    let output = tagprep(&[
        "--output-dir",
        out.to_str().unwrap(),
        "--use-hist-eq",
        "true",
        pathfile.to_str().unwrap(),
    ]);

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8(output.stdout).unwrap();
    let manifest = out.join("images.txt");
    assert!(stdout.contains("Processed 2 images. Saved output paths to:"));
    assert!(stdout.contains(&manifest.display().to_string()));

    let listed = std::fs::read_to_string(&manifest).unwrap();
    let expected = format!(
        "{}\n{}\n",
        out.join("a_wb.png").display(),
        out.join("b_wb.png").display()
    );
    assert_eq!(listed, expected);
    let padded = image::open(out.join("a_wb.png")).unwrap();
    assert_eq!((padded.width(), padded.height()), (112, 109));
}

#[test]
fn failed_write_exits_with_status_one() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.png");
    write_gray(&a, 4, 4);
    let pathfile = dir.path().join("list.txt");
    std::fs::write(&pathfile, format!("{}\n", a.display())).unwrap();
    let out = dir.path().join("out");
    std::fs::create_dir_all(out.join("a_wb.png")).unwrap();

    let output = tagprep(&["-o", out.to_str().unwrap(), pathfile.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("a_wb.png"), "{stderr}");
    assert!(!out.join("images.txt").exists());
}

#[test]
fn missing_output_dir_is_a_usage_error() {
    let output = tagprep(&["list.txt"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn invalid_config_json_is_logged_and_fails() {
    let dir = tempfile::tempdir().unwrap();
    let pathfile = dir.path().join("list.txt");
    std::fs::write(&pathfile, "").unwrap();
    let out = dir.path().join("out");

    let output = tagprep(&[
        "-o",
        out.to_str().unwrap(),
        "--config-json",
        "{not json",
        pathfile.to_str().unwrap(),
    ]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("ERROR"), "{stderr}");
    assert!(stderr.contains("--config-json"), "{stderr}");
    assert!(!out.exists());
}
