//! Drives the `lutprint` binary through a full calibration round trip.

use std::path::Path;
use std::process::{Command, Output};

fn lutprint(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lutprint"))
        .args(args)
        .current_dir(cwd)
        .env_remove("LUTPRINT_MAX_DIM")
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to spawn lutprint")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

#[test]
fn generate_filter_detect_extract() {
    let dir = tempfile::tempdir().unwrap();
    let cwd = dir.path();

    let out = lutprint(&["-q", "generate", "-n", "5", "-m", "3", "-l", "tall"], cwd);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(cwd.join("lut_pattern_N5_M3_tall.png").exists());

    let out = lutprint(
        &["-q", "filter", "lut_pattern_N5_M3_tall.png", "-o", "graded.png", "-e", "B = 255 - B"],
        cwd,
    );
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let out = lutprint(&["detect", "graded.png"], cwd);
    assert!(out.status.success());
    assert_eq!(stdout(&out).trim(), "graded.png: N=5 M=3 layout=tall");

    let out = lutprint(&["-q", "extract", "graded.png"], cwd);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let cube = std::fs::read_to_string(cwd.join("graded.cube")).unwrap();
    let lines: Vec<&str> = cube.lines().collect();
    assert_eq!(lines[1], "TITLE \"lutprint N=5 M=3 tall\"");
    assert_eq!(lines[2], "LUT_3D_SIZE 5");
    // First lattice point (0,0,0) has its blue inverted.
    assert_eq!(lines[5], "0.000000 0.000000 1.000000");
    assert_eq!(lines.len(), 5 + 125);
}

#[test]
fn dimension_limit_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let out = lutprint(
        &["-q", "generate", "-n", "33", "-m", "8", "--max-dim", "4096"],
        dir.path(),
    );
    assert!(!out.status.success());
    let err = String::from_utf8_lossy(&out.stderr);
    assert!(err.contains("at most 3"), "{err}");
}

#[test]
fn oversized_tile_reports_dimension_limit() {
    let dir = tempfile::tempdir().unwrap();
    let out = lutprint(&["-q", "generate", "-n", "256", "-m", "70000"], dir.path());
    assert!(!out.status.success());
    let err = String::from_utf8_lossy(&out.stderr);
    assert!(err.contains("4587520000x17920000"), "{err}");
    assert!(err.contains("at most 0"), "{err}");
}

#[test]
fn test_pixel_prints_packed_hex() {
    let dir = tempfile::tempdir().unwrap();
    let out = lutprint(
        &["test-pixel", "-e", "R = 255 - R", "--rgb", "10,20,30"],
        dir.path(),
    );
    assert!(out.status.success());
    assert_eq!(stdout(&out).trim(), "245,20,30  #F5141E");
}

#[test]
fn compile_error_fails_before_reading_image() {
    let dir = tempfile::tempdir().unwrap();
    let out = lutprint(
        &["filter", "missing.png", "-o", "out.png", "-e", "R = ("],
        dir.path(),
    );
    assert!(!out.status.success());
    let err = String::from_utf8_lossy(&out.stderr);
    assert!(err.contains("does not compile"), "{err}");
}
