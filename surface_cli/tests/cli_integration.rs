use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

// Simulated backend with no settle/pacing delays so scans finish instantly
fn write_config(dir: &tempfile::TempDir, dropout_ratio: f64, noise_cm: f64) -> PathBuf {
    let toml = format!(
        r#"
[sampling]
batch_size = 5
sample_interval_ms = 0
pacing_ms = 0
default_repetitions = 10
max_repetitions = 50

[notifier]
beep_ms = 1

[simulation]
distance_cm = 30.0
noise_cm = {noise_cm}
dropout_ratio = {dropout_ratio}
seed = 42
"#
    );
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn write_valid_config(dir: &tempfile::TempDir) -> PathBuf {
    write_config(dir, 0.0, 0.05)
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["scan", "--repetitions", "5"], 0, "Shape:    Flat Surface", "stdout")]
#[case(&["scan"], 0, "Reading  10:", "stdout")]
#[case(&["scan", "--repetitions", "3"], 0, "Color:    White", "stdout")]
#[case(&["scan", "--repetitions", "lots"], 2, "invalid value", "stderr")]
#[case(&["measure"], 0, "cm (sigma", "stdout")]
#[case(&["beep"], 0, "ok", "stdout")]
#[case(&["self-check"], 0, "OK", "stdout")]
#[case(&["calibrate"], 2, "Usage:", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("surface_cli").unwrap();

    // Always include a valid config to avoid relying on defaults
    cmd.arg("--config").arg(&cfg);
    for a in args {
        cmd.arg(a);
    }

    let assert = cmd.assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[test]
fn repetitions_above_max_are_clamped() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("surface_cli").unwrap();
    cmd.arg("--config")
        .arg(&cfg)
        .args(["scan", "--repetitions", "5000"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Reading  50:"))
        .stdout(predicate::str::contains("Reading  51:").not());
}

#[test]
fn no_echo_reports_insufficient_data() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, 1.0, 0.05);

    let mut cmd = Command::cargo_bin("surface_cli").unwrap();
    cmd.arg("--config").arg(&cfg).arg("scan");
    cmd.assert()
        .code(3)
        .stdout(predicate::str::contains(
            "What happened: Failed to get enough valid readings (0 of 10)",
        ))
        .stdout(predicate::str::contains("Shape:").not());
}

#[test]
fn invalid_config_is_explained() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[sampling]\nbatch_size = 0\n").unwrap();

    let mut cmd = Command::cargo_bin("surface_cli").unwrap();
    cmd.arg("--config").arg(&path).arg("scan");
    cmd.assert()
        .code(1)
        .stdout(predicate::str::contains("What happened: Invalid configuration"))
        .stdout(predicate::str::contains("batch_size"));
}

#[rstest]
fn cli_reports_bad_calibration_header() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    // Write a bad-header CSV
    let bad_csv = dir.path().join("calib.csv");
    let mut f = fs::File::create(&bad_csv).unwrap();
    writeln!(f, "kind,value").unwrap();
    writeln!(f, "flat,0.05").unwrap();

    let mut cmd = Command::cargo_bin("surface_cli").unwrap();
    cmd.arg("--config")
        .arg(&cfg)
        .args(["calibrate", "suggest", "--from"])
        .arg(&bad_csv);

    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("Invalid headers"));
}

#[test]
fn suggest_prints_calibration_snippet() {
    let dir = tempdir().unwrap();
    let csv = dir.path().join("samples.csv");
    fs::write(
        &csv,
        "label,sigma\nflat,0.05\nflat,0.08\nslightly_curved,0.12\nslightly_curved,0.2\ncurved_irregular,0.5\nreflective,0.05\nabsorbent,0.142\n",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("surface_cli").unwrap();
    cmd.args(["calibrate", "suggest", "--from"]).arg(&csv);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("[calibration]"))
        .stdout(predicate::str::contains("flat_max_sigma = 0.1"))
        .stdout(predicate::str::contains("slightly_curved_max_sigma = 0.35"))
        .stdout(predicate::str::contains("absorption_threshold = 0.096"))
        .stdout(predicate::str::contains("WARNING").not());
}

#[test]
fn suggest_without_flat_samples_fails() {
    let dir = tempdir().unwrap();
    let csv = dir.path().join("samples.csv");
    fs::write(&csv, "label,sigma\nslightly_curved,0.2\n").unwrap();

    let mut cmd = Command::cargo_bin("surface_cli").unwrap();
    cmd.args(["calibrate", "suggest", "--from"]).arg(&csv);
    cmd.assert()
        .code(1)
        .stdout(predicate::str::contains("No flat-surface samples"));
}

#[test]
fn shape_calibration_saves_samples() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let out = dir.path().join("shape.csv");

    let mut cmd = assert_cmd::Command::cargo_bin("surface_cli").unwrap();
    cmd.arg("--config")
        .arg(&cfg)
        .args(["calibrate", "shape", "--readings", "3", "--save"])
        .arg(&out)
        .write_stdin("\n\n\n");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("[calibration]"))
        .stderr(predicate::str::contains("Press Enter"));

    let text = fs::read_to_string(&out).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("label,sigma"));
    assert_eq!(lines.filter(|l| l.starts_with("flat,")).count(), 3);
}

#[test]
fn material_calibration_suggests_threshold() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, 0.0, 1.0);

    let mut cmd = assert_cmd::Command::cargo_bin("surface_cli").unwrap();
    cmd.arg("--config")
        .arg(&cfg)
        .args(["--json", "calibrate", "material", "--readings", "5"])
        .write_stdin("\n\n");
    let out = cmd.assert().success().get_output().stdout.clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["absorption_suggested"], true);
    assert_eq!(v["shape_suggested"], false);
    assert!(v["calibration"]["absorption_threshold"].as_f64().unwrap() > 0.0);
}

fn write_logging_config(dir: &tempfile::TempDir, dropout_ratio: f64) -> (PathBuf, PathBuf) {
    let base = write_config(dir, dropout_ratio, 0.05);
    let log = dir.path().join("surface.log");
    let mut text = fs::read_to_string(&base).unwrap();
    text.push_str(&format!(
        "\n[logging]\nfile = '{}'\nlevel = \"info\"\n",
        log.display()
    ));
    fs::write(&base, text).unwrap();
    (base, log)
}

#[test]
fn file_sink_is_flushed_on_success() {
    let dir = tempdir().unwrap();
    let (cfg, log) = write_logging_config(&dir, 0.0);

    let mut cmd = Command::cargo_bin("surface_cli").unwrap();
    cmd.env_remove("RUST_LOG")
        .arg("--config")
        .arg(&cfg)
        .args(["scan", "--repetitions", "3"]);
    cmd.assert().success();

    let text = fs::read_to_string(&log).unwrap();
    assert!(text.contains("scan complete"), "log file: {text}");
    let first: serde_json::Value = serde_json::from_str(text.lines().next().unwrap()).unwrap();
    assert!(first.get("fields").is_some());
}

#[test]
fn file_sink_is_flushed_before_error_exit() {
    let dir = tempdir().unwrap();
    let (cfg, log) = write_logging_config(&dir, 1.0);

    let mut cmd = Command::cargo_bin("surface_cli").unwrap();
    cmd.env_remove("RUST_LOG")
        .arg("--config")
        .arg(&cfg)
        .args(["scan", "--repetitions", "3"]);
    cmd.assert().code(3);

    let text = fs::read_to_string(&log).unwrap();
    assert!(text.contains("scan start"), "log file: {text}");
    assert!(text.contains("command failed"), "log file: {text}");
}
