use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

const SAMPLE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/census_sample.csv");

/// Run the CLI with an empty config dir so a user config cannot leak in.
fn cli(config_home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("census-scatter").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home);
    cmd
}

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("census-scatter").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("census-scatter"));
}

#[test]
fn fields_prints_summaries() {
    let home = tempfile::tempdir().unwrap();
    cli(home.path())
        .args(["fields", "--data", SAMPLE])
        .assert()
        .success()
        .stdout(predicate::str::contains("8 records, 4 states"))
        .stdout(predicate::str::contains(
            "Literate  count=7 missing=1  min=31000 max=3000000",
        ));
}

#[test]
fn render_writes_svg() {
    let home = tempfile::tempdir().unwrap();
    let out = home.path().join("chart.svg");
    cli(home.path())
        .args(["render", "--data", SAMPLE, "-x", "Persons", "--out"])
        .arg(&out)
        .assert()
        .success();
    let svg = std::fs::read_to_string(&out).unwrap();
    assert!(svg.contains("Persons"));
}

#[test]
fn export_reports_excluded_rows() {
    let home = tempfile::tempdir().unwrap();
    let out = home.path().join("marks.json");
    cli(home.path())
        .args(["export", "--data", SAMPLE, "-y", "Literate", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stderr(predicate::str::contains("1 record(s)"));
    assert!(out.exists());
}

#[test]
fn unknown_field_fails() {
    let home = tempfile::tempdir().unwrap();
    cli(home.path())
        .args(["render", "--data", SAMPLE, "-x", "Nope", "--out"])
        .arg(home.path().join("x.svg"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nope"));
}

#[test]
fn animate_needs_an_output() {
    let home = tempfile::tempdir().unwrap();
    cli(home.path())
        .args(["animate", "--data", SAMPLE, "--change", "500:x=Females"])
        .assert()
        .failure();
}

#[test]
fn animate_writes_frames_with_config() {
    let home = tempfile::tempdir().unwrap();
    let cfg = home.path().join("fast.json");
    std::fs::write(&cfg, r#"{ "transition": { "duration_ms": 100, "delay_per_px": 0 } }"#)
        .unwrap();
    let dir = home.path().join("frames");
    cli(home.path())
        .arg("--config")
        .arg(&cfg)
        .args(["animate", "--data", SAMPLE, "--fps", "20", "--change", "100:x=Females", "--out-dir"])
        .arg(&dir)
        .assert()
        .success();
    let count = std::fs::read_dir(&dir).unwrap().count();
    assert!((4..=10).contains(&count), "frames: {count}");
}

#[test]
fn animate_renders_the_start_once() {
    let home = tempfile::tempdir().unwrap();
    let dir = home.path().join("frames");
    cli(home.path())
        .env("RUST_LOG", "info")
        .args(["animate", "--data", SAMPLE, "--fps", "5", "--out-dir"])
        .arg(&dir)
        .assert()
        .success()
        .stderr(predicate::str::contains("Initial render"))
        .stderr(predicate::str::contains("Update render").not());
}

#[test]
fn animate_rejects_changes_past_the_last_frame() {
    let home = tempfile::tempdir().unwrap();
    let dir = home.path().join("frames");
    cli(home.path())
        .args(["animate", "--data", SAMPLE, "--fps", "30", "--change", "400000:x=Persons", "--out-dir"])
        .arg(&dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("past the last sampled frame"));
    assert!(!dir.exists());
}

// Live test (opt-in): cargo test --features online
#[cfg(feature = "online")]
#[test]
fn fields_from_url() {
    let home = tempfile::tempdir().unwrap();
    cli(home.path())
        .args([
            "fields",
            "--data",
            "https://raw.githubusercontent.com/plotly/datasets/master/2014_usa_states.csv",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing required column"));
}
