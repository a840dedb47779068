//! Binary-level checks: the subcommands read their inputs, write their
//! outputs, and report failures through the exit status.

use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test").join(name)
}

#[test]
fn parse_reads_stdin_and_prints_records() -> anyhow::Result<()> {
    let assert = Command::cargo_bin("bikeviz")?
        .args(["parse", "--data", "-"])
        .write_stdin("Station Name,Docks in Service\nA,5\nB,\n")
        .assert()
        .success();

    let out = String::from_utf8(assert.get_output().stdout.clone())?;
    let value: serde_json::Value = serde_json::from_str(&out)?;
    assert_eq!(
        value,
        serde_json::json!([
            {"Station Name": "A", "Docks in Service": 5.0},
            {"Station Name": "B", "Docks in Service": 0.0}
        ])
    );
    Ok(())
}

#[test]
fn render_json_writes_one_file_per_container() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    Command::cargo_bin("bikeviz")?
        .args(["render", "--format", "json", "--attribute", "Docks in Service"])
        .arg("--data")
        .arg(fixture("stations.csv"))
        .arg("--out")
        .arg(dir.path())
        .assert()
        .success();

    for container in ["chart1", "chart2", "chart3", "chart4"] {
        assert!(dir.path().join(format!("{}.vl.json", container)).exists());
    }
    let chart3: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("chart3.vl.json"))?)?;
    assert_eq!(chart3["mark"], "line");
    assert_eq!(chart3["encoding"]["y"]["field"], "Docks in Service");
    Ok(())
}

#[test]
fn render_html_uses_config_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let config_path = dir.path().join("bikeviz.json");
    let config = serde_json::json!({
        "data": fixture("stations.csv"),
        "attribute": "Available Docks",
        "attribute_options": ["Available Bikes", "Available Docks"],
        "heatmap_scatter_spec": fixture("heatmap_scatter.json"),
        "out_dir": dir.path().join("site")
    });
    fs::write(&config_path, config.to_string())?;

    Command::cargo_bin("bikeviz")?
        .arg("render")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success();

    let page = fs::read_to_string(dir.path().join("site").join("index.html"))?;
    assert!(page.contains("<option value=\"Available Docks\" selected>"));
    assert!(page.contains("\"chart5\": {"));
    Ok(())
}

#[test]
fn render_fails_when_data_is_missing() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let assert = Command::cargo_bin("bikeviz")?
        .args(["render", "--data", "/nonexistent/aggregated_data.csv"])
        .arg("--out")
        .arg(dir.path())
        .assert()
        .failure();

    let err = String::from_utf8(assert.get_output().stderr.clone())?;
    assert!(err.contains("could not be loaded"));
    assert!(!dir.path().join("index.html").exists());
    Ok(())
}

#[test]
fn watch_rebuilds_for_each_attribute_line() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    Command::cargo_bin("bikeviz")?
        .args(["watch", "--format", "json"])
        .arg("--data")
        .arg(fixture("stations.csv"))
        .arg("--out")
        .arg(dir.path())
        .write_stdin("Docks in Service\n")
        .assert()
        .success();

    let chart1: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("chart1.vl.json"))?)?;
    assert_eq!(chart1["encoding"]["y"]["field"], "Docks in Service");
    Ok(())
}
