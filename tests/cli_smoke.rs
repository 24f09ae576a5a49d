use assert_cmd::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn entryfill(dir: &Path) -> Command {
    let bin = assert_cmd::cargo::cargo_bin!("entryfill");
    let mut cmd = Command::new(bin);
    cmd.current_dir(dir)
        .env("ENTRYFILL_STORE", dir.join("store.json"))
        .env_remove("RUST_LOG")
        .env_remove("ENTRYFILL_LOG");
    cmd
}

fn write_page(dir: &Path) -> std::path::PathBuf {
    let page = json!({
        "url": "https://careers.example.test/apply",
        "nodes": [
            { "tag": "label", "attrs": { "for": "sei" }, "children": ["氏名（姓）"] },
            { "tag": "input", "attrs": { "type": "text", "id": "sei", "name": "f1" } },
            { "tag": "input", "attrs": { "type": "hidden", "name": "token" }, "value": "x" },
            { "tag": "input", "attrs": { "type": "submit", "value": "送信" } }
        ]
    });
    let path = dir.join("page.json");
    fs::write(&path, serde_json::to_string_pretty(&page).unwrap()).unwrap();
    path
}

#[test]
fn profile_template_prints_json() {
    let dir = TempDir::new().unwrap();
    let assert = entryfill(dir.path()).args(["profile", "template"]).assert().success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    let template: Value = serde_json::from_str(&stdout).expect("template is JSON");
    assert!(template.get("kanji_sei").is_some());
    assert!(template.get("address").is_some());
}

#[test]
fn inspect_skips_non_data_inputs() {
    let dir = TempDir::new().unwrap();
    let page = write_page(dir.path());
    let assert = entryfill(dir.path())
        .args(["--output", "json", "inspect"])
        .arg(&page)
        .assert()
        .success();

    let controls: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    let controls = controls.as_array().expect("array of controls");
    assert_eq!(controls.len(), 1);
    assert_eq!(controls[0]["name"], "f1");
}

#[test]
fn fill_writes_the_filled_snapshot() {
    let dir = TempDir::new().unwrap();
    let page = write_page(dir.path());
    let profile = dir.path().join("profile.json");
    fs::write(&profile, r#"{ "kanji_sei": "山田" }"#).unwrap();
    let out = dir.path().join("out").join("filled.json");

    entryfill(dir.path())
        .args(["profile", "set"])
        .arg(&profile)
        .assert()
        .success();
    let assert = entryfill(dir.path())
        .args(["--output", "json", "fill"])
        .arg(&page)
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    let summary: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(summary["filled_count"], 1);
    let filled = fs::read_to_string(&out).unwrap();
    assert!(filled.contains("山田"));
}

#[test]
fn malformed_import_fails_and_stores_nothing() {
    let dir = TempDir::new().unwrap();
    let bad = dir.path().join("bad.json");
    fs::write(&bad, "[1, 2, 3]").unwrap();

    entryfill(dir.path())
        .args(["patterns", "import", "broken"])
        .arg(&bad)
        .assert()
        .failure();

    let assert = entryfill(dir.path())
        .args(["--output", "json", "patterns", "list"])
        .assert()
        .success();
    let listing: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(listing["patterns"], json!([]));
}
