// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs, clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Drives the binary end to end: export a package, then precompile a map.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};

fn write_json(path: &Path, value: &Value) {
    std::fs::write(path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
}

fn read_json(path: &Path) -> Value {
    serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}

fn beecomp(config_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("beecomp").unwrap();
    cmd.arg("--config-dir").arg(config_dir);
    cmd
}

fn package() -> Value {
    json!({
        "id": "tracks",
        "styles": [{"id": "BEE2_CLEAN"}],
        "items": [{
            "id": "ITEM_TRACK",
            "conditions": [{
                "priority": -1000,
                "flags": [{"instance": ["track.vmf"]}],
                "results": [{"name": "LinkedItem", "options": {"group": "t"}}],
            }],
        }],
    })
}

fn track(name: &str, x: f64) -> Value {
    json!({"targetname": name, "file": "track.vmf", "origin": [x, 0.0, 0.0]})
}

#[test]
fn export_then_precomp_links_the_chain() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_json(&root.join("package.json"), &package());
    beecomp(&root.join("cfg"))
        .args(["export", "--package"])
        .arg(root.join("package.json"))
        .arg("--out")
        .arg(root.join("out"))
        .assert()
        .success();
    assert!(root.join("out/vbsp_config.json").exists());
    // The export dir is remembered.
    let prefs = read_json(&root.join("cfg/compiler.json"));
    assert!(prefs["export_dir"].as_str().unwrap().ends_with("out"));

    write_json(
        &root.join("map.json"),
        &json!({
            "instances": [track("a", 0.0), track("b", 128.0)],
            "connections": [{"from": "a", "to": "b"}],
        }),
    );
    beecomp(&root.join("cfg"))
        .args(["precomp", "--map"])
        .arg(root.join("map.json"))
        .arg("--conditions")
        .arg(root.join("out/vbsp_config.json"))
        .arg("--out")
        .arg(root.join("compiled.json"))
        .assert()
        .success();

    let compiled = read_json(&root.join("compiled.json"));
    let types: Vec<_> = compiled["instances"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["fixups"]["type"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(types, ["start", "end"]);
    assert_eq!(compiled["connections"], json!([]));
}

#[test]
fn user_errors_are_written_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_json(
        &root.join("vbsp_config.json"),
        &json!({"conditions": [{
            "priority": -1000,
            "flags": [{"instance": ["track.vmf"]}],
            "results": [{"name": "LinkedItem"}],
        }]}),
    );
    write_json(
        &root.join("map.json"),
        &json!({
            "instances": [track("a", 0.0), track("b", 128.0), track("c", 0.0)],
            "connections": [{"from": "a", "to": "b"}, {"from": "a", "to": "c"}],
        }),
    );
    beecomp(&root.join("cfg"))
        .args(["precomp", "--map"])
        .arg(root.join("map.json"))
        .arg("--conditions")
        .arg(root.join("vbsp_config.json"))
        .arg("--out")
        .arg(root.join("compiled.json"))
        .assert()
        .code(2);

    let err = read_json(&root.join("error.json"));
    assert_eq!(err["kind"], "chaining_multi_output");
    assert!(!root.join("compiled.json").exists());
}

#[test]
fn export_without_a_destination_fails() {
    let dir = tempfile::tempdir().unwrap();
    write_json(&dir.path().join("package.json"), &package());
    beecomp(&dir.path().join("cfg"))
        .args(["export", "--package"])
        .arg(dir.path().join("package.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("export_dir"));
}
