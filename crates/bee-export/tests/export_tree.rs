// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs, clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Exports a package into a temporary directory and reads the tree back.

use std::path::Path;

use bee_export::{export, ExportContext, ExportError, Package};
use bee_precomp::{Conditions, ConditionsFile};
use bee_steps::StepError;
use serde_json::{json, Value};

fn package() -> Package {
    serde_json::from_value(json!({
        "id": "tracks",
        "selected_style": "BEE2_CLEAN",
        "styles": [{
            "id": "BEE2_CLEAN",
            "options": {"glass_scale": 0.25, "style_id": "forged"},
            "conditions": [{"priority": 100, "flags": [], "results": []}],
        }],
        "items": [
            {
                "id": "ITEM_TRACK",
                "editor": {"subtype": "track"},
                "config": {"speed": 100},
                "conditions": [{
                    "priority": -1000,
                    "flags": [{"instance": ["instances/track.vmf"]}],
                    "results": [{"name": "LinkedItem", "options": {"group": "tracks"}}],
                }],
            },
            {"id": "ITEM_PLAIN"},
        ],
        "resources": ["materials/track.vmt"],
    }))
    .unwrap()
}

fn read_json(path: &Path) -> Value {
    serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}

#[tokio::test]
async fn writes_the_full_tree() {
    let pack_dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(pack_dir.path().join("materials")).unwrap();
    std::fs::write(pack_dir.path().join("materials/track.vmt"), b"LightmappedGeneric {}").unwrap();
    let out = tempfile::tempdir().unwrap();

    let ctx = ExportContext::new(package(), pack_dir.path(), out.path()).with_dev_mode(true);
    let summary = export(ctx).await.unwrap();
    assert_eq!(summary.style, "BEE2_CLEAN");
    assert_eq!(summary.items, 2);
    assert_eq!(summary.conditions, 2);
    assert_eq!(summary.resources, 1);

    let editor = read_json(&out.path().join("editoritems.json"));
    assert_eq!(editor["style"], "BEE2_CLEAN");
    assert_eq!(editor["items"][0]["id"], "ITEM_TRACK");
    assert_eq!(editor["items"][0]["editor"]["subtype"], "track");

    let config = read_json(&out.path().join("items/ITEM_TRACK/config.json"));
    assert_eq!(config, json!({"speed": 100}));
    assert!(!out.path().join("items/ITEM_PLAIN").exists());

    let copied = std::fs::read(out.path().join("resources/materials/track.vmt")).unwrap();
    assert_eq!(copied, b"LightmappedGeneric {}");

    // Style conditions come before item conditions; reserved options win.
    let vbsp_path = out.path().join("vbsp_config.json");
    let vbsp: ConditionsFile = serde_json::from_value(read_json(&vbsp_path)).unwrap();
    assert_eq!(vbsp.options["style_id"], "BEE2_CLEAN");
    assert_eq!(vbsp.options["package_id"], "tracks");
    assert_eq!(vbsp.options["dev_mode"], true);
    assert_eq!(vbsp.options["glass_scale"], 0.25);
    let sources: Vec<_> = vbsp
        .conditions
        .iter()
        .map(|c| c.source.as_deref())
        .collect();
    assert_eq!(sources, [Some("style:BEE2_CLEAN"), Some("item:ITEM_TRACK")]);

    // The compiler can load what the export wrote.
    let conds = Conditions::from_path(&vbsp_path, true).unwrap();
    assert_eq!(conds.iter().count(), 2);
}

#[tokio::test]
async fn missing_style_fails_the_style_step() {
    let out = tempfile::tempdir().unwrap();
    let ctx = ExportContext::new(package(), out.path(), out.path())
        .with_style(Some("BEE2_NOPE".into()));
    let err = export(ctx).await.unwrap_err();
    match err {
        ExportError::Steps(StepError::Step { name, source }) => {
            assert_eq!(name, "style");
            assert!(source.to_string().contains("BEE2_NOPE"), "{source}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!out.path().join("editoritems.json").exists());
    assert!(!out.path().join("vbsp_config.json").exists());
}

#[tokio::test]
async fn escaping_resources_are_rejected() {
    let out = tempfile::tempdir().unwrap();
    let mut pack = package();
    pack.resources = vec!["../outside.txt".into()];
    let err = export(ExportContext::new(pack, out.path(), out.path())).await.unwrap_err();
    let ExportError::Steps(StepError::Step { name, source }) = err else {
        panic!("expected a step failure");
    };
    assert_eq!(name, "copy_resources");
    assert!(matches!(
        source.downcast_ref::<ExportError>(),
        Some(ExportError::BadResourcePath(_))
    ));
}

#[tokio::test]
async fn package_round_trips_through_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("package.json");
    std::fs::write(&path, serde_json::to_vec(&package()).unwrap()).unwrap();
    assert_eq!(Package::load(&path).await.unwrap(), package());
    assert!(matches!(
        Package::load(&dir.path().join("missing.json")).await,
        Err(ExportError::Io { .. })
    ));
}
