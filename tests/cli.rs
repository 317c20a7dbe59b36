//! Integration tests for the command-line host

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use artboard_batch::MemoryDocument;
use pretty_assertions::assert_eq;
use serde_json::json;

/// Scratch directory holding a copy of the fixture library
fn workspace(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("artboard-batch-{}-{}", name, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("doc.json"), include_str!("fixtures/library.json")).unwrap();
    dir
}

fn artboard_batch() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_artboard-batch"));
    cmd.arg("-c").arg(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/config.toml"));
    cmd
}

fn canvas_names(dir: &Path) -> Vec<String> {
    let doc = MemoryDocument::from_file(&dir.join("doc.json")).expect("Should load");
    doc.canvas_nodes()
        .into_iter()
        .map(|id| doc.node(id).unwrap().name.clone())
        .collect()
}

#[test]
fn test_import_writes_document() {
    let dir = workspace("import-ok");
    let rows = json!([
        {"size": "300x250", "reportingLabel": "A", "car type": "sedan", "alignment": "left"},
        {"size": "160x600", "reportingLabel": "B", "car type": "sedan", "alignment": "left"}
    ]);
    fs::write(dir.join("rows.json"), rows.to_string()).unwrap();

    let status = artboard_batch()
        .arg("import")
        .arg(dir.join("doc.json"))
        .arg(dir.join("rows.json"))
        .status()
        .unwrap();

    assert!(status.success());
    assert_eq!(canvas_names(&dir), vec!["A".to_string(), "B".to_string()]);
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_failed_import_keeps_earlier_rows_on_disk() {
    let dir = workspace("import-partial");
    let rows = json!([
        {"size": "300x250", "reportingLabel": "A", "car type": "sedan", "alignment": "left"},
        {"size": "300x250", "reportingLabel": "B", "car type": "coupe", "alignment": "left"}
    ]);
    fs::write(dir.join("rows.json"), rows.to_string()).unwrap();

    let output = artboard_batch()
        .arg("import")
        .arg(dir.join("doc.json"))
        .arg(dir.join("rows.json"))
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Can not find variant {car type=coupe, alignment=left} for size 300x250"));
    assert_eq!(canvas_names(&dir), vec!["A".to_string()]);
    fs::remove_dir_all(&dir).ok();
}
