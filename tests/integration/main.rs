//! Integration tests for the tikzgraph CLI
//!
//! These tests write diagram snapshots to a temporary directory and drive the
//! compiled binary against them.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const TRIANGLE: &str = r#"{
  "nodes": [
    { "id": 1, "name": "a", "label": "$a$", "point": { "x": 0.0, "y": 0.0 } },
    { "id": 2, "name": "b", "point": { "x": 2.0, "y": 0.0 }, "data": [{ "key": "style", "value": "red" }] },
    { "id": 3, "name": "c", "point": { "x": 1.0, "y": 1.5 } }
  ],
  "edges": [
    { "id": 1, "source": 1, "target": 2, "data": [{ "key": "->" }] },
    { "id": 2, "source": 2, "target": 3, "bend": { "mode": "basic", "bend": 30 } }
  ]
}"#;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn run(args: &[&str], file: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tikzgraph"))
        .args(args)
        .arg(file)
        .output()
        .expect("Failed to execute tikzgraph")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_tikz_command() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "triangle.json", TRIANGLE);

    let output = run(&["tikz"], &file);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("\\begin{tikzpicture}\n"));
    assert!(text.contains("\\node (a) at (0, 0) {$a$};"));
    assert!(text.contains("\\node [style=red] (b) at (2, 0) {};"));
    assert!(text.contains("\\draw [->] (a) to (b);"));
    assert!(text.contains("\\draw [bend left=30] (b) to (c);"));
}

#[test]
fn test_bounds_command() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "triangle.json", TRIANGLE);

    let output = run(&["bounds"], &file);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "0 0 2 1.5");
}

#[test]
fn test_paths_command() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "triangle.json", TRIANGLE);

    let output = run(&["paths"], &file);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "a -> b -> c");
}

#[test]
fn test_flip_command_mirrors_bends() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "triangle.json", TRIANGLE);

    let output = run(&["flip"], &file);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("\\node (a) at (2, 0) {$a$};"));
    assert!(text.contains("\\draw [bend right=30] (b) to (c);"));
}

#[test]
fn test_shift_command_uses_config() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "triangle.json", TRIANGLE);
    let config = write(&dir, "config.toml", "[tikz]\nprecision = 1\nindent = \"  \"\n");

    let output = run(
        &[
            "--config",
            config.to_str().unwrap(),
            "shift",
            "--dx",
            "0.5",
            "--dy",
            "-1",
        ],
        &file,
    );
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("    \\node (c) at (1.5, 0.5) {};"), "{text}");
}

#[test]
fn test_malformed_diagram_fails() {
    let dir = TempDir::new().unwrap();
    let file = write(
        &dir,
        "broken.json",
        r#"{ "nodes": [], "edges": [{ "id": 1, "source": 1, "target": 2 }] }"#,
    );

    let output = run(&["tikz"], &file);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("malformed diagram"), "{stderr}");
}
