//! Integration tests for the mindmap-view binary.
//!
//! These tests run the compiled binary on the hierarchies in tests/fixtures and
//! compare the outline against the matching .expect.txt files.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use serde_json::Value;

fn binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_mindmap-view"))
}

fn fixtures_dir() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path
}

/// Run the binary with `input` on stdin and return the raw output.
fn run_raw(input: &str, args: &[&str]) -> Output {
    Command::new(binary_path())
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .and_then(|mut child| {
            use std::io::Write;
            if let Some(ref mut stdin) = child.stdin {
                stdin.write_all(input.as_bytes()).ok();
            }
            child.wait_with_output()
        })
        .expect("Failed to run binary")
}

/// Run the binary and return stdout, failing the test on a non-zero exit.
fn run_binary(input: &str, args: &[&str]) -> String {
    let output = run_raw(input, args);
    assert!(
        output.status.success(),
        "Binary exited with {:?}:\nstderr: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("Non-UTF8 output")
}

fn fixture(name: &str) -> String {
    let path = fixtures_dir().join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Cannot read {:?}: {}", path, e))
}

/// Find all (name, json_file, expect_file) triples in the fixtures directory.
fn find_fixture_pairs() -> Vec<(String, PathBuf, PathBuf)> {
    let dir = fixtures_dir();
    let mut pairs = Vec::new();
    if let Ok(entries) = fs::read_dir(&dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let expect_path = dir.join(format!("{}.expect.txt", name));
            if expect_path.exists() {
                pairs.push((name, path, expect_path));
            }
        }
    }
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    pairs
}

const DUPLICATE_IDS: &str = r#"{
  "id": "root",
  "data": { "label": "Root" },
  "children": [
    { "id": "dup", "data": { "label": "First" }, "children": [] },
    { "id": "dup", "data": { "label": "Second" }, "children": [] }
  ]
}"#;

// ─── Golden file tests ──────────────────────────────────────────────────────

#[test]
fn test_all_fixtures_match_expect() {
    let pairs = find_fixture_pairs();
    assert!(!pairs.is_empty(), "No fixture pairs found in {:?}", fixtures_dir());

    let mut failures = Vec::new();
    for (name, json_file, expect_file) in &pairs {
        let src = fs::read_to_string(json_file)
            .unwrap_or_else(|e| panic!("Cannot read {:?}: {}", json_file, e));
        let expected = fs::read_to_string(expect_file)
            .unwrap_or_else(|e| panic!("Cannot read {:?}: {}", expect_file, e));

        let actual = run_binary(&src, &["outline"]);
        if actual != expected {
            failures.push(format!(
                "FAIL: {}\n--- expected ---\n{}--- actual ---\n{}",
                name, expected, actual
            ));
        }
    }

    if !failures.is_empty() {
        panic!(
            "Golden file mismatches ({}/{}):\n{}",
            failures.len(),
            pairs.len(),
            failures.join("\n")
        );
    }
}

// ─── Projection ─────────────────────────────────────────────────────────────

#[test]
fn test_project_emits_nodes_and_edges() {
    let output = run_binary(&fixture("three_nodes.json"), &["project"]);
    let json: Value = serde_json::from_str(&output).expect("project output is JSON");

    let nodes = json["nodes"].as_array().expect("nodes array");
    let ids: Vec<&str> = nodes.iter().filter_map(|n| n["id"].as_str()).collect();
    assert_eq!(ids, vec!["root", "node-1", "node-2"]);
    assert_eq!(nodes[0]["text"], "Root Topic");
    assert_eq!(nodes[0]["width"], 100);
    assert_eq!(nodes[0]["height"], 50);

    let edges = json["edges"].as_array().expect("edges array");
    let edge_ids: Vec<&str> = edges.iter().filter_map(|e| e["id"].as_str()).collect();
    assert_eq!(edge_ids, vec!["root-node-1", "root-node-2"]);
    assert_eq!(edges[1]["from"], "root");
    assert_eq!(edges[1]["to"], "node-2");
}

#[test]
fn test_project_vertical_direction_uses_tall_nodes() {
    let output = run_binary(&fixture("three_nodes.json"), &["project", "--direction", "TD"]);
    let json: Value = serde_json::from_str(&output).expect("project output is JSON");
    for node in json["nodes"].as_array().expect("nodes array") {
        assert_eq!(node["height"], 80);
    }
}

#[test]
fn test_project_with_handles_hides_domain_ids() {
    let output = run_binary(&fixture("three_nodes.json"), &["project", "--handles"]);
    let json: Value = serde_json::from_str(&output).expect("project output is JSON");
    for node in json["nodes"].as_array().expect("nodes array") {
        let id = node["id"].as_str().expect("node id");
        assert!(id.starts_with("__mm_"), "expected a handle, got {}", id);
    }
}

#[test]
fn test_project_unwraps_saved_map_document() {
    let output = run_binary(&fixture("transformer_paper.json"), &["project"]);
    let json: Value = serde_json::from_str(&output).expect("project output is JSON");
    assert_eq!(json["nodes"].as_array().map(Vec::len), Some(9));
    assert_eq!(json["edges"].as_array().map(Vec::len), Some(8));
}

#[test]
fn test_null_hierarchy_projects_to_nothing() {
    let output = run_binary("null", &["project"]);
    let json: Value = serde_json::from_str(&output).expect("project output is JSON");
    assert_eq!(json["nodes"].as_array().map(Vec::len), Some(0));
    assert_eq!(json["edges"].as_array().map(Vec::len), Some(0));
    assert_eq!(run_binary("null", &["outline"]), "");
}

// ─── Resolution ─────────────────────────────────────────────────────────────

#[test]
fn test_resolve_tiers() {
    let src = fixture("transformer_paper.json");
    assert_eq!(run_binary(&src, &["resolve", "node-5"]), "node-5\tTraining\tDirect\n");
    assert_eq!(
        run_binary(&src, &["resolve", "ref-3-node-node-18"]),
        "node-18\tResults\tPrefixStripped\n"
    );
    assert_eq!(
        run_binary(&src, &["resolve", "canvas/node-7"]),
        "node-7\tRegularization\tFuzzy\n"
    );
}

#[test]
fn test_resolve_miss_exits_nonzero() {
    let output = run_raw(&fixture("three_nodes.json"), &["resolve", "nowhere"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no node matches 'nowhere'"), "stderr: {}", stderr);
}

#[test]
fn test_resolve_without_fuzzy_rejects_suffix_match() {
    let output = run_raw(&fixture("three_nodes.json"), &["resolve", "canvas/node-2", "--no-fuzzy"]);
    assert_eq!(output.status.code(), Some(1));
}

// ─── Flag tests ─────────────────────────────────────────────────────────────

#[test]
fn test_ascii_flag() {
    let output = run_binary(&fixture("transformer_paper.json"), &["outline", "--ascii"]);
    assert!(!output.contains('├'), "Unicode char found in --ascii output");
    assert!(!output.contains('└'), "Unicode char found in --ascii output");
    assert!(!output.contains('│'), "Unicode char found in --ascii output");
    assert!(output.contains("|-- Model Architecture"));
    assert!(output.contains("`-- Results"));
}

#[test]
fn test_outline_select_marks_resolved_node() {
    let output = run_binary(
        &fixture("three_nodes.json"),
        &["outline", "--ascii", "--select", "ref-0-node-node-2"],
    );
    assert_eq!(output, "Root Topic\n|-- Sub A\n`-- Sub B <\n");
}

#[test]
fn test_duplicate_ids_rejected_by_default() {
    let output = run_raw(DUPLICATE_IDS, &["outline"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("duplicate node id 'dup'"), "stderr: {}", stderr);
}

#[test]
fn test_allow_duplicates_keeps_last_label() {
    let output = run_binary(DUPLICATE_IDS, &["resolve", "dup", "--allow-duplicates"]);
    assert_eq!(output, "dup\tSecond\tDirect\n");
}

#[test]
fn test_reads_from_file() {
    let path = fixtures_dir().join("three_nodes.json");
    let output = run_binary("", &["outline", "--input", path.to_str().expect("utf-8 path")]);
    assert_eq!(output, fixture("three_nodes.expect.txt"));
}

#[test]
fn test_output_to_file() {
    let dir = std::env::temp_dir().join("mindmap_view_test_write");
    fs::create_dir_all(&dir).ok();
    let out_file = dir.join("projection.json");

    let out_arg = out_file.to_str().expect("utf-8 path");
    let stdout = run_binary(&fixture("three_nodes.json"), &["project", "--output", out_arg]);
    assert!(stdout.is_empty());

    let content = fs::read_to_string(&out_file).expect("output file should exist");
    let json: Value = serde_json::from_str(&content).expect("file holds JSON");
    assert_eq!(json["direction"], "LR");

    fs::remove_file(&out_file).ok();
    fs::remove_dir(&dir).ok();
}

#[test]
fn test_outline_with_child_reusing_root_id() {
    let src = r#"{"id": "root", "label": "Root", "children": [
        {"id": "x", "label": "X", "children": [{"id": "root", "label": "Again"}]}
    ]}"#;
    let output = run_binary(src, &["outline", "--ascii", "--allow-duplicates"]);
    assert_eq!(output, "Root\n`-- X\n    `-- Root\n");
}

#[test]
fn test_log_output_has_no_colour_when_piped() {
    let output = run_raw(&fixture("three_nodes.json"), &["-v", "resolve", "node-1"]);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.is_empty(), "expected debug logs on stderr");
    assert!(!stderr.contains('\u{1b}'), "ANSI escape in piped stderr: {:?}", stderr);
}
