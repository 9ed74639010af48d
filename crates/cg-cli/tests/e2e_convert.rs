//! End-to-end tests for the `cg` binary.
//!
//! Tests the full pipeline: pattern → log file → graph JSON on disk.

use std::path::Path;
use std::process::{Command, Output};

use serde_json::{Value, json};
use tempfile::TempDir;

const PATTERN: &str = r"(?<event>.*)\n(?<host>\S*) (?<clock>\{.*\})";

fn cg_binary() -> String {
    env!("CARGO_BIN_EXE_cg").to_string()
}

/// Run `cg` inside `temp` with config lookups confined to it.
fn run_cg(temp: &Path, args: &[&str]) -> Output {
    Command::new(cg_binary())
        .current_dir(temp)
        .env("HOME", temp)
        .env("XDG_CONFIG_HOME", temp.join(".config"))
        .env_remove("CG_OUTPUT_DIR")
        .env_remove("CG_PARALLEL")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("failed to run cg")
}

fn write_log(temp: &Path, name: &str, contents: &str) {
    std::fs::write(temp.join(name), contents).unwrap();
}

fn read_graph(path: &Path) -> Value {
    let content = std::fs::read_to_string(path).unwrap();
    serde_json::from_str(&content).unwrap()
}

/// (source, target, description) of every cross link in a graph document.
fn cross_links(graph: &Value) -> Vec<(&str, &str, &str)> {
    graph["links"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|l| l["source"] != l["target"])
        .map(|l| {
            (
                l["source"].as_str().unwrap(),
                l["target"].as_str().unwrap(),
                l["description"].as_str().unwrap(),
            )
        })
        .collect()
}

/// Test the send/receive scenario end to end.
#[test]
fn test_send_receive_graph() {
    let temp = TempDir::new().unwrap();
    write_log(
        temp.path(),
        "exec.log",
        "send\nA {\"A\":1}\nreceive\nB {\"A\":1, \"B\":1}\n",
    );

    let output = run_cg(temp.path(), &[PATTERN, "exec.log"]);
    assert!(
        output.status.success(),
        "cg should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "Wrote graph (2 hosts, 3 links) to exec.json\n"
    );

    let graph = read_graph(&temp.path().join("exec.json"));
    assert_eq!(
        graph,
        json!({
            "nodes": [
                {"id": "A", "description": ""},
                {"id": "B", "description": ""}
            ],
            "links": [
                {"source": "A", "target": "A", "timestamp": 1, "clock": {"A": 1}, "description": "send"},
                {"source": "B", "target": "B", "timestamp": 1, "clock": {"A": 1, "B": 1}, "description": "receive"},
                {"source": "A", "target": "B", "timestamp": 1, "clock": {"A": 1, "B": 1}, "description": "receive"}
            ]
        })
    );
}

/// Test ShiViz's default pattern, with unescaped clock braces, on a
/// host-first log.
#[test]
fn test_shiviz_default_pattern() {
    let temp = TempDir::new().unwrap();
    write_log(
        temp.path(),
        "shiviz.log",
        "A {\"A\":1}\nsend\nB {\"A\":1, \"B\":1}\nreceive\n",
    );

    let output = run_cg(
        temp.path(),
        &["--stdout", r"(?<host>\S*) (?<clock>{.*})\n(?<event>.*)", "shiviz.log"],
    );
    assert!(
        output.status.success(),
        "cg should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let graph: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(graph["nodes"].as_array().unwrap().len(), 2);
    assert_eq!(cross_links(&graph), [("A", "B", "receive")]);
}

/// Test that every qualifying source links to a target (multigraph).
#[test]
fn test_every_qualifying_pair_is_linked() {
    let temp = TempDir::new().unwrap();
    let log = "\
a sends to b
A {\"A\":1}
b receives from a
B {\"A\":1, \"B\":1}
b sends to c
B {\"A\":1, \"B\":2}
c receives from b
C {\"A\":1, \"B\":2, \"C\":1}
";
    write_log(temp.path(), "three.log", log);

    let output = run_cg(temp.path(), &["--stdout", PATTERN, "three.log"]);
    assert!(output.status.success());

    let graph: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        cross_links(&graph),
        [
            ("A", "B", "b receives from a"),
            ("A", "B", "b sends to c"),
            ("A", "C", "c receives from b"),
            ("B", "C", "c receives from b"),
        ]
    );
    assert!(!temp.path().join("three.json").exists());
}

/// Test that a pair with two differing shared hosts is not linked.
#[test]
fn test_indirect_pair_is_not_linked() {
    let temp = TempDir::new().unwrap();
    let log = "\
c starts
C {\"C\":1}
d starts
D {\"D\":1}
a hears c and d
A {\"A\":1, \"C\":1, \"D\":1}
b hears a
B {\"A\":1, \"B\":1, \"C\":2, \"D\":2}
";
    write_log(temp.path(), "indirect.log", log);

    let output = run_cg(temp.path(), &["--stdout", PATTERN, "indirect.log"]);
    assert!(output.status.success());

    // "b hears a" matches A:1 but disagrees with "a hears c and d" on C and D.
    let graph: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        cross_links(&graph),
        [("C", "A", "a hears c and d"), ("D", "A", "a hears c and d")]
    );
}

/// Test that wrong arity prints usage and fails.
#[test]
fn test_wrong_arity_prints_usage() {
    let temp = TempDir::new().unwrap();

    for args in [&[][..], &[PATTERN][..], &[PATTERN, "a.log", "b.log"][..]] {
        let output = run_cg(temp.path(), args);
        assert!(!output.status.success(), "arity {} should fail", args.len());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Usage:"), "missing usage: {stderr}");
    }
}

/// Test that a pattern missing tags fails before the log is read.
#[test]
fn test_pattern_missing_tags_fails() {
    let temp = TempDir::new().unwrap();

    let output = run_cg(temp.path(), &[r"(?<host>\S*) (.*)", "does-not-exist.log"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("missing capture group(s): clock, event"),
        "{stderr}"
    );
    assert!(!stderr.contains("failed to read"), "{stderr}");
}

/// Test that a missing log file is reported.
#[test]
fn test_missing_log_fails() {
    let temp = TempDir::new().unwrap();

    let output = run_cg(temp.path(), &[PATTERN, "does-not-exist.log"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("failed to read does-not-exist.log"),
        "{stderr}"
    );
}

/// Test that a malformed clock aborts without writing output.
#[test]
fn test_malformed_clock_fails() {
    let temp = TempDir::new().unwrap();
    write_log(
        temp.path(),
        "bad.log",
        "ok\nA {\"A\":1}\nbroken\nB {\"A\":1, \"B\":x}\n",
    );

    let output = run_cg(temp.path(), &[PATTERN, "bad.log"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid log entry on line 3"), "{stderr}");
    assert!(!temp.path().join("bad.json").exists());
}

/// Test that an empty log yields an empty graph, not an error.
#[test]
fn test_empty_log_yields_empty_graph() {
    let temp = TempDir::new().unwrap();
    write_log(temp.path(), "empty.log", "");

    let output = run_cg(temp.path(), &[PATTERN, "empty.log"]);
    assert!(output.status.success());

    let graph = read_graph(&temp.path().join("empty.json"));
    assert_eq!(graph, json!({"nodes": [], "links": []}));
}

/// Test that the config file's output directory is honoured.
#[test]
fn test_config_output_dir() {
    let temp = TempDir::new().unwrap();
    write_log(temp.path(), "run.log", "send\nA {\"A\":1}\n");
    std::fs::create_dir(temp.path().join("graphs")).unwrap();
    std::fs::write(
        temp.path().join("cg.toml"),
        "output_dir = \"graphs\"\nparallel = false\n",
    )
    .unwrap();

    let output = run_cg(temp.path(), &["--config", "cg.toml", PATTERN, "run.log"]);
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let graph = read_graph(&temp.path().join("graphs/run.json"));
    assert_eq!(graph["links"].as_array().unwrap().len(), 1);
}
