use std::path::Path;

use assert_cmd::Command;
use serde_json::Value;

const NEWS_CSV: &str = "Website,Text\n\
a.com,Fraud ring exposed in London and Paris.\n\
b.com,Bribery inquiry opens in London.\n\
c.com,Weather in Paris.\n";

fn command(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("news-insights").expect("binary exists");
    cmd.current_dir(workdir)
        .env("DATA_DIR", workdir.join("data"))
        .env("OUTPUTS_DIR", workdir.join("outputs"))
        .env(
            "TAXONOMY_PATH",
            Path::new(env!("CARGO_MANIFEST_DIR")).join("config/crimes.json"),
        )
        .env_remove("GRAPH_SAMPLE_SIZE")
        .env_remove("GRAPH_LABELS")
        .env_remove("GRAPH_EDGE_POLICY");
    cmd
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn run_writes_every_artefact() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("news.csv");
    std::fs::write(&input, NEWS_CSV).unwrap();

    command(dir.path())
        .args(["run", "--engine", "gazetteer", "--input"])
        .arg(&input)
        .assert()
        .success();

    let outputs = dir.path().join("outputs");
    assert_eq!(
        std::fs::read_to_string(outputs.join("region_counts.csv")).unwrap(),
        "Region,Crime Count\nLondon,2\nParis,2\n"
    );
    assert_eq!(
        read_json(&outputs.join("categories.json")),
        serde_json::json!({"Fraud": 1, "Corruption": 1})
    );

    let summary = read_json(&outputs.join("summary.json"));
    assert_eq!(summary["documents"], 3);
    assert_eq!(summary["failed_documents"], 0);
    assert_eq!(summary["regions"], 2);
    assert_eq!(summary["graph_nodes"], 2);
    assert_eq!(summary["graph_edges"], 1);

    let enriched = std::fs::read_to_string(outputs.join("insights_results.csv")).unwrap();
    assert!(enriched.starts_with("Website,Text,Entities,Relationships,Category\n"));
    assert!(enriched.contains("Uncategorised"));
}

#[test]
fn run_graph_flags_override_settings() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("news.csv");
    std::fs::write(&input, NEWS_CSV).unwrap();

    command(dir.path())
        .env("GRAPH_SAMPLE_SIZE", "10")
        .args(["run", "--engine", "gazetteer", "--sample-size", "0", "--input"])
        .arg(&input)
        .assert()
        .success();

    let summary = read_json(&dir.path().join("outputs/summary.json"));
    assert_eq!(summary["graph_nodes"], 0);
    let graph = read_json(&dir.path().join("outputs/graph.json"));
    assert!(graph["nodes"].as_array().unwrap().is_empty());

    command(dir.path())
        .args([
            "run",
            "--engine",
            "gazetteer",
            "--labels",
            "ORG",
            "--edge-policy",
            "accumulate",
            "--input",
        ])
        .arg(&input)
        .assert()
        .success();

    let graph = read_json(&dir.path().join("outputs/graph.json"));
    assert_eq!(graph["policy"], "accumulate");
    assert!(graph["edges"].as_array().unwrap().is_empty());
}

#[test]
fn missing_text_column_writes_empty_artefacts() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad.csv");
    std::fs::write(&input, "Website,Body\na.com,Fraud in London.\n").unwrap();

    command(dir.path())
        .args(["run", "--engine", "gazetteer", "--input"])
        .arg(&input)
        .assert()
        .success();

    let outputs = dir.path().join("outputs");
    assert_eq!(
        std::fs::read_to_string(outputs.join("region_counts.csv")).unwrap(),
        "Region,Crime Count\n"
    );
    assert_eq!(read_json(&outputs.join("categories.json")), serde_json::json!({}));
    assert_eq!(
        std::fs::read_to_string(outputs.join("insights_results.csv")).unwrap(),
        "Website,Text,Entities,Relationships,Category\n"
    );
    let summary = read_json(&outputs.join("summary.json"));
    assert_eq!(summary["documents"], 0);
    assert_eq!(summary["graph_nodes"], 0);
}

#[test]
fn extract_then_regions_and_graph() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("news.csv");
    let enriched = dir.path().join("enriched.csv");
    std::fs::write(&input, NEWS_CSV).unwrap();

    command(dir.path())
        .args(["extract", "--engine", "gazetteer", "--input"])
        .arg(&input)
        .arg("--output")
        .arg(&enriched)
        .assert()
        .success();
    let table = std::fs::read_to_string(&enriched).unwrap();
    assert!(table.contains("[('London', 'GPE'), ('Paris', 'GPE')]"));
    assert!(table.contains("[('No Subject', 'No Verb', 'No Object')]"));

    let counts = dir.path().join("counts.csv");
    command(dir.path())
        .arg("regions")
        .arg("--input")
        .arg(&enriched)
        .arg("--output")
        .arg(&counts)
        .assert()
        .success();
    assert_eq!(
        std::fs::read_to_string(&counts).unwrap(),
        "Region,Crime Count\nLondon,2\nParis,2\n"
    );

    let dot = dir.path().join("graph.dot");
    command(dir.path())
        .args(["graph", "--format", "dot", "--input"])
        .arg(&enriched)
        .arg("--output")
        .arg(&dot)
        .assert()
        .success();
    let rendered = std::fs::read_to_string(&dot).unwrap();
    assert!(rendered.contains("London"));
    assert!(rendered.contains("Paris"));
}

#[test]
fn classify_reports_distribution() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("news.csv");
    let enriched = dir.path().join("enriched.csv");
    std::fs::write(&input, NEWS_CSV).unwrap();

    command(dir.path())
        .args(["extract", "--engine", "gazetteer", "--input"])
        .arg(&input)
        .arg("--output")
        .arg(&enriched)
        .assert()
        .success();
    command(dir.path())
        .arg("classify")
        .arg("--input")
        .arg(&enriched)
        .assert()
        .success();

    assert_eq!(
        read_json(&dir.path().join("outputs/categories.json")),
        serde_json::json!({"Fraud": 1, "Corruption": 1})
    );
    let categorised = std::fs::read_to_string(dir.path().join("outputs/categorised.csv")).unwrap();
    assert!(categorised.contains(",Fraud\n"));
}
