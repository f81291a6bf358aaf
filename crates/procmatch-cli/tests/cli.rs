use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CATALOG: &str = "codigo;descricao\n\
40301630;HEMOGRAMA COMPLETO\n\
40316521;TSH - HORMONIO TIREOESTIMULANTE\n\
40302040;GLICOSE\n";

const ORDER: &str = "PEDIDO MEDICO\n40301630\nGLICOSE\n";

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("procedimentos.csv"), CATALOG).unwrap();
        fs::write(dir.path().join("config.json"), "{}").unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// `procmatch` isolated from the user config and the environment.
    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("procmatch").unwrap();
        cmd.env_remove("PROCEDURES_CSV")
            .env_remove("MATCHER_THRESHOLD")
            .env_remove("RUST_LOG")
            .arg("--config")
            .arg(self.path("config.json"));
        cmd
    }

    fn catalog(&self) -> PathBuf {
        self.path("procedimentos.csv")
    }
}

fn parse_json(output: &[u8]) -> serde_json::Value {
    serde_json::from_slice(output).unwrap()
}

fn log_files(dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|e| e == "json"))
        .collect()
}

#[test]
fn process_prints_codes_and_trace_as_json() {
    let ws = Workspace::new();
    let input = ws.write("pedido.txt", ORDER);

    let output = ws
        .cmd()
        .arg("process")
        .arg(&input)
        .arg("--catalog")
        .arg(ws.catalog())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let value = parse_json(&output);
    assert_eq!(value["codes"], serde_json::json!(["40301630", "40302040"]));
    assert_eq!(value["trace"][0]["kind"], "regex_pass");
    assert_eq!(value["trace"][0]["found"], serde_json::json!(["40301630"]));
}

#[test]
fn process_reads_stdin() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["process", "-", "-f", "text", "--show-trace", "--catalog"])
        .arg(ws.catalog())
        .write_stdin("40301630 hemograma\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("40301630"))
        .stdout(predicate::str::contains("DECISION TRACE"));
}

#[test]
fn process_uses_catalog_from_environment() {
    let ws = Workspace::new();
    let input = ws.write("pedido.txt", "40302040\n");

    ws.cmd()
        .env("PROCEDURES_CSV", ws.catalog())
        .args(["process", "-f", "csv"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("code,description,stage,score,line"))
        .stdout(predicate::str::contains("40302040,GLICOSE,regex"));
}

#[test]
fn process_threshold_flag_overrides_environment() {
    let ws = Workspace::new();
    let input = ws.write("pedido.txt", "GLICOSE\n");

    // A threshold above any score leaves only the contains rule, which a
    // single word outside the allowlist cannot fire.
    let output = ws
        .cmd()
        .env("MATCHER_THRESHOLD", "0.1")
        .args(["process", "--threshold", "1.5", "--catalog"])
        .arg(ws.catalog())
        .arg(&input)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    assert_eq!(parse_json(&output)["codes"], serde_json::json!([]));
}

#[test]
fn process_rejects_invalid_threshold_variable() {
    let ws = Workspace::new();
    let input = ws.write("pedido.txt", ORDER);

    ws.cmd()
        .env("MATCHER_THRESHOLD", "high")
        .args(["process", "--catalog"])
        .arg(ws.catalog())
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("MATCHER_THRESHOLD"));
}

#[test]
fn process_fails_on_unreadable_catalog() {
    let ws = Workspace::new();
    let input = ws.write("pedido.txt", ORDER);
    let bad = ws.write("bad.csv", "nome;valor\nfoo;bar\n");

    ws.cmd()
        .args(["process", "--catalog"])
        .arg(&bad)
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no procedure parsed"));
}

#[test]
fn process_writes_job_log() {
    let ws = Workspace::new();
    let input = ws.write("pedido.txt", ORDER);
    let logs = ws.path("logs");

    ws.cmd()
        .args(["process", "--catalog"])
        .arg(ws.catalog())
        .arg("--log-dir")
        .arg(&logs)
        .arg(&input)
        .assert()
        .success();

    let files = log_files(&logs);
    assert_eq!(files.len(), 1);

    let log = parse_json(&fs::read(&files[0]).unwrap());
    assert_eq!(log["filename"], "pedido.txt");
    assert_eq!(log["ocr_text"], ORDER);
    assert_eq!(log["codes"], serde_json::json!(["40301630", "40302040"]));
    assert!(log["decision_trace"].as_array().is_some_and(|t| !t.is_empty()));
}

#[test]
fn batch_writes_outputs_and_summary() {
    let ws = Workspace::new();
    ws.write("in/a.txt", ORDER);
    ws.write("in/b.txt", "TSH - HORMONIO TIREOESTIMULANTE\n");
    let out = ws.path("out");
    let pattern = format!("{}/in/*.txt", ws.dir.path().display());

    ws.cmd()
        .args(["batch", &pattern, "--summary", "-j", "2", "--catalog"])
        .arg(ws.catalog())
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 successful"));

    let a = parse_json(&fs::read(out.join("a.json")).unwrap());
    assert_eq!(a["codes"], serde_json::json!(["40301630", "40302040"]));
    let b = parse_json(&fs::read(out.join("b.json")).unwrap());
    assert_eq!(b["codes"], serde_json::json!(["40316521"]));

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    assert!(summary.starts_with("filename,status,codes,code_count,processing_time_ms,error"));
    assert!(summary.contains("a.txt,success,40301630 40302040,2,"));
}

#[test]
fn batch_without_matches_fails() {
    let ws = Workspace::new();
    let pattern = format!("{}/missing/*.txt", ws.dir.path().display());

    ws.cmd()
        .args(["batch", &pattern, "--catalog"])
        .arg(ws.catalog())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn catalog_lookup_and_show() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["catalog", "lookup", "40316521", "--catalog"])
        .arg(ws.catalog())
        .assert()
        .success()
        .stdout(predicate::str::contains("TSH - HORMONIO TIREOESTIMULANTE"));

    ws.cmd()
        .args(["catalog", "lookup", "99999999", "--catalog"])
        .arg(ws.catalog())
        .assert()
        .failure();

    ws.cmd()
        .args(["catalog", "show", "--limit", "1", "--catalog"])
        .arg(ws.catalog())
        .assert()
        .success()
        .stdout(predicate::str::contains("Entries:      3"))
        .stdout(predicate::str::contains("... 2 more"));
}

#[test]
fn catalog_query_explains_decision() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["catalog", "query", "hemograma completo", "--catalog"])
        .arg(ws.catalog())
        .assert()
        .success()
        .stdout(predicate::str::contains("40301630"))
        .stdout(predicate::str::contains("reason:"));
}

#[test]
fn config_set_then_get() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["config", "set", "matching.threshold", "0.75"])
        .assert()
        .success();

    ws.cmd()
        .args(["config", "get", "matching.threshold"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0.75"));

    ws.cmd()
        .args(["config", "set", "matching.unknown", "1"])
        .assert()
        .failure();
}
