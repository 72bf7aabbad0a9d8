use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::{tempdir, TempDir};

const INDIGO_INVOICE: &str = "InterGlobe Aviation Limited\n\
    GSTIN: 06AABCI2726B1ZA\n\
    Invoice No: IN0624ABC1234\n\
    Taxable Value ₹ 10,000.00\n\
    IGST ₹ 500.00\n";

/// A command isolated from the user's config directory.
fn airgst(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("airgst").unwrap();
    cmd.env("XDG_CONFIG_HOME", home.path()).env("HOME", home.path());
    cmd
}

fn write(dir: &Path, name: &str, content: &[u8]) -> String {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
fn test_process_text_invoice_as_json() {
    let home = tempdir().unwrap();
    let input = write(home.path(), "invoice.txt", INDIGO_INVOICE.as_bytes());

    airgst(&home)
        .args(["process", &input])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""Airline": "INDIGO""#))
        .stdout(predicate::str::contains(r#""IGST": "500.00""#))
        .stdout(predicate::str::contains(r#""CGST": "0""#))
        .stdout(predicate::str::contains(r#""Total(Incl Taxes)": "10500.00""#));
}

#[test]
fn test_process_csv_to_file() {
    let home = tempdir().unwrap();
    let input = write(home.path(), "invoice.txt", INDIGO_INVOICE.as_bytes());
    let output = home.path().join("out.csv");

    airgst(&home)
        .args(["process", &input, "--format", "csv", "--output"])
        .arg(&output)
        .assert()
        .success();

    let csv = fs::read_to_string(&output).unwrap();
    let mut lines = csv.lines();
    assert!(lines.next().unwrap().starts_with("Airline,GSTIN,GSTIN of Customer,Number"));
    assert!(lines.next().unwrap().starts_with("INDIGO,06AABCI2726B1ZA,,IN0624ABC1234"));
}

#[test]
fn test_process_with_fixed_airline() {
    let home = tempdir().unwrap();
    let input = write(home.path(), "invoice.txt", INDIGO_INVOICE.as_bytes());

    airgst(&home)
        .args(["process", &input, "--airline", "kuwait"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""Airline": "KUWAIT AIRWAYS""#));
}

#[test]
fn test_process_rejects_unknown_airline() {
    let home = tempdir().unwrap();
    let input = write(home.path(), "invoice.txt", INDIGO_INVOICE.as_bytes());

    airgst(&home)
        .args(["process", &input, "--airline", "zeppelin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format"));
}

#[test]
fn test_process_missing_file() {
    let home = tempdir().unwrap();

    airgst(&home)
        .args(["process", "does-not-exist.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_process_unreadable_pdf() {
    let home = tempdir().unwrap();
    let input = write(home.path(), "broken.pdf", b"not a pdf");

    airgst(&home)
        .args(["process", &input])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unreadable document"));
}

#[test]
fn test_batch_isolates_failures() {
    let home = tempdir().unwrap();
    let inputs = home.path().join("in");
    fs::create_dir(&inputs).unwrap();
    write(&inputs, "a.txt", INDIGO_INVOICE.as_bytes());
    write(&inputs, "b.pdf", b"not a pdf");
    write(&inputs, "c.txt", b"Qatar Airways\nPNR: QWE123\n");
    write(&inputs, "notes.md", b"ignored");
    let out = home.path().join("out");
    let pattern = format!("{}/*", inputs.display());

    airgst(&home)
        .args(["batch", &pattern, "--jobs", "2", "--output-dir"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 3 files"))
        .stdout(predicate::str::contains("2 successful, 1 failed"))
        .stdout(predicate::str::contains("b.pdf"));

    assert!(out.join("a.json").exists());
    assert!(out.join("c.json").exists());
    assert!(!out.join("b.json").exists());

    let mut reader = csv::Reader::from_path(out.join("summary.csv")).unwrap();
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    let summary: Vec<(&str, &str)> = rows.iter().map(|r| (&r[0], &r[1])).collect();
    assert_eq!(
        summary,
        vec![("a.txt", "INDIGO"), ("b.pdf", "ERROR"), ("c.txt", "QATAR AIRWAYS")]
    );
}

#[test]
fn test_batch_without_matches() {
    let home = tempdir().unwrap();
    let pattern = format!("{}/*.pdf", home.path().display());

    airgst(&home)
        .args(["batch", &pattern])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn test_classify() {
    let home = tempdir().unwrap();
    let qatar = write(home.path(), "qatar.txt", b"Qatar Airways Q.C.S.C\nTax Invoice");
    let unknown = write(home.path(), "plain.txt", b"Tax Invoice");

    airgst(&home)
        .args(["classify", &qatar, &unknown])
        .assert()
        .success()
        .stdout(predicate::str::contains("qatar\tQATAR AIRWAYS"))
        .stdout(predicate::str::contains("indigo\tINDIGO"));
}

#[test]
fn test_config_init_get_set() {
    let home = tempdir().unwrap();
    let config = home.path().join("airgst.json");
    let config = config.to_str().unwrap();

    airgst(&home)
        .args(["--config", config, "config", "init"])
        .assert()
        .success();

    airgst(&home)
        .args(["--config", config, "config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    airgst(&home)
        .args(["--config", config, "config", "get", "extraction.table_lookahead_rows"])
        .assert()
        .success()
        .stdout("10\n");

    airgst(&home)
        .args(["--config", config, "config", "set", "extraction.default_currency", "USD"])
        .assert()
        .success();

    airgst(&home)
        .args(["--config", config, "config", "get", "extraction.default_currency"])
        .assert()
        .success()
        .stdout("USD\n");

    airgst(&home)
        .args(["--config", config, "config", "set", "extraction.no_such_key", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("key not found"));

    airgst(&home)
        .args(["--config", config, "config", "set", "batch.jobs", "many"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid value"));
}

#[test]
fn test_malformed_config_is_rejected() {
    let home = tempdir().unwrap();
    let config = write(home.path(), "airgst.json", b"{ not json");
    let input = write(home.path(), "invoice.txt", INDIGO_INVOICE.as_bytes());

    airgst(&home)
        .args(["--config", &config, "process", &input])
        .assert()
        .failure();
}

#[test]
fn test_help_describes_invoice_extraction() {
    let home = tempdir().unwrap();

    airgst(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("GSTIN"))
        .stdout(predicate::str::contains("RUST_LOG"));
}

#[test]
fn test_verbose_logs_reach_stderr_only() {
    let home = tempdir().unwrap();
    let input = write(home.path(), "invoice.txt", INDIGO_INVOICE.as_bytes());

    airgst(&home)
        .env_remove("RUST_LOG")
        .args(["-v", "process", &input])
        .assert()
        .success()
        .stdout(predicate::str::contains("Processing file").not())
        .stderr(predicate::str::contains("Processing file"));

    airgst(&home)
        .env_remove("RUST_LOG")
        .args(["process", &input])
        .assert()
        .success()
        .stderr(predicate::str::contains("Processing file").not());
}
