use assert_cmd::Command;
use lexdown::test_utils::{DocumentFixture, ImportFixture};
use predicates::prelude::*;
use tempfile::TempDir;

fn lexdown() -> Command {
    let mut cmd = Command::cargo_bin("lexdown").unwrap();
    cmd.env_remove("RUST_LOG").env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_render_to_stdout() {
    let temp = TempDir::new().unwrap();
    let path = DocumentFixture::services_agreement("msa").write_to(temp.path()).unwrap();

    lexdown()
        .arg("render")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Article 1. Definitions"))
        .stdout(predicate::str::contains("between Acme Ltd and Example Services LLP"))
        .stdout(predicate::str::contains("The fee is £1,500.00"))
        .stdout(predicate::str::contains("client:").not());
}

#[test]
fn test_render_with_imports_and_output_file() {
    let temp = TempDir::new().unwrap();
    let doc = DocumentFixture::simple("contract", "---\nclient: Acme\n---\n{{client}} hires {{provider}}.\n")
        .write_to(temp.path())
        .unwrap();
    let import = ImportFixture::hostile("parties").write_to(temp.path()).unwrap();
    let out = temp.path().join("out/contract.md");

    lexdown()
        .arg("render")
        .arg(&doc)
        .arg("--import")
        .arg(&import)
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let rendered = std::fs::read_to_string(&out).unwrap();
    assert_eq!(rendered.trim(), "Acme hires Imported Provider.");
}

#[test]
fn test_render_earlier_import_wins() {
    let temp = TempDir::new().unwrap();
    let doc = DocumentFixture::simple("term", "Term: {{term}} months, renewal {{renewal}}").write_to(temp.path()).unwrap();
    let first = ImportFixture::yaml("first", "term: 12\n").write_to(temp.path()).unwrap();
    let second = ImportFixture::yaml("second", "term: 24\nrenewal: automatic\n").write_to(temp.path()).unwrap();

    lexdown()
        .arg("render")
        .arg(&doc)
        .arg("-i")
        .arg(&first)
        .arg("-i")
        .arg(&second)
        .assert()
        .success()
        .stdout(predicate::str::contains("Term: 12 months, renewal automatic"));
}

#[test]
fn test_render_report_goes_to_stderr() {
    let temp = TempDir::new().unwrap();
    let path = DocumentFixture::unfilled("draft").write_to(temp.path()).unwrap();

    lexdown()
        .args(["render", "--report", "json"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Between {{client.name}} and {{provider}}."))
        .stderr(predicate::str::contains("\"originalValue\": \"{{provider}}\""));
}

#[test]
fn test_render_highlight_flag() {
    let temp = TempDir::new().unwrap();
    let path = DocumentFixture::simple("h", "---\nname: Acme\n---\n{{name}}").write_to(temp.path()).unwrap();

    lexdown()
        .arg("render")
        .arg(&path)
        .arg("--highlight")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"<span class="legal-field imported-value" data-field="name">Acme</span>"#,
        ));
}

#[test]
fn test_render_strict_fails_on_malformed_metadata() {
    let temp = TempDir::new().unwrap();
    let path = DocumentFixture::malformed("bad").write_to(temp.path()).unwrap();

    lexdown().arg("render").arg(&path).assert().success().stdout(predicate::str::contains("Hello {{client}}"));

    lexdown()
        .arg("render")
        .arg(&path)
        .arg("--strict")
        .assert()
        .failure()
        .stderr(predicate::str::contains("metadata"));
}

#[test]
fn test_render_missing_file_fails() {
    lexdown()
        .args(["render", "/nonexistent/contract.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read document"));
}

#[test]
fn test_config_file_sets_templates() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("lexdown.toml");
    std::fs::write(&config, "level-one = \"Clause %n:\"\nno-indent = true\n").unwrap();
    let path = DocumentFixture::simple("c", "l. One\nll. Two\n").write_to(temp.path()).unwrap();

    lexdown()
        .arg("--config")
        .arg(&config)
        .arg("render")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Clause 1: One\nSection 1. Two"));
}

#[test]
fn test_invalid_config_file_fails() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("lexdown.toml");
    std::fs::write(&config, "level-indent = -4\n").unwrap();
    let path = DocumentFixture::simple("c", "l. One\n").write_to(temp.path()).unwrap();

    lexdown()
        .arg("--config")
        .arg(&config)
        .arg("render")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("level-indent"));
}

#[test]
fn test_report_text_and_quality_gate() {
    let temp = TempDir::new().unwrap();
    let path = DocumentFixture::simple("r", "---\nclient: Acme\n---\n{{client}} {{fee}}").write_to(temp.path()).unwrap();

    lexdown()
        .arg("report")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Fields: 2 total, 1 filled, 1 empty, 0 logic (50% complete)"))
        .stdout(predicate::str::contains("{{fee}}"));

    lexdown()
        .arg("report")
        .arg(&path)
        .arg("--fail-on-missing")
        .assert()
        .failure()
        .stderr(predicate::str::contains("fee"));
}

#[test]
fn test_report_json() {
    let temp = TempDir::new().unwrap();
    let path = DocumentFixture::services_agreement("msa").write_to(temp.path()).unwrap();

    let output = lexdown().arg("report").arg(&path).args(["--format", "json"]).output().unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["empty"], 0);
    assert!(report["total"].as_u64().unwrap() > 5);
}

#[test]
fn test_batch_renders_directory_tree() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("docs");
    let out = temp.path().join("rendered");
    DocumentFixture::services_agreement("msa").write_to(&src).unwrap();
    DocumentFixture::simple("nested/nda", "l. Confidentiality\n").write_to(&src).unwrap();
    std::fs::write(src.join("notes.txt"), "l. not a document").unwrap();

    lexdown()
        .arg("batch")
        .arg(&src)
        .arg("--out")
        .arg(&out)
        .args(["--max-parallel", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed 2 document(s)"));

    let nda = std::fs::read_to_string(out.join("nested/nda.md")).unwrap();
    assert_eq!(nda.trim(), "Article 1. Confidentiality");
    assert!(out.join("msa.md").exists());
    assert!(!out.join("notes.txt").exists());
}

#[test]
fn test_batch_rejects_zero_parallelism() {
    let temp = TempDir::new().unwrap();
    lexdown()
        .arg("batch")
        .arg(temp.path())
        .arg("--out")
        .arg(temp.path().join("out"))
        .args(["--max-parallel", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--max-parallel"));
}

#[test]
fn test_batch_reports_failed_documents() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("docs");
    DocumentFixture::malformed("bad").write_to(&src).unwrap();
    DocumentFixture::unfilled("good").write_to(&src).unwrap();

    lexdown()
        .arg("batch")
        .arg(&src)
        .arg("--out")
        .arg(temp.path().join("out"))
        .arg("--strict")
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 of 2 documents failed"));

    assert!(temp.path().join("out/good.md").exists());
}
