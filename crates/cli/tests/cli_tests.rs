//! CLI integration tests
use predicates::prelude::*;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::cargo_bin("lens").unwrap()
}

fn fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

#[test]
fn test_cli_file_input() {
    cmd().arg(fixture_path("article.html")).assert().success();
}

#[test]
fn test_cli_stdin_input() {
    let html = std::fs::read_to_string(fixture_path("article.html")).unwrap();
    cmd().arg("-").write_stdin(html).assert().success();
}

#[test]
fn test_cli_html_format() {
    cmd()
        .args(["-f", "html", &fixture_path("article.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains("lens-page-1"))
        .stdout(predicate::str::contains("Fermentation"));
}

#[test]
fn test_cli_text_format() {
    cmd()
        .args(["-f", "text", &fixture_path("article.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains("patience and appetite"))
        .stdout(predicate::str::contains("<p>").not());
}

#[test]
fn test_cli_json_format() {
    let output = cmd()
        .args(["-f", "json", &fixture_path("article.html")])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["title"], "The Slow Art of Fermentation");
    assert!(json["word_count"].as_u64().unwrap() > 100);
}

#[test]
fn test_cli_invalid_format() {
    cmd()
        .args(["-f", "yaml", &fixture_path("article.html")])
        .assert()
        .failure();
}

#[test]
fn test_cli_no_footnotes_flag() {
    cmd()
        .args(["--no-footnotes", &fixture_path("article.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains("lens-footnotes").not());
}

#[test]
fn test_cli_short_page_fails() {
    cmd()
        .arg(fixture_path("short.html"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("No article content"));
}

#[test]
fn test_cli_missing_file() {
    cmd().arg("definitely-not-here.html").assert().failure();
}

#[test]
fn test_cli_output_file() {
    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("article.html");

    cmd()
        .args(["-o", output.to_str().unwrap()])
        .arg(fixture_path("article.html"))
        .assert()
        .success();

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.contains("lens-page-1"));
}
