use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn docqa(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("docqa").unwrap();
    cmd.current_dir(workdir)
        .env("APP_EMBEDDING__PROVIDER", "hash")
        .env("APP_CHUNKING__CHUNK_SIZE", "45")
        .env("APP_CHUNKING__CHUNK_OVERLAP", "0")
        .env("RUST_LOG", "warn");
    cmd
}

#[test]
fn query_without_snapshot_fails() {
    let dir = tempfile::tempdir().unwrap();
    docqa(dir.path()).args(["query", "anything"]).assert().failure().stderr(predicate::str::contains("not ready"));
}

#[test]
fn ingest_then_query() {
    let dir = tempfile::tempdir().unwrap();
    let uploads = dir.path().join("uploaded_files");
    fs::create_dir_all(&uploads).unwrap();
    fs::write(uploads.join("hr.txt"), "vacation policy allows 20 days\n\nsick leave requires a doctor's note").unwrap();

    docqa(dir.path()).arg("ingest").assert().success().stdout(predicate::str::contains("Ingested 2 chunks"));
    assert!(dir.path().join("vectorstore.json").exists());

    docqa(dir.path())
        .args(["query", "how many vacation days", "-k", "1", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("vacation policy allows 20 days").and(predicate::str::contains("sick").not()));

    docqa(dir.path()).args(["status", "--json"]).assert().success().stdout(predicate::str::contains("\"chunk_count\": 2"));
}
