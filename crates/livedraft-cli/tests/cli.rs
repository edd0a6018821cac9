use assert_cmd::Command;
use predicates::str::contains;

fn livedraft() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("livedraft"));
    cmd.env_remove("TELEGRAM_BOT_TOKEN")
        .env_remove("LIVEDRAFT_CHAT_ID")
        .env_remove("LIVEDRAFT_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_help() {
    livedraft()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("LiveDraft"));
}

#[test]
fn test_cli_version() {
    livedraft().arg("--version").assert().success();
}

#[test]
fn test_split_from_stdin() {
    livedraft()
        .arg("split")
        .write_stdin("Hello there. How are you?")
        .assert()
        .success()
        .stdout(contains(r#"1: "Hello there. ""#))
        .stdout(contains(r#"2: "How are you?""#));
}

#[test]
fn test_split_json() {
    livedraft()
        .args(["split", "--format", "json"])
        .write_stdin("One. Two.")
        .assert()
        .success()
        .stdout(contains(r#""pieces""#))
        .stdout(contains(r#""Two.""#));
}

#[test]
fn test_stream_dry_run_prints_transport_calls() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");

    livedraft()
        .args(["stream", "--dry-run", "--interval-ms", "10", "--delay-ms", "0"])
        .arg("--config")
        .arg(&config)
        .write_stdin("First sentence. Second sentence.")
        .assert()
        .success()
        .stdout(contains("[create console#1]"))
        .stdout(contains("[edit console#1] First sentence. Second sentence."))
        .stdout(contains("into 1 message(s)"));
}

#[test]
fn test_stream_without_token_fails_with_suggestion() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");

    livedraft()
        .args(["stream", "--chat-id", "42", "--config"])
        .arg(&config)
        .write_stdin("Hello.")
        .assert()
        .failure()
        .stderr(contains("bot token not found"))
        .stderr(contains("TELEGRAM_BOT_TOKEN"));
}

#[test]
fn test_stream_missing_file_fails() {
    livedraft()
        .args(["stream", "--dry-run", "/nonexistent/livedraft-input.md"])
        .assert()
        .failure()
        .stderr(contains("Failed to read input file"));
}
