use std::collections::BTreeMap;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::Path;
use std::process::{Command, Output};
use std::thread;
use tempfile::tempdir;

fn run_with_env(home: &Path, args: &[&str], envs: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_taulen-wizard"));
    cmd.args(args)
        .env("HOME", home)
        .env_remove("TAULEN_CONFIG")
        .env_remove("TAULEN_API_BASE")
        .env_remove("TAULEN_API_TOKEN");
    for (key, value) in envs {
        cmd.env(key, value);
    }
    cmd.output().expect("run taulen-wizard")
}

fn run(home: &Path, args: &[&str]) -> Output {
    run_with_env(home, args, &[])
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn assert_ok(output: &Output) {
    assert!(
        output.status.success(),
        "stdout:\n{}\nstderr:\n{}",
        stdout(output),
        stderr(output)
    );
}

fn assert_err_contains(output: &Output, needle: &str) {
    assert!(
        !output.status.success(),
        "expected failure, stdout:\n{}\nstderr:\n{}",
        stdout(output),
        stderr(output)
    );
    let text = format!("{}{}", stdout(output), stderr(output));
    assert!(
        text.contains(needle),
        "expected error to contain `{needle}`, got:\n{text}"
    );
}

fn kv_lines(output: &Output) -> BTreeMap<String, String> {
    stdout(output)
        .lines()
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn spawn_application_server(status_line: &str, response_body: String) -> String {
    spawn_server("GET /api/v1/urla/applications/42 ", status_line, response_body)
}

fn spawn_server(expected_request: &str, status_line: &str, response_body: String) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server");
    let addr = listener.local_addr().expect("local addr");
    let expected_request = expected_request.to_string();
    let status_line = status_line.to_string();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

        let mut request_line = String::new();
        reader
            .read_line(&mut request_line)
            .expect("read request line");
        assert!(
            request_line.starts_with(&expected_request),
            "unexpected request line: {request_line}"
        );

        loop {
            let mut line = String::new();
            reader.read_line(&mut line).expect("read header line");
            if line == "\r\n" || line.is_empty() {
                break;
            }
        }

        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            response_body.len(),
            response_body
        );
        stream
            .write_all(response.as_bytes())
            .expect("write response");
    });

    format!("http://{}/api/v1", addr)
}

#[test]
fn no_arguments_prints_help() {
    let temp = tempdir().expect("tempdir");
    let output = run(temp.path(), &[]);
    assert_ok(&output);
    assert!(stdout(&output).contains("resolve <snapshot.json>"));
    assert!(stdout(&output).contains("state show"));
}

#[test]
fn unknown_command_fails() {
    let temp = tempdir().expect("tempdir");
    assert_err_contains(&run(temp.path(), &["launch"]), "unknown command `launch`");
}

#[test]
fn resolve_prints_step_route_and_rule() {
    let temp = tempdir().expect("tempdir");
    let snapshot = temp.path().join("snapshot.json");
    fs::write(
        &snapshot,
        r#"{"id":"42","loanPurpose":"Purchase","borrower":{"firstName":"A","lastName":"B","email":"a@b.com"}}"#,
    )
    .expect("write snapshot");

    let output = run(temp.path(), &["resolve", snapshot.to_str().expect("utf8 path")]);
    assert_ok(&output);
    let lines = kv_lines(&output);
    assert_eq!(lines["step"], "borrower-info-2");
    assert_eq!(lines["route"], "/buy/borrower-info-2?applicationId=42");
    assert_eq!(lines["rule"], "extended_identity_incomplete");
}

#[test]
fn state_commands_persist_between_runs_in_the_default_session_file() {
    let temp = tempdir().expect("tempdir");
    let home = temp.path();

    assert_ok(&run(home, &["state", "set", "deal-id", "42"]));
    assert_ok(&run(home, &["state", "set", "form-step", "Assets"]));
    assert_ok(&run(home, &["state", "set", "loan-purpose", "PURCHASE"]));
    assert_ok(&run(
        home,
        &["state", "progress", "deal", "getting-started", "true"],
    ));

    let output = run(home, &["state", "show"]);
    assert_ok(&output);
    let lines = kv_lines(&output);
    assert_eq!(lines["applicationId"], "42");
    assert_eq!(lines["currentFormStep"], "assets");
    assert_eq!(lines["loanPurpose"], "Purchase");
    assert_eq!(lines["dealProgress"], r#"{"getting-started":true}"#);
    assert_eq!(lines["borrowerId"], "none");
    assert!(home.join(".taulen/session.json").exists());

    let output = run(home, &["state", "clear"]);
    assert_ok(&output);
    assert_eq!(kv_lines(&output)["applicationId"], "none");
}

#[test]
fn state_set_rejects_unknown_fields_and_steps() {
    let temp = tempdir().expect("tempdir");
    assert_err_contains(
        &run(temp.path(), &["state", "set", "nickname", "x"]),
        "unknown state field `nickname`",
    );
    assert_err_contains(
        &run(temp.path(), &["state", "set", "form-step", "employment"]),
        "unknown form step `employment`",
    );
}

#[test]
fn state_sync_copies_identifiers_from_a_payload() {
    let temp = tempdir().expect("tempdir");
    let payload = temp.path().join("payload.json");
    fs::write(&payload, r#"{"id":42,"borrower":{"id":501}}"#).expect("write payload");

    let output = run(
        temp.path(),
        &["state", "sync", payload.to_str().expect("utf8 path")],
    );
    assert_ok(&output);
    let lines = kv_lines(&output);
    assert_eq!(lines["applicationId"], "42");
    assert_eq!(lines["borrowerId"], "501");
}

#[test]
fn sections_outline_marks_earlier_sections_completed() {
    let temp = tempdir().expect("tempdir");
    let output = run(temp.path(), &["sections", "loan"]);
    assert_ok(&output);
    let text = stdout(&output);
    let first = text.lines().next().expect("first section");
    assert!(first.starts_with("completed"), "{text}");
    assert!(text.contains("getting-to-know-you"));
}

#[test]
fn resume_without_application_reports_it() {
    let temp = tempdir().expect("tempdir");
    let output = run(temp.path(), &["resume"]);
    assert_ok(&output);
    assert!(stdout(&output).contains("no active application"));
}

#[test]
fn resume_fetches_application_and_stores_resolved_step() {
    let temp = tempdir().expect("tempdir");
    let base = spawn_application_server(
        "200 OK",
        r#"{"id":42,"loanPurpose":"refinance","borrower":{"id":7,"firstName":"A","lastName":"B","email":"a@b.com","maritalStatus":"single","currentAddress":"X"},"hasCoBorrower":false,"currentFormStep":"review"}"#.to_string(),
    );

    let output = run_with_env(
        temp.path(),
        &["resume", "42"],
        &[("TAULEN_API_BASE", base.as_str())],
    );
    assert_ok(&output);
    let lines = kv_lines(&output);
    assert_eq!(lines["step"], "review");
    assert_eq!(lines["route"], "/refinance/review?applicationId=42");

    let output = run(temp.path(), &["state", "show"]);
    let lines = kv_lines(&output);
    assert_eq!(lines["applicationId"], "42");
    assert_eq!(lines["borrowerId"], "7");
    assert_eq!(lines["currentFormStep"], "review");
}

#[test]
fn resume_failure_clears_a_stale_stored_id() {
    let temp = tempdir().expect("tempdir");
    assert_ok(&run(temp.path(), &["state", "set", "deal-id", "42"]));
    let base = spawn_application_server("404 Not Found", r#"{"error":"not found"}"#.to_string());

    let output = run_with_env(
        temp.path(),
        &["resume"],
        &[("TAULEN_API_BASE", base.as_str())],
    );
    assert_err_contains(&output, "failed to load application 42");
    assert_err_contains(&output, "stored application id cleared");

    let lines = kv_lines(&run(temp.path(), &["state", "show"]));
    assert_eq!(lines["applicationId"], "none");
}

#[test]
fn state_sync_progress_without_a_file_fetches_from_the_api() {
    let temp = tempdir().expect("tempdir");
    assert_ok(&run(temp.path(), &["state", "set", "deal-id", "42"]));
    let base = spawn_server(
        "GET /api/v1/urla/applications/42/progress ",
        "200 OK",
        r#"{"sections":{"getting-started":true,"assets":false}}"#.to_string(),
    );

    let output = run_with_env(
        temp.path(),
        &["state", "sync-progress"],
        &[("TAULEN_API_BASE", base.as_str())],
    );
    assert_ok(&output);
    assert_eq!(
        kv_lines(&output)["dealProgress"],
        r#"{"assets":false,"getting-started":true}"#
    );
}

#[test]
fn state_sync_progress_without_an_application_fails() {
    let temp = tempdir().expect("tempdir");
    assert_err_contains(
        &run(temp.path(), &["state", "sync-progress"]),
        "no active application",
    );
}

#[test]
fn state_complete_without_an_application_stays_local() {
    let temp = tempdir().expect("tempdir");
    let output = run(temp.path(), &["state", "complete", "assets", "true"]);
    assert_ok(&output);
    let lines = kv_lines(&output);
    assert_eq!(lines["dealProgress"], r#"{"assets":true}"#);
    assert_eq!(lines["remote"], "skipped");
}

#[test]
fn config_path_override_selects_memory_backend() {
    let temp = tempdir().expect("tempdir");
    let config = temp.path().join("wizard.yaml");
    fs::write(&config, "storage:\n  backend: memory\n").expect("write config");
    let config = config.to_str().expect("utf8 path");

    assert_ok(&run_with_env(
        temp.path(),
        &["state", "set", "deal-id", "42"],
        &[("TAULEN_CONFIG", config)],
    ));
    let output = run_with_env(temp.path(), &["state", "show"], &[("TAULEN_CONFIG", config)]);
    assert_ok(&output);
    assert_eq!(kv_lines(&output)["applicationId"], "none");
    assert!(!temp.path().join(".taulen/session.json").exists());
}
