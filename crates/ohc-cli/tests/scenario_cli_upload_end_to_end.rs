//! `ohc upload` against a mock OnlineHashCrack endpoint.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use httpmock::prelude::*;
use predicates::prelude::*;
use serde_json::json;

const KEY: &str = "test-key-value";

fn write_config(dir: &Path, server: &MockServer, extra: &str) -> String {
    let p = dir.join("ohc.yaml");
    fs::write(
        &p,
        format!("api:\n  base_url: {}\n{}", server.url("/v2"), extra),
    )
    .unwrap();
    p.to_string_lossy().into_owned()
}

fn ohc(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ohc").unwrap();
    cmd.current_dir(dir).env("OHC_API_KEY", KEY).env("RUST_LOG", "warn");
    cmd
}

#[test]
fn empty_input_dir_makes_no_request() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start();
    let any = server.mock(|when, then| {
        when.method(POST);
        then.status(200).json_body(json!({"success": true}));
    });
    let cfg = write_config(dir.path(), &server, "");

    ohc(dir.path())
        .args(["upload", "--config", &cfg])
        .assert()
        .success()
        .stdout(predicate::str::contains("outcome=NO_LOCAL_RECORDS"));
    any.assert_hits(0);
}

#[test]
fn missing_records_are_submitted_once_in_order() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.hc22000"), "# capture 1\nh_a\nh_b\nh_a\n").unwrap();
    fs::write(dir.path().join("b.hc22000"), "h_c\r\n\r\nh_d\r\n").unwrap();

    let server = MockServer::start();
    let list = server.mock(|when, then| {
        when.method(POST)
            .path("/v2")
            .json_body_partial(r#"{"action": "list_tasks", "agree_terms": "yes"}"#);
        then.status(200).json_body(json!({
            "success": true,
            "tasks": [{"hash": "h_b"}, {"hash": "h_d"}]
        }));
    });
    let upload = server.mock(|when, then| {
        when.method(POST).path("/v2").json_body(json!({
            "api_key": KEY,
            "agree_terms": "yes",
            "algo_mode": 22000,
            "hashes": ["h_a", "h_c"]
        }));
        then.status(200)
            .json_body(json!({"success": true, "message": "2 tasks created"}));
    });
    let cfg = write_config(dir.path(), &server, "");

    ohc(dir.path())
        .args(["upload", "--config", &cfg])
        .assert()
        .success()
        .stdout(predicate::str::contains("local_total=4"))
        .stdout(predicate::str::contains("already_remote=2"))
        .stdout(predicate::str::contains("outcome=SUBMIT"))
        .stdout(predicate::str::contains("submit_accepted=true"))
        .stdout(predicate::str::contains(KEY).not());

    list.assert_hits(1);
    upload.assert_hits(1);
}

#[test]
fn over_capacity_writes_overflow_file_and_exits_1() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.hc22000"), "h1\nh2\nh3\n").unwrap();

    let server = MockServer::start();
    let list = server.mock(|when, then| {
        when.method(POST).json_body_partial(r#"{"action": "list_tasks"}"#);
        then.status(200).json_body(json!({"success": true, "tasks": []}));
    });
    let upload = server.mock(|when, then| {
        when.method(POST).json_body_partial(r#"{"algo_mode": 22000}"#);
        then.status(200).json_body(json!({"success": true}));
    });
    let cfg = write_config(
        dir.path(),
        &server,
        "submit:\n  capacity: 2\noverflow:\n  path: out/overflow.txt\n",
    );

    ohc(dir.path())
        .args(["upload", "--config", &cfg])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("outcome=OVERFLOW"))
        .stdout(predicate::str::contains("overflow_count=3"));

    list.assert_hits(1);
    upload.assert_hits(0);

    let text = fs::read_to_string(dir.path().join("out/overflow.txt")).unwrap();
    let records: Vec<&str> = text.lines().filter(|l| !l.starts_with('#')).collect();
    assert_eq!(records, vec!["h1", "h2", "h3"]);
}

#[test]
fn rejected_upload_exits_3_without_retry() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.hc22000"), "h1\n").unwrap();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).json_body_partial(r#"{"action": "list_tasks"}"#);
        then.status(200).json_body(json!({"success": true, "tasks": []}));
    });
    let upload = server.mock(|when, then| {
        when.method(POST).json_body_partial(r#"{"algo_mode": 22000}"#);
        then.status(429)
            .json_body(json!({"success": false, "message": "Rate limit exceeded"}));
    });
    let cfg = write_config(dir.path(), &server, "");

    ohc(dir.path())
        .args(["upload", "--config", &cfg])
        .assert()
        .code(3)
        .stdout(predicate::str::contains("submit_http_status=429"))
        .stdout(predicate::str::contains("submit_error=Rate limit exceeded"));
    upload.assert_hits(1);
}

#[test]
fn rejected_task_list_exits_3_and_never_uploads() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.hc22000"), "h1\n").unwrap();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).json_body_partial(r#"{"action": "list_tasks"}"#);
        then.status(401)
            .json_body(json!({"success": false, "message": "Invalid API key"}));
    });
    let upload = server.mock(|when, then| {
        when.method(POST).json_body_partial(r#"{"algo_mode": 22000}"#);
        then.status(200).json_body(json!({"success": true}));
    });
    let cfg = write_config(dir.path(), &server, "");

    ohc(dir.path())
        .args(["upload", "--config", &cfg])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Invalid API key"));
    upload.assert_hits(0);
}

#[test]
fn unreachable_service_exits_4() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.hc22000"), "h1\n").unwrap();
    let cfg = dir.path().join("ohc.yaml");
    fs::write(&cfg, "api:\n  base_url: http://127.0.0.1:9/v2\n  list_timeout_secs: 5\n").unwrap();

    ohc(dir.path())
        .args(["upload", "--config", cfg.to_str().unwrap()])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("list_tasks request failed"));
}

#[test]
fn missing_explicit_file_exits_5() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start();
    let cfg = write_config(dir.path(), &server, "");

    ohc(dir.path())
        .args(["upload", "--config", &cfg, "does-not-exist.hc22000"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("input source not found"));
}

#[test]
fn report_dir_gets_one_report_per_run() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.hc22000"), "h1\n").unwrap();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).json_body_partial(r#"{"action": "list_tasks"}"#);
        then.status(200)
            .json_body(json!({"success": true, "tasks": [{"hash": "h1"}]}));
    });
    let cfg = write_config(dir.path(), &server, "");
    let reports = dir.path().join("reports");

    ohc(dir.path())
        .args(["upload", "--config", &cfg, "--report-dir", reports.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("outcome=EMPTY"));

    let runs: Vec<_> = fs::read_dir(&reports).unwrap().collect();
    assert_eq!(runs.len(), 1);
    let run_dir = runs.into_iter().next().unwrap().unwrap().path();
    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(run_dir.join("report.json")).unwrap()).unwrap();
    assert_eq!(report["outcome"], "EMPTY");
    assert_eq!(report["local_total"], 1);
    assert_eq!(report["already_remote"], 1);
}

#[test]
fn unwritable_report_dir_keeps_the_submit_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.hc22000"), "h_new\n").unwrap();
    let blocker = dir.path().join("reports");
    fs::write(&blocker, "not a directory").unwrap();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).json_body_partial(r#"{"action": "list_tasks"}"#);
        then.status(200).json_body(json!({"success": true, "tasks": []}));
    });
    let upload = server.mock(|when, then| {
        when.method(POST).json_body_partial(r#"{"hashes": ["h_new"]}"#);
        then.status(200)
            .json_body(json!({"success": true, "message": "1 task created"}));
    });
    let cfg = write_config(dir.path(), &server, "");

    ohc(dir.path())
        .args(["upload", "--config", &cfg, "--report-dir", blocker.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("outcome=SUBMIT"))
        .stdout(predicate::str::contains("submit_accepted=true"))
        .stdout(predicate::str::contains("report_path=").not())
        .stderr(predicate::str::contains("run report not written"));

    upload.assert_hits(1);
}
