//! Calls against a local server: bodies, queries, multipart and the error list.

mod support;

use std::io::Write;

use courier_client::{Client, Kind, Multipart, Options};
use serde_json::{Value, json};

fn client_for(base: &str) -> Client {
    Client::new(Options::new().base_uri(base))
}

#[tokio::test]
async fn json_body_is_posted_with_content_type() {
    let base = support::spawn_server().await;
    let client = client_for(&base);

    let response = client
        .post("echo", Options::new().json(json!({"key": "value"})))
        .await
        .expect("post");
    assert_eq!(response.status(), 200);

    let echo: Value = response.json().expect("echo json");
    assert_eq!(echo["method"], "POST");
    assert_eq!(echo["path"], "/echo");
    assert_eq!(echo["headers"]["content-type"], "application/json");
    assert_eq!(echo["body"], r#"{"key":"value"}"#);
}

#[tokio::test]
async fn json_wins_over_form_params() {
    let base = support::spawn_server().await;
    let client = client_for(&base);

    let options = Options::new()
        .json(r#"{"raw":true}"#)
        .form_params(vec![("ignored", "1")]);
    let echo: Value = client
        .post("echo", options)
        .await
        .expect("post")
        .json()
        .expect("echo json");
    assert_eq!(echo["body"], r#"{"raw":true}"#);
    assert_eq!(echo["headers"]["content-type"], "application/json");
}

#[tokio::test]
async fn form_params_are_urlencoded() {
    let base = support::spawn_server().await;
    let client = client_for(&base);

    let options = Options::new().form_params(vec![("name", "ann lee"), ("age", "3")]);
    let echo: Value = client
        .post("echo", options)
        .await
        .expect("post")
        .json()
        .expect("echo json");
    assert_eq!(
        echo["headers"]["content-type"],
        "application/x-www-form-urlencoded"
    );
    assert_eq!(echo["body"], "name=ann+lee&age=3");
}

#[tokio::test]
async fn relative_uri_and_query_resolve_against_base() {
    let base = support::spawn_server().await;
    let client = Client::new(Options::new().base_uri(&base).query("from=client"));

    let echo: Value = client
        .get("/echo", Options::new().query(vec![("q", "rust lang")]))
        .await
        .expect("get")
        .json()
        .expect("echo json");
    assert_eq!(echo["path"], "/echo");
    assert_eq!(echo["query"], "q=rust+lang");

    let echo: Value = client
        .get("echo?page=2", Options::new())
        .await
        .expect("get")
        .json()
        .expect("echo json");
    assert_eq!(echo["query"], "page=2&from=client");

    let origin = client.current_uri().expect("current uri");
    assert_eq!(origin.as_str(), base);
}

#[tokio::test]
async fn absolute_uri_needs_no_base() {
    let base = support::spawn_server().await;
    let client = Client::default();

    let response = client
        .get(&format!("{base}echo"), Options::new())
        .await
        .expect("get");
    assert_eq!(response.status(), 200);
    assert_eq!(response.protocol_version(), "1.1");
}

#[tokio::test]
async fn default_headers_and_basic_auth_are_sent() {
    let base = support::spawn_server().await;
    let client = Client::new(
        Options::new()
            .base_uri(&base)
            .header("x-client", "yes")
            .auth("user", "pass"),
    );

    let echo: Value = client
        .get("echo", Options::new().header("x-call", "1"))
        .await
        .expect("get")
        .json()
        .expect("echo json");
    let headers = &echo["headers"];
    assert_eq!(headers["x-client"], "yes");
    assert_eq!(headers["x-call"], "1");
    assert_eq!(headers["authorization"], "Basic dXNlcjpwYXNz");
    assert!(
        headers["user-agent"]
            .as_str()
            .is_some_and(|ua| ua.starts_with("courier/"))
    );
    assert_eq!(headers["accept-encoding"], "gzip, deflate");
}

#[tokio::test]
async fn head_returns_headers_only() {
    let base = support::spawn_server().await;
    let client = client_for(&base);

    let response = client.head("echo", Options::new()).await.expect("head");
    assert_eq!(response.status(), 200);
    assert!(response.bytes().is_empty());
    assert!(response.has_header("content-type"));
}

#[tokio::test]
async fn multipart_sends_files_and_fields() {
    let base = support::spawn_server().await;
    let client = client_for(&base);

    let mut file = tempfile::Builder::new()
        .suffix(".txt")
        .tempfile()
        .expect("temp file");
    file.write_all(b"file contents").expect("write temp file");
    let file_name = file
        .path()
        .file_name()
        .and_then(|name| name.to_str())
        .expect("file name")
        .to_owned();

    let multipart = Multipart::new()
        .file("upload", file.path())
        .field("note", "hello");
    let echo: Value = client
        .post("upload", Options::new().multipart(multipart))
        .await
        .expect("upload")
        .json()
        .expect("upload json");

    assert!(
        echo["content_type"]
            .as_str()
            .is_some_and(|ct| ct.starts_with("multipart/form-data; boundary="))
    );
    let parts = echo["parts"].as_array().expect("parts");
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0]["name"], "upload");
    assert_eq!(parts[0]["file_name"], file_name.as_str());
    assert_eq!(parts[0]["data"], "file contents");
    assert_eq!(parts[1]["name"], "note");
    assert_eq!(parts[1]["file_name"], Value::Null);
    assert_eq!(parts[1]["data"], "hello");
}

#[tokio::test]
async fn multipart_with_only_fields_is_still_multipart() {
    let base = support::spawn_server().await;
    let client = client_for(&base);

    let multipart = Multipart::new().field("a", "1").field("b", "2");
    let echo: Value = client
        .post("upload", Options::new().multipart(multipart))
        .await
        .expect("upload")
        .json()
        .expect("upload json");
    assert!(
        echo["content_type"]
            .as_str()
            .is_some_and(|ct| ct.starts_with("multipart/form-data"))
    );
    assert_eq!(echo["parts"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn missing_multipart_file_is_not_sent() {
    let base = support::spawn_server().await;
    let client = client_for(&base);
    let dir = tempfile::tempdir().expect("temp dir");

    let multipart = Multipart::new().file("upload", dir.path().join("absent.txt"));
    let errors = client
        .post("upload", Options::new().multipart(multipart))
        .await
        .expect_err("missing file");
    assert_eq!(errors.kinds(), vec![Kind::FileOpen]);
    assert_eq!(client.stats().bytes_sent, 0);
}

#[tokio::test]
async fn unreadable_multipart_file_is_not_sent() {
    let base = support::spawn_server().await;
    let client = client_for(&base);
    let dir = tempfile::tempdir().expect("temp dir");

    // opening a directory succeeds, reading it does not
    let multipart = Multipart::new()
        .file("upload", dir.path())
        .field("note", "kept");
    let errors = client
        .post("upload", Options::new().multipart(multipart))
        .await
        .expect_err("unreadable file");
    assert_eq!(errors.kinds(), vec![Kind::FileRead]);
    assert!(errors[0].is_multipart());
    assert_eq!(client.errors().kinds(), vec![Kind::FileRead]);
    assert_eq!(client.stats().bytes_sent, 0);
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread")]
async fn blocking_file_reads_do_not_hold_the_client() {
    use std::time::Duration;

    let base = support::spawn_server().await;
    let client = client_for(&base);
    let dir = tempfile::tempdir().expect("temp dir");
    let fifo = dir.path().join("pipe");
    let status = std::process::Command::new("mkfifo")
        .arg(&fifo)
        .status()
        .expect("mkfifo");
    assert!(status.success());

    let upload = tokio::spawn({
        let client = client.clone();
        let multipart = Multipart::new().file("upload", &fifo);
        async move {
            client
                .post("upload", Options::new().multipart(multipart))
                .await
        }
    });
    tokio::time::sleep(Duration::from_millis(200)).await;

    // the upload is stuck opening the pipe; the client must stay usable
    let observer = client.clone();
    let errors = tokio::time::timeout(
        Duration::from_secs(2),
        tokio::task::spawn_blocking(move || observer.errors()),
    )
    .await
    .expect("errors() returned while a file read was pending")
    .expect("join");
    assert!(errors.is_empty());

    tokio::task::spawn_blocking(move || {
        let mut writer = std::fs::OpenOptions::new()
            .write(true)
            .open(&fifo)
            .expect("open pipe");
        writer.write_all(b"data").expect("write pipe");
    })
    .await
    .expect("join");

    let echo: Value = upload
        .await
        .expect("join")
        .expect("upload")
        .json()
        .expect("upload json");
    assert_eq!(echo["parts"][0]["data"], "data");
}

#[tokio::test]
async fn relative_uri_without_base_fails() {
    let client = Client::default();

    let errors = client
        .get("echo", Options::new())
        .await
        .expect_err("no base uri");
    assert_eq!(errors.kinds(), vec![Kind::EmptyBaseUri]);
    assert_eq!(client.errors().kinds(), vec![Kind::EmptyBaseUri]);
}

#[tokio::test]
async fn reset_error_controls_accumulation() {
    let base = support::spawn_server().await;
    let client = Client::new(Options::new().reset_error(false));

    client
        .get("echo", Options::new())
        .await
        .expect_err("no base uri");
    client
        .get("echo", Options::new())
        .await
        .expect_err("no base uri");
    assert_eq!(client.errors().len(), 2);

    // a successful call keeps the list when resetting is off
    client
        .get(&format!("{base}echo"), Options::new())
        .await
        .expect("absolute uri");
    assert_eq!(client.errors().len(), 2);

    client
        .get(&format!("{base}echo"), Options::new().reset_error(true))
        .await
        .expect("absolute uri");
    assert!(client.errors().is_empty());
}

#[tokio::test]
async fn stats_track_calls_and_bytes() {
    let base = support::spawn_server().await;
    let client = client_for(&base);

    client
        .post("echo", Options::new().json("{}"))
        .await
        .expect("post");
    client
        .get("/missing-base", Options::new().header("bad header", "x"))
        .await
        .expect_err("invalid header");

    let stats = client.stats();
    assert_eq!(stats.calls_total, 2);
    assert_eq!(stats.calls_failed, 1);
    assert_eq!(stats.bytes_sent, 2);
    assert!(stats.bytes_received > 0);
}
