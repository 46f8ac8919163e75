use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use taulen_wizard::api::{ApplicationDataSource, FetchError, HttpApplicationClient};
use taulen_wizard::shared::ApplicationId;

struct CapturedRequest {
    request_line: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl CapturedRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

fn spawn_api_server(status_line: &str, response_body: &str) -> (String, Receiver<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server");
    let addr = listener.local_addr().expect("local addr");
    let status_line = status_line.to_string();
    let response_body = response_body.to_string();
    let (sender, receiver) = mpsc::channel();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

        let mut request_line = String::new();
        reader
            .read_line(&mut request_line)
            .expect("read request line");

        let mut headers = Vec::new();
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).expect("read header line");
            if line == "\r\n" || line.is_empty() {
                break;
            }
            if let Some((key, value)) = line.trim_end().split_once(':') {
                headers.push((key.trim().to_string(), value.trim().to_string()));
            }
        }

        let length = headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.parse::<usize>().ok())
            .unwrap_or(0);
        let mut body = vec![0u8; length];
        reader.read_exact(&mut body).expect("read body");

        sender
            .send(CapturedRequest {
                request_line: request_line.trim_end().to_string(),
                headers,
                body: String::from_utf8_lossy(&body).to_string(),
            })
            .expect("send captured request");

        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            response_body.len(),
            response_body
        );
        stream
            .write_all(response.as_bytes())
            .expect("write response");
    });

    (format!("http://{}/api/v1", addr), receiver)
}

fn id(raw: &str) -> ApplicationId {
    ApplicationId::parse(raw).expect("valid id")
}

#[test]
fn fetch_application_sends_bearer_get_and_decodes_json() {
    let (base, requests) = spawn_api_server("200 OK", r#"{"id":42,"loanPurpose":"purchase"}"#);
    let client = HttpApplicationClient::new(base, Some("secret-token".to_string()));

    let payload = client.fetch_application(&id("42")).expect("fetch");
    assert_eq!(payload, json!({ "id": 42, "loanPurpose": "purchase" }));

    let request = requests.recv().expect("captured request");
    assert_eq!(
        request.request_line,
        "GET /api/v1/urla/applications/42 HTTP/1.1"
    );
    assert_eq!(request.header("authorization"), Some("Bearer secret-token"));
}

#[test]
fn save_application_posts_partial_update() {
    let (base, requests) = spawn_api_server("200 OK", r#"{"ok":true}"#);
    let client = HttpApplicationClient::new(base, None);

    client
        .save_application(&id("42"), &json!({ "nextFormStep": "assets" }))
        .expect("save");

    let request = requests.recv().expect("captured request");
    assert_eq!(
        request.request_line,
        "POST /api/v1/urla/applications/42/save HTTP/1.1"
    );
    assert_eq!(request.header("authorization"), None);
    let body: Value = serde_json::from_str(&request.body).expect("json body");
    assert_eq!(body, json!({ "nextFormStep": "assets" }));
}

#[test]
fn progress_endpoints_use_progress_paths() {
    let (base, requests) = spawn_api_server("200 OK", r#"{"sections":{"assets":true}}"#);
    let client = HttpApplicationClient::new(base, None);
    let progress = client.fetch_progress(&id("7")).expect("progress");
    assert_eq!(progress["sections"]["assets"], json!(true));
    assert_eq!(
        requests.recv().expect("request").request_line,
        "GET /api/v1/urla/applications/7/progress HTTP/1.1"
    );

    let (base, requests) = spawn_api_server("204 No Content", "");
    let client = HttpApplicationClient::new(base, None);
    client
        .update_progress_section(&id("7"), "assets", true)
        .expect("update section");
    let request = requests.recv().expect("request");
    assert_eq!(
        request.request_line,
        "PATCH /api/v1/urla/applications/7/progress/section HTTP/1.1"
    );
    let body: Value = serde_json::from_str(&request.body).expect("json body");
    assert_eq!(body, json!({ "section": "assets", "complete": true }));
}

#[test]
fn not_found_and_forbidden_are_stale_application_errors() {
    let (base, _requests) = spawn_api_server("404 Not Found", r#"{"error":"deal not found"}"#);
    let err = HttpApplicationClient::new(base, None)
        .fetch_application(&id("42"))
        .expect_err("missing application");
    assert!(matches!(err, FetchError::NotFound { ref id } if id == "42"));
    assert!(err.is_stale_application());

    let (base, _requests) = spawn_api_server("403 Forbidden", r#"{"error":"forbidden"}"#);
    let err = HttpApplicationClient::new(base, None)
        .fetch_application(&id("42"))
        .expect_err("forbidden application");
    assert!(matches!(err, FetchError::Unauthorized { status: 403 }));
    assert!(err.is_stale_application());
}

#[test]
fn server_errors_carry_the_error_message() {
    let (base, _requests) =
        spawn_api_server("500 Internal Server Error", r#"{"error":"database offline"}"#);
    let err = HttpApplicationClient::new(base, None)
        .fetch_application(&id("42"))
        .expect_err("server error");
    match err {
        FetchError::Status { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "database offline");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn unreachable_server_is_a_request_error() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let err = HttpApplicationClient::new(format!("http://{addr}/api/v1"), None)
        .fetch_application(&id("42"))
        .expect_err("connection refused");
    assert!(matches!(err, FetchError::Request(_)));
    assert!(!err.is_stale_application());
}
