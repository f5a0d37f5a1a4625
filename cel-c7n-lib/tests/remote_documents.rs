//! Integration tests for the remote document pipeline against a local wiremock server

use cel_c7n_lib::Result;
use cel_c7n_lib::remote::{text_from, value_from};
use flate2::Compression;
use flate2::write::GzEncoder;
use serde_json::{Value as JsonValue, json};
use std::io::Write;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Run a blocking fetch off the async runtime
async fn fetch_value(url: String, format: Option<&'static str>) -> Result<JsonValue> {
    tokio::task::spawn_blocking(move || value_from(&url, format)).await.unwrap()
}

async fn fetch_text(url: String) -> Result<String> {
    tokio::task::spawn_blocking(move || text_from(&url)).await.unwrap()
}

async fn serve(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn gzip(text: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(text.as_bytes()).unwrap();
    encoder.finish().unwrap()
}

#[tokio::test]
async fn test_json_suffix_matches_explicit_format() {
    let server = MockServer::start().await;
    serve(&server, "/accounts.json", r#"{"accounts": ["111", "222"]}"#).await;
    serve(&server, "/accounts", r#"{"accounts": ["111", "222"]}"#).await;

    let inferred = fetch_value(format!("{}/accounts.json", server.uri()), None).await.unwrap();
    let explicit = fetch_value(format!("{}/accounts", server.uri()), Some("json")).await.unwrap();

    assert_eq!(inferred, json!({"accounts": ["111", "222"]}));
    assert_eq!(inferred, explicit);
}

#[tokio::test]
async fn test_gzip_body_is_decompressed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/allowed.txt"))
        .and(header("accept-encoding", "gzip"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(gzip("alpha\n  beta  \ngamma\n"))
                .insert_header("content-encoding", "gzip"),
        )
        .mount(&server)
        .await;

    let value = fetch_value(format!("{}/allowed.txt", server.uri()), None).await.unwrap();
    assert_eq!(value, json!(["alpha", "beta", "gamma"]));
}

#[tokio::test]
async fn test_line_delimited_and_csv_formats() {
    let server = MockServer::start().await;
    serve(&server, "/events.jsonl", "{\"id\": 1}\n\n{\"id\": 2}\n").await;
    serve(&server, "/owners.csv", "name,team\nweb,ops\ndb,data\n").await;

    let events = fetch_value(format!("{}/events.jsonl", server.uri()), None).await.unwrap();
    assert_eq!(events, json!([{"id": 1}, {"id": 2}]));

    let rows = fetch_value(format!("{}/owners.csv", server.uri()), None).await.unwrap();
    assert_eq!(rows, json!([["name", "team"], ["web", "ops"], ["db", "data"]]));

    let records = fetch_value(format!("{}/owners.csv", server.uri()), Some("csv2dict")).await.unwrap();
    assert_eq!(records, json!([{"name": "web", "team": "ops"}, {"name": "db", "team": "data"}]));
}

#[tokio::test]
async fn test_unsupported_format_fails_before_fetching() {
    let server = MockServer::start().await;

    let err = fetch_value(format!("{}/policy.xml", server.uri()), None).await.unwrap_err();
    assert!(err.to_string().contains("Unsupported format"), "{err}");

    let err = fetch_value(format!("{}/policy.json", server.uri()), Some("yaml")).await.unwrap_err();
    assert!(err.to_string().contains("Unsupported format"), "{err}");

    let requests = server.received_requests().await.unwrap();
    assert!(requests.is_empty(), "no request should have been made");
}

#[tokio::test]
async fn test_http_error_propagates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = fetch_value(format!("{}/missing.json", server.uri()), None).await.unwrap_err();
    assert!(err.to_string().contains("HTTP 404"), "{err}");
}

#[tokio::test]
async fn test_text_from_returns_body() {
    let server = MockServer::start().await;
    serve(&server, "/motd", "hello\n").await;

    let text = fetch_text(format!("{}/motd", server.uri())).await.unwrap();
    assert_eq!(text, "hello\n");
}

#[tokio::test]
async fn test_malformed_document_is_an_error() {
    let server = MockServer::start().await;
    serve(&server, "/broken.json", "{not json").await;

    let _ = fetch_value(format!("{}/broken.json", server.uri()), None).await.unwrap_err();
}
