//! HTTP API tests against a live server on a free local port.

use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;

use text_insight::config::{AnalysisConfig, Config, DbConfig, ServerConfig, UpstreamConfig};
use text_insight::server::run_server;

fn find_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

async fn wait_for_server(port: u16) {
    let client = reqwest::Client::new();
    let url = format!("http://127.0.0.1:{}/health", port);
    for _ in 0..50 {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        if let Ok(resp) = client.get(&url).send().await {
            if resp.status().is_success() {
                return;
            }
        }
    }
    panic!("Server did not become ready within 5 seconds");
}

struct TestServer {
    _tmp: TempDir,
    base: String,
    handle: tokio::task::JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn start_server() -> TestServer {
    let tmp = TempDir::new().unwrap();
    let port = find_free_port();
    let config = Config {
        db: DbConfig {
            path: PathBuf::from(tmp.path()).join("insight.sqlite"),
        },
        analysis: AnalysisConfig {
            max_text_chars: 1000,
            ..Default::default()
        },
        upstream: UpstreamConfig::default(),
        server: ServerConfig {
            bind: format!("127.0.0.1:{}", port),
        },
    };

    let handle = tokio::spawn(async move {
        run_server(&config).await.ok();
    });
    wait_for_server(port).await;

    TestServer {
        _tmp: tmp,
        base: format!("http://127.0.0.1:{}", port),
        handle,
    }
}

const POSITIVE: &str = "I love this new technology! It's amazing and innovative.";
const NEGATIVE: &str = "The stock market crashed and investors are worried.";

async fn post_analyze(client: &reqwest::Client, base: &str, text: &str) -> Value {
    let resp = client
        .post(format!("{}/api/analyze", base))
        .json(&json!({ "text": text }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    resp.json().await.unwrap()
}

#[tokio::test]
async fn test_health() {
    let server = start_server().await;
    let body: Value = reqwest::get(format!("{}/health", server.base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_analyze_creates_record() {
    let server = start_server().await;
    let client = reqwest::Client::new();

    let body = post_analyze(&client, &server.base, POSITIVE).await;
    assert_eq!(body["analysis_method"], "mock");
    assert_eq!(body["sentiment"], "positive");
    assert_eq!(body["original_text"], POSITIVE);
    assert_eq!(body["keywords"], json!(["technology"]));
    assert!(body["id"].as_str().is_some());
    assert!(body["created_at"].as_str().unwrap().ends_with('Z'));

    let id = body["id"].as_str().unwrap();
    let resp = client
        .get(format!("{}/api/{}", server.base, id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let fetched: Value = resp.json().await.unwrap();
    assert_eq!(fetched, body);
}

#[tokio::test]
async fn test_analyze_rejects_bad_input() {
    let server = start_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/analyze", server.base))
        .json(&json!({ "text": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "bad_request");
    assert_eq!(body["error"]["message"], "input text must not be empty");

    let resp = client
        .post(format!("{}/api/analyze", server.base))
        .json(&json!({ "text": "x".repeat(1001) }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = client
        .post(format!("{}/api/analyze", server.base))
        .json(&json!({ "body": "wrong field" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn test_batch_with_empty_item() {
    let server = start_server().await;
    let client = reqwest::Client::new();

    let texts: Vec<String> = (1..=10)
        .map(|i| {
            if i == 5 {
                String::new()
            } else {
                format!("Sample text number {} about climate research.", i)
            }
        })
        .collect();

    let resp = client
        .post(format!("{}/api/batch-analyze", server.base))
        .json(&json!({ "texts": texts }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();

    assert_eq!(body["total_requested"], 10);
    assert_eq!(body["total_processed"], 9);
    assert_eq!(body["success_count"], 9);
    assert_eq!(body["error_count"], 1);
    assert_eq!(body["analyses"].as_array().unwrap().len(), 9);
    assert_eq!(body["errors"][0]["index"], 4);
    assert_eq!(body["errors"][0]["text"], "");
    assert_eq!(body["errors"][0]["error"], "input text must not be empty");
}

#[tokio::test]
async fn test_batch_without_errors_omits_errors_field() {
    let server = start_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/batch-analyze", server.base))
        .json(&json!({ "texts": [POSITIVE, NEGATIVE] }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success_count"], 2);
    assert!(body.get("errors").is_none());
}

#[tokio::test]
async fn test_batch_size_limits() {
    let server = start_server().await;
    let client = reqwest::Client::new();

    for texts in [vec![], vec!["text"; 11]] {
        let resp = client
            .post(format!("{}/api/batch-analyze", server.base))
            .json(&json!({ "texts": texts }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
        let body: Value = resp.json().await.unwrap();
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("between 1 and 10"));
    }
}

#[tokio::test]
async fn test_search_and_list() {
    let server = start_server().await;
    let client = reqwest::Client::new();

    post_analyze(&client, &server.base, POSITIVE).await;
    post_analyze(&client, &server.base, NEGATIVE).await;

    let list: Value = client
        .get(format!("{}/api/list", server.base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["original_text"], NEGATIVE);

    let hits: Value = client
        .get(format!("{}/api/search?topic=business", server.base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(hits.as_array().unwrap().len(), 1);
    assert_eq!(hits[0]["sentiment"], "negative");

    let hits: Value = client
        .get(format!(
            "{}/api/search?keyword=technology&sentiment=positive",
            server.base
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(hits.as_array().unwrap().len(), 1);
    assert_eq!(hits[0]["original_text"], POSITIVE);
}

#[tokio::test]
async fn test_search_validation() {
    let server = start_server().await;
    let client = reqwest::Client::new();

    for query in ["", "?topic=", "?sentiment=ecstatic"] {
        let resp = client
            .get(format!("{}/api/search{}", server.base, query))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400, "query {:?}", query);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"]["code"], "bad_request");
    }
}

#[tokio::test]
async fn test_get_not_found() {
    let server = start_server().await;
    let resp = reqwest::get(format!("{}/api/does-not-exist", server.base))
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let server = start_server().await;
    let resp = reqwest::Client::new()
        .get(format!("{}/health", server.base))
        .header("Origin", "http://example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}
