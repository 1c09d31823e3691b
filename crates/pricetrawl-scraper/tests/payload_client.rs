//! Integration tests for `PayloadClient` and the fetch → ingest path.
//!
//! Uses `wiremock` to stand up a local HTTP server for each test so no
//! real network traffic is made.

use std::sync::Arc;

use futures::StreamExt;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pricetrawl_core::ExtractRules;
use pricetrawl_scraper::{ingest, Collector, PayloadClient, ProductMatcher, ScraperError};

/// Builds a `PayloadClient` suitable for tests: 5-second timeout, no retries.
fn test_client() -> PayloadClient {
    PayloadClient::new(5, "pricetrawl-test/0.1", 0, 0).expect("failed to build test PayloadClient")
}

fn catalog_json() -> serde_json::Value {
    json!({
        "data": {
            "items": [
                {"title": "Milk", "price": 89.9, "slug": "/milk-1"},
                {"title": "Milk", "price": 89.9, "slug": "/milk-1"},
                {"foo": "bar"}
            ]
        }
    })
}

// ---------------------------------------------------------------------------
// fetch_payload
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_payload_returns_body_and_origin() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/catalog"))
        .respond_with(ResponseTemplate::new(200).set_body_json(catalog_json()))
        .mount(&server)
        .await;

    let url = format!("{}/api/catalog", server.uri());
    let payload = test_client().fetch_payload(&url).await.unwrap();

    assert_eq!(payload.origin_url, url);
    let body: serde_json::Value = serde_json::from_slice(&payload.body).unwrap();
    assert_eq!(body, catalog_json());
}

#[tokio::test]
async fn fetch_payload_rejects_html_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/catalog"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;

    let err = test_client()
        .fetch_payload(&format!("{}/catalog", server.uri()))
        .await
        .unwrap_err();
    assert!(
        matches!(err, ScraperError::NotJson { ref content_type, .. } if content_type.starts_with("text/html")),
        "expected NotJson, got: {err:?}"
    );
}

#[tokio::test]
async fn fetch_payload_accepts_vendor_json_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"ok":true}"#, "application/vnd.api+json"),
        )
        .mount(&server)
        .await;

    let payload = test_client()
        .fetch_payload(&format!("{}/api", server.uri()))
        .await
        .unwrap();
    assert_eq!(payload.body, br#"{"ok":true}"#);
}

#[tokio::test]
async fn fetch_payload_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = test_client()
        .fetch_payload(&format!("{}/missing", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, ScraperError::NotFound { .. }), "got: {err:?}");
}

#[tokio::test]
async fn fetch_payload_rate_limited_reports_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "17"))
        .mount(&server)
        .await;

    let err = test_client()
        .fetch_payload(&format!("{}/api", server.uri()))
        .await
        .unwrap_err();
    assert!(
        matches!(err, ScraperError::RateLimited { retry_after_secs: 17, .. }),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn fetch_payload_unexpected_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = test_client()
        .fetch_payload(&format!("{}/api", server.uri()))
        .await
        .unwrap_err();
    assert!(
        matches!(err, ScraperError::UnexpectedStatus { status: 403, .. }),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn fetch_payload_retries_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&server)
        .await;

    let client = PayloadClient::new(5, "pricetrawl-test/0.1", 2, 0).unwrap();
    let payload = client
        .fetch_payload(&format!("{}/api", server.uri()))
        .await
        .unwrap();
    assert_eq!(payload.body, br#"{"items":[]}"#);
}

#[tokio::test]
async fn fetch_payload_invalid_url() {
    let err = test_client().fetch_payload("not a url").await.unwrap_err();
    assert!(matches!(err, ScraperError::InvalidUrl { .. }), "got: {err:?}");
}

// ---------------------------------------------------------------------------
// fetch_all → ingest
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetched_payloads_are_extracted_and_deduplicated() {
    let server = MockServer::start().await;
    for page in ["/api/page/1", "/api/page/2"] {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(ResponseTemplate::new(200).set_body_json(catalog_json()))
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/api/page/3"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let urls: Vec<String> = (1..=3)
        .map(|n| format!("{}/api/page/{n}", server.uri()))
        .collect();
    let client = test_client();
    let mut failures = Vec::new();
    let payloads = client.fetch_all(&urls, 3).filter_map(|(url, result)| {
        let payload = match result {
            Ok(payload) => Some(payload),
            Err(e) => {
                failures.push((url.to_owned(), e.to_string()));
                None
            }
        };
        futures::future::ready(payload)
    });

    let collector = Arc::new(Collector::new());
    let stats = ingest(
        payloads,
        Arc::new(ProductMatcher::new(ExtractRules::default())),
        Arc::clone(&collector),
        4,
    )
    .await;

    assert_eq!(stats.payloads, 2);
    assert_eq!(stats.extracted, 4);
    assert_eq!(failures.len(), 1);
    assert!(failures[0].0.ends_with("/api/page/3"));

    let items = collector.snapshot();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name(), "Milk");
    assert_eq!(items[0].price(), "89.9");
    assert_eq!(items[0].url(), format!("{}/milk-1", server.uri()));
}
