//! SpaceSerp provider tests against a mock server
//!
//! These tests cover request parameters, response parsing and the mapping of
//! transport failures to errors.

use serde_json::json;
use std::time::Duration;
use serp_export::{
    error::SearchError,
    providers::SpaceSerpProvider,
    types::{Keyword, ResultFetcher, SearchParams},
};
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

const SEARCH_PATH: &str = "/google/search";

async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

fn provider_for(server: &MockServer) -> SpaceSerpProvider {
    SpaceSerpProvider::new("test_key")
        .unwrap()
        .with_base_url(&format!("{}{}", server.uri(), SEARCH_PATH))
}

fn keyword(text: &str) -> Keyword {
    Keyword::new(text).unwrap()
}

fn organic_response() -> serde_json::Value {
    json!({
        "request_info": {"success": true},
        "organic_results": [
            {
                "position": 1,
                "page": 1,
                "domain": "example.com",
                "link": "http://example.com",
                "title": "T1",
                "description": "D1",
                "is_amp": false
            },
            {
                "position": 2,
                "page": 1,
                "domain": "plumbers.example",
                "link": "https://plumbers.example/houston",
                "title": "Houston Plumbers",
                "description": "Licensed plumbers in Houston"
            }
        ]
    })
}

#[tokio::test]
async fn test_sends_fixed_query_parameters() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("apiKey", "test_key"))
        .and(query_param("q", "plumber houston"))
        .and(query_param("location", "Houston,Texas,United States"))
        .and(query_param("domain", "google.com"))
        .and(query_param("gl", "us"))
        .and(query_param("hl", "en"))
        .and(query_param("resultFormat", "json"))
        .and(query_param("resultBlocks", "organic_results"))
        .and(query_param("pageSize", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(organic_response()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let records = provider_for(&mock_server)
        .fetch(&keyword("plumber houston"))
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].get("title"), Some(&json!("T1")));
    assert_eq!(records[1].get("domain"), Some(&json!("plumbers.example")));
    // Extra fields survive until projection
    assert_eq!(records[0].get("is_amp"), Some(&json!(false)));
}

#[tokio::test]
async fn test_custom_search_params() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("location", "Austin,Texas,United States"))
        .and(query_param("pageSize", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(organic_response()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server).with_params(SearchParams {
        location: "Austin,Texas,United States".to_string(),
        page_size: 10,
        ..Default::default()
    });

    let records = provider.fetch(&keyword("roofer austin")).await.unwrap();
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn test_missing_results_key_is_empty_not_error() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"request_info": {"success": true}})),
        )
        .mount(&mock_server)
        .await;

    let records = provider_for(&mock_server)
        .fetch(&keyword("roofer houston"))
        .await
        .unwrap();

    assert!(records.is_empty());
}

#[tokio::test]
async fn test_malformed_json_is_empty_not_error() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"organic_results\": ["))
        .mount(&mock_server)
        .await;

    let records = provider_for(&mock_server)
        .fetch(&keyword("roofer houston"))
        .await
        .unwrap();

    assert!(records.is_empty());
}

#[tokio::test]
async fn test_unauthorized_maps_to_authentication_error() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "bad key"})))
        .mount(&mock_server)
        .await;

    let result = provider_for(&mock_server).fetch(&keyword("plumber")).await;

    match result {
        Err(SearchError::AuthenticationError(msg)) => assert!(msg.contains("401")),
        other => panic!("Expected AuthenticationError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_rate_limited_status() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let result = provider_for(&mock_server).fetch(&keyword("plumber")).await;
    assert!(matches!(result, Err(SearchError::RateLimit(_))));
}

#[tokio::test]
async fn test_server_error_keeps_status_and_body() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&mock_server)
        .await;

    let result = provider_for(&mock_server).fetch(&keyword("plumber")).await;

    match result {
        Err(SearchError::HttpError {
            status_code,
            response_body,
            ..
        }) => {
            assert_eq!(status_code, Some(503));
            assert_eq!(response_body.as_deref(), Some("maintenance"));
        }
        other => panic!("Expected HttpError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_timeout_reports_configured_value() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(organic_response())
                .set_delay(Duration::from_millis(1_000)),
        )
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server).with_timeout(100).unwrap();
    let result = provider.fetch(&keyword("plumber")).await;

    match result {
        Err(SearchError::Timeout { timeout_ms }) => assert_eq!(timeout_ms, 100),
        other => panic!("Expected Timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn test_connection_refused_is_http_error() {
    let provider = SpaceSerpProvider::new("test_key")
        .unwrap()
        .with_base_url("http://127.0.0.1:9/google/search")
        .with_timeout(2_000)
        .unwrap();

    let result = provider.fetch(&keyword("plumber")).await;

    match result {
        Err(SearchError::HttpError { status_code, .. }) => assert_eq!(status_code, None),
        Err(SearchError::Timeout { .. }) => {}
        other => panic!("Expected HttpError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_base_url() {
    let provider = SpaceSerpProvider::new("test_key")
        .unwrap()
        .with_base_url("not a url");

    let result = provider.fetch(&keyword("plumber")).await;
    assert!(matches!(result, Err(SearchError::InvalidInput(_))));
}
