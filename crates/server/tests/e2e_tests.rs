//! End-to-end tests with mocked dependencies.
//!
//! These tests run the full server stack in-process with in-memory
//! implementations for the queue and object stores and a mock renderer.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{TestConfig, TestFixture};

// =============================================================================
// Basic API Tests
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_config_endpoint_reports_templates_without_secrets() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/config").await;
    assert_eq!(response.status, StatusCode::OK);

    let body = response.body.to_string();
    assert!(body.contains("crm-trade-invoice"));
    assert!(body.contains("product-de"));
    assert!(!body.contains("e2e-ticket-secret"));
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/metrics").await;
    assert_eq!(response.status, StatusCode::OK);

    let text = String::from_utf8(response.bytes.clone()).unwrap();
    assert!(text.contains("pressroom_http_requests_total") || text.contains("pressroom_"));
}

#[tokio::test]
async fn test_jobs_status_endpoint() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/jobs/status").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["running"], true);
    assert_eq!(response.body["max_concurrency"], 2);
    assert_eq!(response.body["queue"]["dead_lettered"], 0);
}

#[tokio::test]
async fn test_dead_letters_endpoint_starts_empty() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/dead-letters").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["dead_letters"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/nope").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Authentication Tests
// =============================================================================

#[tokio::test]
async fn test_api_key_auth_rejects_missing_key() {
    let fixture = TestFixture::with_config(TestConfig::with_api_key("sekrit")).await;
    let response = fixture.get("/api/v1/health").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_api_key_auth_rejects_wrong_key() {
    let fixture = TestFixture::with_config(TestConfig::with_api_key("sekrit")).await;
    let response = fixture
        .get_with_headers("/api/v1/health", &[("X-API-Key", "wrong")])
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_api_key_auth_accepts_valid_key() {
    let fixture = TestFixture::with_config(TestConfig::with_api_key("sekrit")).await;

    let response = fixture
        .get_with_headers("/api/v1/health", &[("X-API-Key", "sekrit")])
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = fixture
        .get_with_headers("/api/v1/health", &[("Authorization", "Bearer sekrit")])
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_metrics_endpoint_is_not_behind_auth() {
    let fixture = TestFixture::with_config(TestConfig::with_api_key("sekrit")).await;
    let response = fixture.get("/metrics").await;
    assert_eq!(response.status, StatusCode::OK);
}

// =============================================================================
// Render Endpoint Validation
// =============================================================================

#[tokio::test]
async fn test_render_unknown_template_returns_404() {
    let fixture = TestFixture::new().await;
    let ticket = fixture.issue_ticket().await;

    let response = fixture
        .post_with_headers(
            "/api/v1/render/no-such-template?foo=1",
            json!({}),
            &[("X-Pdf-Ticket", ticket.as_str())],
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_render_missing_params_returns_400_listing_all_names() {
    let fixture = TestFixture::new().await;
    let ticket = fixture.issue_ticket().await;

    let response = fixture
        .post_with_headers(
            "/api/v1/render/product-de",
            json!({}),
            &[("X-Pdf-Ticket", ticket.as_str())],
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let error = response.body["error"].as_str().unwrap();
    assert!(error.contains("isin"), "error was: {error}");
    assert!(error.contains("date"), "error was: {error}");
}

#[tokio::test]
async fn test_render_empty_param_counts_as_missing() {
    let fixture = TestFixture::new().await;
    let ticket = fixture.issue_ticket().await;

    let response = fixture
        .post_with_headers(
            "/api/v1/render/crm-trade-invoice?tradeid=",
            json!({}),
            &[("X-Pdf-Ticket", ticket.as_str())],
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_render_failure_returns_502() {
    let fixture = TestFixture::new().await;
    fixture.renderer.set_fail_html(true).await;
    let ticket = fixture.issue_ticket().await;

    let response = fixture
        .post_with_headers(
            "/api/v1/render/crm-trade-invoice?tradeid=T-1",
            json!({}),
            &[("X-Pdf-Ticket", ticket.as_str())],
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_body_params_override_query_params() {
    let fixture = TestFixture::new().await;
    let ticket = fixture.issue_ticket().await;

    let response = fixture
        .post_with_headers(
            "/api/v1/render/crm-trade-invoice?tradeid=from-query",
            json!({ "tradeid": "from-body" }),
            &[("X-Pdf-Ticket", ticket.as_str())],
        )
        .await;
    assert_eq!(response.status, StatusCode::ACCEPTED);

    let renders = fixture.renderer.recorded_renders().await;
    assert_eq!(renders.len(), 1);
    assert_eq!(
        renders[0].params,
        vec![("tradeid".to_string(), "from-body".to_string())]
    );
}
