//! Authentication gate tests.

#![allow(clippy::unwrap_used)]

use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use ristretto_integration_tests::{TestContext, TestOptions};

#[tokio::test]
async fn test_health_needs_no_token() {
    let ctx = TestContext::new().await;

    let resp = ctx.get("/health", None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.text(), "OK");

    let resp = ctx.get("/health/ready", None).await;
    assert_eq!(resp.status, StatusCode::OK);
}

#[tokio::test]
async fn test_readiness_reports_storage_outage() {
    let ctx = TestContext::new().await;
    ctx.store.set_unavailable(true);

    let resp = ctx.get("/health/ready", None).await;
    assert_eq!(resp.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_missing_header_is_rejected_before_provisioning() {
    let ctx = TestContext::new().await;

    for uri in ["/coffee_shops", "/favorites", "/visits", "/user"] {
        let resp = ctx.get(uri, None).await;
        assert_eq!(resp.status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(resp.text(), "Invalid or missing credentials");
    }
    assert_eq!(ctx.store.user_count(), 0);
}

#[tokio::test]
async fn test_non_bearer_and_untrusted_tokens_are_rejected() {
    let ctx = TestContext::new().await;

    let basic = Request::builder()
        .uri("/user")
        .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();
    assert_eq!(ctx.send(basic).await.status, StatusCode::UNAUTHORIZED);

    let forged = ctx.untrusted_token("user_1");
    let resp = ctx.get("/user", Some(&forged)).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(ctx.store.user_count(), 0);
}

#[tokio::test]
async fn test_first_request_provisions_user_once() {
    let ctx = TestContext::new().await;
    let token = ctx.token("user_2abc");

    let resp = ctx.get("/user", Some(&token)).await;
    assert_eq!(resp.status, StatusCode::OK);
    let user = resp.json();
    assert_eq!(user["externalId"], "user_2abc");
    assert_eq!(user["email"], "user_2abc@example.com");
    assert_eq!(user["firstName"], "Test");

    let again = ctx.get("/user", Some(&token)).await.json();
    assert_eq!(again["id"], user["id"]);
    assert_eq!(ctx.store.user_count(), 1);
}

#[tokio::test]
async fn test_storage_outage_during_provisioning_is_server_error() {
    let ctx = TestContext::new().await;
    ctx.store.set_unavailable(true);

    let resp = ctx.get("/user", Some(&ctx.token("user_1"))).await;
    assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.text(), "Internal server error");
}

#[tokio::test]
async fn test_missing_signing_key_is_server_error() {
    let ctx = TestContext::build(TestOptions {
        signing_key: false,
        ..TestOptions::default()
    })
    .await;

    let resp = ctx.get("/user", Some(&ctx.token("user_1"))).await;
    assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_preflight_bypasses_auth() {
    let ctx = TestContext::new().await;

    let preflight = Request::builder()
        .method(Method::OPTIONS)
        .uri("/favorites")
        .header(header::ORIGIN, "https://app.example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(
            header::ACCESS_CONTROL_REQUEST_HEADERS,
            "authorization,content-type",
        )
        .body(Body::empty())
        .unwrap();

    let resp = ctx.send(preflight).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(
        resp.headers
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
    assert_eq!(ctx.store.user_count(), 0);
}

#[tokio::test]
async fn test_responses_carry_cors_and_request_id_headers() {
    let ctx = TestContext::new().await;

    let request = Request::builder()
        .uri("/coffee_shops")
        .header(header::ORIGIN, "https://app.example.com")
        .body(Body::empty())
        .unwrap();
    let resp = ctx.send(request).await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        resp.headers
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
    assert!(resp.headers.contains_key("x-request-id"));
}
