//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                    - Liveness check (no auth)
//! GET    /health/ready              - Storage readiness check (no auth)
//!
//! # Authenticated
//! GET    /coffee_shops              - Nearby cafes (?lat&lng&radius&max)
//! GET    /coffee_shops/{place_id}   - Cafe details
//! GET    /favorites                 - Saved cafes, newest first
//! POST   /favorites                 - Save a cafe
//! DELETE /favorites?placeId=        - Remove a saved cafe
//! GET    /visits                    - Recent visits, newest first
//! POST   /visits                    - Record a visit
//! GET    /user                      - Current user profile
//! ```

pub mod coffee_shops;
pub mod favorites;
pub mod health;
pub mod user;
pub mod visits;

use std::time::Duration;

use axum::{
    Router, middleware,
    routing::get,
};
use serde::Serialize;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::{cors_layer, request_id_middleware, require_auth};
use crate::state::AppState;

/// `{"message": "..."}` body for successful writes.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    #[must_use]
    pub const fn new(message: &'static str) -> Self {
        Self { message }
    }
}

/// Routes that require an authenticated user.
fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/coffee_shops", get(coffee_shops::list))
        .route("/coffee_shops/", get(coffee_shops::list))
        .route("/coffee_shops/{place_id}", get(coffee_shops::show))
        .route(
            "/favorites",
            get(favorites::list)
                .post(favorites::add)
                .delete(favorites::remove),
        )
        .route("/visits", get(visits::list).post(visits::record))
        .route("/user", get(user::show))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
}

/// Build the full application router.
///
/// Sentry layers are added by the binary so tests can drive this router
/// without a Sentry client.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(protected_routes(&state))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri().path(),
                        request_id = tracing::field::Empty,
                        user_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .layer(cors_layer())
        .with_state(state)
}
