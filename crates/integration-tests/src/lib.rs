//! End-to-end test harness for the Ristretto API.
//!
//! Each [`TestContext`] owns a fully wired router backed by an in-memory
//! store and a `wiremock` places provider. Requests are driven through the
//! router with `tower::ServiceExt::oneshot`, so no ports are bound and no
//! database is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p ristretto-integration-tests
//! ```

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use axum::{
    Router,
    body::{Body, Bytes, to_bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode, get_current_timestamp};
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;
use url::Url;
use wiremock::MockServer;

use ristretto_api::config::{ApiConfig, AuthConfig, Environment, PlacesConfig};
use ristretto_api::db::{FavoriteStore, MemoryStore, Repositories};
use ristretto_api::places::PlacesClient;
use ristretto_api::routes;
use ristretto_api::state::AppState;

const PUBLIC_KEY: &str = include_str!("../../api/tests/fixtures/jwt_public.pem");
const PRIVATE_KEY: &str = include_str!("../../api/tests/fixtures/jwt_private.pem");
const OTHER_PRIVATE_KEY: &str = include_str!("../../api/tests/fixtures/other_private.pem");

/// API key the mock provider expects.
pub const PLACES_API_KEY: &str = "test-places-key";

/// Path prefix the mock provider serves under.
pub const PLACES_BASE_PATH: &str = "/v1";

/// How to build a [`TestContext`].
pub struct TestOptions {
    pub environment: Environment,
    /// Configure the token verification key.
    pub signing_key: bool,
    /// Replace the favorites store (for outage tests).
    pub favorites: Option<Arc<dyn FavoriteStore>>,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            environment: Environment::Production,
            signing_key: true,
            favorites: None,
        }
    }
}

/// A router wired to an in-memory store and a mock places provider.
pub struct TestContext {
    pub app: Router,
    pub store: Arc<MemoryStore>,
    pub places: MockServer,
}

impl TestContext {
    /// Production-mode context with a signing key configured.
    pub async fn new() -> Self {
        Self::build(TestOptions::default()).await
    }

    /// Development-mode context (provider failures serve fallback data).
    pub async fn development() -> Self {
        Self::build(TestOptions {
            environment: Environment::Development,
            ..TestOptions::default()
        })
        .await
    }

    pub async fn build(options: TestOptions) -> Self {
        let places = MockServer::start().await;
        let store = Arc::new(MemoryStore::new());

        let mut repositories = Repositories::memory(store.clone());
        if let Some(favorites) = options.favorites {
            repositories.favorites = favorites;
        }

        let config = ApiConfig {
            database_url: SecretString::from("postgres://unused"),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            environment: options.environment,
            auth: AuthConfig {
                jwt_public_key: options.signing_key.then(|| PUBLIC_KEY.to_string()),
                ..AuthConfig::default()
            },
            places: PlacesConfig {
                api_key: Some(SecretString::from(PLACES_API_KEY)),
                base_url: Url::parse(&format!("{}{PLACES_BASE_PATH}", places.uri()))
                    .expect("mock server uri"),
                photo_max_width_px: Some(400),
                photo_max_height_px: None,
            },
            sentry_dsn: None,
        };

        let provider = Arc::new(PlacesClient::new(&config.places).expect("places client"));
        let state = AppState::new(&config, repositories, provider).expect("app state");

        Self {
            app: routes::router(state),
            store,
            places,
        }
    }

    /// A valid RS256 token for `sub`.
    #[must_use]
    pub fn token(&self, sub: &str) -> String {
        sign(sub, PRIVATE_KEY)
    }

    /// A well-formed token signed by a key the API does not trust.
    #[must_use]
    pub fn untrusted_token(&self, sub: &str) -> String {
        sign(sub, OTHER_PRIVATE_KEY)
    }

    /// Send a request through the router.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// `GET` with an optional bearer token.
    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(request(Method::GET, uri, token, None)).await
    }

    /// `POST` a JSON body with a bearer token.
    pub async fn post_json(&self, uri: &str, token: &str, body: &Value) -> TestResponse {
        self.send(request(Method::POST, uri, Some(token), Some(body)))
            .await
    }

    /// `DELETE` with a bearer token.
    pub async fn delete(&self, uri: &str, token: &str) -> TestResponse {
        self.send(request(Method::DELETE, uri, Some(token), None))
            .await
    }
}

/// A buffered response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is JSON")
    }

    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8(self.body.to_vec()).expect("response body is UTF-8")
    }
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<&Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    builder.body(body).expect("valid request")
}

fn sign(sub: &str, private_key: &str) -> String {
    let now = get_current_timestamp();
    let claims = json!({
        "sub": sub,
        "email": format!("{sub}@example.com"),
        "firstName": "Test",
        "lastName": "User",
        "iat": now,
        "nbf": now,
        "exp": now + 600,
    });

    encode(
        &Header::new(Algorithm::RS256),
        &claims,
        &EncodingKey::from_rsa_pem(private_key.as_bytes()).expect("fixture key"),
    )
    .expect("sign token")
}
