//! Authentication gate and current-user extractor.
//!
//! [`require_auth`] runs on every protected route. It authenticates the
//! bearer token, provisions the local user, and stores the resulting
//! [`Principal`] in request extensions. Handlers read it with [`CurrentUser`].

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{Method, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::Span;

use crate::error::{AppError, set_sentry_user};
use crate::models::Principal;
use crate::state::AppState;

/// Middleware that rejects unauthenticated requests.
///
/// `OPTIONS` requests pass through untouched. Credential failures are logged
/// at WARN and answered with 401; signing-key and provisioning failures are
/// logged at ERROR and answered with 500.
///
/// # Errors
///
/// Returns `AppError::Auth` when authentication fails.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if request.method() == Method::OPTIONS {
        return Ok(next.run(request).await);
    }

    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let principal = match state.auth().authenticate(authorization).await {
        Ok(principal) => principal,
        Err(err) => {
            if err.is_client_error() {
                tracing::warn!(error = %err, "Rejected request credentials");
            } else {
                tracing::error!(error = %err, "Authentication failed");
            }
            return Err(err.into());
        }
    };

    Span::current().record("user_id", principal.user_id.as_i32());
    set_sentry_user(&principal.user_id, principal.email.as_deref());

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

/// Extractor for the authenticated user.
///
/// Only usable on routes behind [`require_auth`]. A request that reaches a
/// handler without a principal is rejected with 400.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CurrentUser(principal): CurrentUser) -> String {
///     principal.user_id.to_string()
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(Self)
            .ok_or_else(|| AppError::BadRequest("Invalid user ID".to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Router, body::Body, http::Request as HttpRequest, http::StatusCode, routing::get};
    use tower::ServiceExt;

    use super::*;

    #[tokio::test]
    async fn test_extractor_rejects_missing_principal() {
        let app = Router::new().route(
            "/",
            get(|CurrentUser(p): CurrentUser| async move { p.external_id }),
        );

        let response = app
            .oneshot(HttpRequest::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
