//! Current user profile handler.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::User;
use crate::state::AppState;

/// `GET /user`
///
/// Returns the stored profile, which was provisioned from the token on the
/// user's first request.
#[instrument(skip_all, fields(user_id = %user.user_id))]
pub async fn show(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<User>> {
    state
        .repositories()
        .users
        .get(user.user_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}
