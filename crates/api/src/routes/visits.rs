//! Visit history handlers.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use ristretto_core::PlaceId;

use super::MessageResponse;
use super::favorites::non_blank;
use crate::db::VISIT_HISTORY_LIMIT;
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::{NewVisit, Visit};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct VisitsResponse {
    pub visits: Vec<Visit>,
}

/// Body of `POST /visits`.
#[derive(Debug, Deserialize)]
pub struct RecordVisitRequest {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// `GET /visits`
///
/// Most recent first.
#[instrument(skip_all, fields(user_id = %user.user_id))]
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<VisitsResponse>> {
    let visits = state
        .repositories()
        .visits
        .list_recent(user.user_id, VISIT_HISTORY_LIMIT)
        .await?;

    Ok(Json(VisitsResponse { visits }))
}

/// `POST /visits`
#[instrument(skip_all, fields(user_id = %user.user_id))]
pub async fn record(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    body: std::result::Result<Json<RecordVisitRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    let Json(body) = body.map_err(|_| AppError::BadRequest("Invalid request body".to_string()))?;
    let (Some(id), Some(name)) = (non_blank(body.id), non_blank(body.name)) else {
        return Err(AppError::BadRequest(
            "Place ID and Name are required".to_string(),
        ));
    };

    let visit = NewVisit {
        place_id: PlaceId::parse(&id)?,
        name,
    };
    let recorded = state
        .repositories()
        .visits
        .record(user.user_id, &visit)
        .await?;
    info!(visit_id = %recorded.id, place_id = %recorded.place_id, "Visit recorded");

    Ok((StatusCode::CREATED, Json(MessageResponse::new("Visit recorded"))))
}
