//! Visit history models.

use chrono::{DateTime, Utc};
use serde::Serialize;

use ristretto_core::{PlaceId, VisitId};

/// A recorded visit to a coffee shop.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    #[serde(skip_serializing)]
    pub id: VisitId,
    pub place_id: PlaceId,
    pub name: String,
    pub visited_at: DateTime<Utc>,
}

/// Fields for recording a visit.
#[derive(Debug, Clone)]
pub struct NewVisit {
    pub place_id: PlaceId,
    pub name: String,
}
