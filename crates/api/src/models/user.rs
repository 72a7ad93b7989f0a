//! User domain models.

use chrono::{DateTime, Utc};
use serde::Serialize;

use ristretto_core::UserId;

/// A locally provisioned user.
///
/// Users are keyed by the identity provider's subject (`external_id`);
/// the local integer id is what every other table references.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Local user ID.
    pub id: UserId,
    /// Identity provider subject.
    pub external_id: String,
    /// Email address from the token at first sight.
    pub email: Option<String>,
    /// Given name from the token at first sight.
    pub first_name: Option<String>,
    /// Family name from the token at first sight.
    pub last_name: Option<String>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Fields for provisioning a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub external_id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// The authenticated identity resolved for one request.
///
/// Inserted into request extensions by the auth middleware and read by
/// handlers through the `CurrentUser` extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Identity provider subject.
    pub external_id: String,
    /// Local user ID.
    pub user_id: UserId,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}
