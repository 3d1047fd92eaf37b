//! Domain row types shared across the Rolodex service.

use serde::Serialize;
use sqlx::FromRow;
use time::{Date, OffsetDateTime};

/// A registered account.
///
/// Deliberately not `Serialize`: `password_hash` and the `refresh_token`
/// rotation slot must never leave the process. Route handlers build their
/// own response types from the public fields.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub avatar: Option<String>,
    pub refresh_token: Option<String>,
    pub confirmed: bool,
    pub created_at: OffsetDateTime,
}

/// A contact record owned by exactly one [`User`].
///
/// This is also the wire shape: every field is safe to return to the owner.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Contact {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub birthday: Option<Date>,
    pub note: Option<String>,
    pub user_id: i64,
    pub created_at: OffsetDateTime,
}
