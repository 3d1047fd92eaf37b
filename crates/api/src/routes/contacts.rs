//! Contact routes
//!
//! All handlers run behind `require_auth`; the owner id is taken from the
//! resolved user, never from the request.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use rolodex_shared::types::{Contact, User};
use serde::Deserialize;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    store::contacts::{self, ContactInput},
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: String,
}

/// List the current user's contacts
pub async fn list_contacts(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<Contact>>> {
    let contacts = contacts::list(&state.pool, user.id, params.skip, params.limit).await?;
    Ok(Json(contacts))
}

/// Create a contact owned by the current user
pub async fn create_contact(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(input): Json<ContactInput>,
) -> ApiResult<(StatusCode, Json<Contact>)> {
    let contact = contacts::create(&state.pool, user.id, &input).await?;
    tracing::info!(user_id = user.id, contact_id = contact.id, "contact created");
    Ok((StatusCode::CREATED, Json(contact)))
}

/// Get one of the current user's contacts
pub async fn get_contact(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(contact_id): Path<i64>,
) -> ApiResult<Json<Contact>> {
    let contact = contacts::get(&state.pool, user.id, contact_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(contact))
}

/// Replace one of the current user's contacts (full-field update)
pub async fn update_contact(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(contact_id): Path<i64>,
    Json(input): Json<ContactInput>,
) -> ApiResult<Json<Contact>> {
    let contact = contacts::update(&state.pool, user.id, contact_id, &input)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(contact))
}

/// Delete one of the current user's contacts, returning the removed record
pub async fn delete_contact(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(contact_id): Path<i64>,
) -> ApiResult<Json<Contact>> {
    let contact = contacts::delete(&state.pool, user.id, contact_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    tracing::info!(user_id = user.id, contact_id = contact.id, "contact deleted");
    Ok(Json(contact))
}

/// Search the current user's contacts by name or email substring
pub async fn search_contacts(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<Contact>>> {
    let contacts = contacts::search(&state.pool, user.id, &params.query).await?;
    Ok(Json(contacts))
}

/// Contacts with a birthday in the next seven days
pub async fn upcoming_birthdays(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> ApiResult<Json<Vec<Contact>>> {
    let contacts = contacts::upcoming_birthdays(&state.pool, user.id).await?;
    Ok(Json(contacts))
}
