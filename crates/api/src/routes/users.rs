//! User profile routes

use axum::{
    extract::{Extension, Multipart, State},
    Json,
};
use rolodex_shared::types::User;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    store,
};

use super::auth::UserResponse;

/// Get the current user's profile
pub async fn me(Extension(user): Extension<User>) -> Json<UserResponse> {
    Json(user.into())
}

/// Replace the current user's avatar.
///
/// Accepts a multipart upload with a `file` field, pushes the image to the
/// avatar host keyed by username, and persists the returned display URL.
pub async fn update_avatar(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    mut multipart: Multipart,
) -> ApiResult<Json<UserResponse>> {
    let mut image: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;
            image = Some(bytes.to_vec());
        }
    }

    let image = image.ok_or_else(|| ApiError::BadRequest("Missing file field".to_string()))?;
    if image.is_empty() {
        return Err(ApiError::BadRequest("Empty file field".to_string()));
    }

    let url = state
        .media
        .upload_avatar(&user.username, image)
        .await
        .map_err(|e| {
            tracing::error!(user_id = user.id, error = %e, "update_avatar: upload failed");
            ApiError::Internal
        })?;

    let updated = store::users::update_avatar(&state.pool, &user.email, &url).await?;
    tracing::info!(user_id = updated.id, "update_avatar: avatar replaced");

    Ok(Json(updated.into()))
}
