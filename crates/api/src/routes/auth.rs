//! Authentication routes

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    auth::{hash_password, validate_password, verify_password, TokenScope},
    auth::middleware::bearer_token,
    error::{ApiError, ApiResult},
    state::AppState,
    store,
};

// =============================================================================
// Request/Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RequestEmail {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub avatar: Option<String>,
    pub confirmed: bool,
    pub created_at: OffsetDateTime,
}

impl From<rolodex_shared::types::User> for UserResponse {
    fn from(user: rolodex_shared::types::User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            avatar: user.avatar,
            confirmed: user.confirmed,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub user: UserResponse,
    pub detail: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Register a new account and send the confirmation email
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<(StatusCode, Json<SignupResponse>)> {
    let email = req.email.trim().to_lowercase();

    if req.username.trim().is_empty() || req.username.len() > 50 {
        return Err(ApiError::Validation(
            "Username must be between 1 and 50 characters".to_string(),
        ));
    }
    validate_password(&req.password).map_err(|e| ApiError::Validation(e.to_string()))?;

    if store::users::get_by_email(&state.pool, &email).await?.is_some() {
        return Err(ApiError::EmailAlreadyExists);
    }

    let password_hash = hash_password(&req.password).map_err(|e| {
        tracing::error!(error = %e, "signup: password hashing failed");
        ApiError::Internal
    })?;

    let user = store::users::create(&state.pool, req.username.trim(), &email, &password_hash)
        .await
        .map_err(|e| match ApiError::from(e) {
            // Unique-index race on email: surface the same conflict as the
            // pre-insert existence check
            ApiError::Conflict(_) => ApiError::EmailAlreadyExists,
            other => other,
        })?;

    tracing::info!(user_id = user.id, "signup: account created");

    // Confirmation email is fire-and-forget; signup succeeds regardless
    match state.jwt_manager.issue_email_confirmation(&user.email) {
        Ok(token) => {
            let email_service = state.email.clone();
            let to = user.email.clone();
            let username = user.username.clone();
            let base_url = state.config.public_url.clone();
            tokio::spawn(async move {
                email_service
                    .send_confirmation(&to, &username, &base_url, &token)
                    .await;
            });
        }
        Err(e) => {
            tracing::error!(user_id = user.id, error = %e, "signup: failed to issue confirmation token");
        }
    }

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            user: user.into(),
            detail: "User successfully created. Check your email for confirmation.".to_string(),
        }),
    ))
}

/// Login with email and password, returning an access/refresh token pair
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let email = req.email.trim().to_lowercase();

    // A missing account and a wrong password are indistinguishable to the caller
    let user = store::users::get_by_email(&state.pool, &email)
        .await?
        .ok_or_else(|| {
            tracing::debug!("login: unknown email");
            ApiError::InvalidCredentials
        })?;

    if !verify_password(&req.password, &user.password_hash) {
        tracing::debug!(user_id = user.id, "login: invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    if !user.confirmed {
        return Err(ApiError::EmailNotConfirmed);
    }

    let access_token = state.jwt_manager.issue_access(&user.email).map_err(|e| {
        tracing::error!(error = %e, "login: token issuance failed");
        ApiError::Internal
    })?;
    let refresh_token = state.jwt_manager.issue_refresh(&user.email).map_err(|e| {
        tracing::error!(error = %e, "login: token issuance failed");
        ApiError::Internal
    })?;

    store::users::update_refresh_token(&state.pool, user.id, Some(&refresh_token)).await?;

    tracing::info!(user_id = user.id, "login: session established");

    Ok(Json(TokenResponse {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_manager.access_token_expiry_seconds(),
    }))
}

/// Rotate a refresh token into a fresh access/refresh pair.
///
/// Presenting a refresh token that no longer matches the stored slot is
/// treated as reuse of a revoked token: the slot is nulled, forcing a full
/// re-login.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<TokenResponse>> {
    let presented = bearer_token(&headers).ok_or(ApiError::Unauthorized)?;

    let claims = state
        .jwt_manager
        .validate(presented, TokenScope::RefreshToken)
        .map_err(|e| {
            tracing::debug!(error = %e, "refresh: token rejected");
            ApiError::Unauthorized
        })?;

    let user = store::users::get_by_email(&state.pool, &claims.sub)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    let access_token = state.jwt_manager.issue_access(&user.email).map_err(|e| {
        tracing::error!(error = %e, "refresh: token issuance failed");
        ApiError::Internal
    })?;
    let refresh_token = state.jwt_manager.issue_refresh(&user.email).map_err(|e| {
        tracing::error!(error = %e, "refresh: token issuance failed");
        ApiError::Internal
    })?;

    // Single-statement compare-and-swap on the stored slot; a mismatch means
    // the presented token was already rotated out
    let rotated =
        store::users::swap_refresh_token(&state.pool, user.id, presented, &refresh_token).await?;

    if !rotated {
        tracing::warn!(user_id = user.id, "refresh: stale token reuse, revoking session");
        store::users::update_refresh_token(&state.pool, user.id, None).await?;
        return Err(ApiError::Unauthorized);
    }

    Ok(Json(TokenResponse {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_manager.access_token_expiry_seconds(),
    }))
}

/// Confirm an email address from the emailed token
pub async fn confirm_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let claims = state
        .jwt_manager
        .validate(&token, TokenScope::EmailConfirmation)
        .map_err(|_| ApiError::InvalidToken("Invalid token for email verification".to_string()))?;

    let user = store::users::get_by_email(&state.pool, &claims.sub)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Verification error".to_string()))?;

    if user.confirmed {
        return Ok(Json(MessageResponse {
            message: "Your email is already confirmed".to_string(),
        }));
    }

    store::users::confirm_email(&state.pool, &user.email).await?;
    tracing::info!(user_id = user.id, "confirm_email: email confirmed");

    Ok(Json(MessageResponse {
        message: "Email confirmed".to_string(),
    }))
}

/// Re-send the confirmation email
pub async fn resend_confirmation(
    State(state): State<AppState>,
    Json(req): Json<RequestEmail>,
) -> ApiResult<Json<MessageResponse>> {
    let email = req.email.trim().to_lowercase();

    let user = store::users::get_by_email(&state.pool, &email)
        .await?
        .ok_or(ApiError::NotFound)?;

    if user.confirmed {
        return Ok(Json(MessageResponse {
            message: "Your email is already confirmed".to_string(),
        }));
    }

    match state.jwt_manager.issue_email_confirmation(&user.email) {
        Ok(token) => {
            let email_service = state.email.clone();
            let to = user.email.clone();
            let username = user.username.clone();
            let base_url = state.config.public_url.clone();
            tokio::spawn(async move {
                email_service
                    .send_confirmation(&to, &username, &base_url, &token)
                    .await;
            });
        }
        Err(e) => {
            tracing::error!(user_id = user.id, error = %e, "resend_confirmation: failed to issue token");
        }
    }

    Ok(Json(MessageResponse {
        message: "Check your email for confirmation.".to_string(),
    }))
}

/// Request a password-reset email.
///
/// Responds 404 for unknown emails; the existence leak is a deliberate,
/// documented trade-off.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<RequestEmail>,
) -> ApiResult<Json<MessageResponse>> {
    let email = req.email.trim().to_lowercase();

    let user = store::users::get_by_email(&state.pool, &email)
        .await?
        .ok_or(ApiError::NotFound)?;

    let token = state
        .jwt_manager
        .issue_password_reset(&user.email)
        .map_err(|e| {
            tracing::error!(user_id = user.id, error = %e, "forgot_password: failed to issue token");
            ApiError::Internal
        })?;

    let reset_url = format!(
        "{}/api/auth/reset-password?token={}",
        state.config.public_url, token
    );
    let email_service = state.email.clone();
    let to = user.email.clone();
    tokio::spawn(async move {
        email_service.send_reset_password(&to, &reset_url).await;
    });

    Ok(Json(MessageResponse {
        message: "Password reset email has been sent.".to_string(),
    }))
}

/// Reset the password from an emailed reset token
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let claims = state
        .jwt_manager
        .validate(&req.token, TokenScope::PasswordReset)
        .map_err(|_| ApiError::InvalidToken("Invalid password reset token".to_string()))?;

    validate_password(&req.password).map_err(|e| ApiError::Validation(e.to_string()))?;

    let user = store::users::get_by_email(&state.pool, &claims.sub)
        .await?
        .ok_or(ApiError::NotFound)?;

    let password_hash = hash_password(&req.password).map_err(|e| {
        tracing::error!(error = %e, "reset_password: password hashing failed");
        ApiError::Internal
    })?;

    store::users::update_password(&state.pool, user.id, &password_hash).await?;
    // Any live session predates the reset; revoke it
    store::users::update_refresh_token(&state.pool, user.id, None).await?;

    tracing::info!(user_id = user.id, "reset_password: password updated");

    Ok(Json(MessageResponse {
        message: "Password has been reset successfully.".to_string(),
    }))
}
