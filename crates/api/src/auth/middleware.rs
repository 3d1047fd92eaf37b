//! Request authorization gate
//!
//! `require_auth` is the single authorization gate: it resolves the bearer
//! access token to a [`User`] and stores it in the request extensions for
//! handlers to pick up via `Extension<User>`.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use rolodex_shared::types::User;

use crate::{
    auth::jwt::TokenScope,
    error::ApiError,
    state::AppState,
    store,
};

/// Extract the bearer token from the Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
}

/// Require a valid access token and resolve the current user.
///
/// Every failure mode (missing header, bad signature, expired token, wrong
/// scope, unknown subject) collapses to the same 401; callers cannot
/// distinguish an invalid token from a non-existent account.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers()).ok_or(ApiError::Unauthorized)?;

    let claims = state
        .jwt_manager
        .validate(token, TokenScope::AccessToken)
        .map_err(|e| {
            tracing::debug!(error = %e, "Access token rejected");
            ApiError::Unauthorized
        })?;

    let user: User = store::users::get_by_email(&state.pool, &claims.sub)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn test_bearer_token_missing_or_malformed() {
        let headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwdw=="));
        assert_eq!(bearer_token(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }
}
