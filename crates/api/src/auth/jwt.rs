//! JWT token issuance and validation
//!
//! One codec, four token purposes. Every token carries an explicit `scope`
//! claim and is accepted only where that scope is expected.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

/// JWT claims structure for Rolodex-issued tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user email)
    pub sub: String,
    /// Issued at
    pub iat: i64,
    /// Expiration
    pub exp: i64,
    /// Intended use of the token
    pub scope: TokenScope,
}

/// Intended use of a token, carried as an explicit claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenScope {
    AccessToken,
    RefreshToken,
    EmailConfirmation,
    PasswordReset,
}

/// JWT manager for token operations
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_expiry_minutes: i64,
    reset_expiry_minutes: i64,
}

// Refresh and confirmation tokens are long-lived by design; access and
// password-reset lifetimes come from configuration.
const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 7;
const EMAIL_TOKEN_EXPIRY_DAYS: i64 = 7;

impl JwtManager {
    /// Create a new JWT manager
    pub fn new(secret: &str, access_expiry_minutes: i64, reset_expiry_minutes: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_expiry_minutes,
            reset_expiry_minutes,
        }
    }

    fn issue(&self, subject: &str, scope: TokenScope, ttl: Duration) -> Result<String, JwtError> {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.unix_timestamp(),
            exp: (now + ttl).unix_timestamp(),
            scope,
        };

        // Explicit algorithm prevents algorithm confusion attacks
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::Encoding(e.to_string()))
    }

    /// Issue an access token for the given user email
    pub fn issue_access(&self, subject: &str) -> Result<String, JwtError> {
        self.issue(
            subject,
            TokenScope::AccessToken,
            Duration::minutes(self.access_expiry_minutes),
        )
    }

    /// Issue a refresh token for the given user email
    pub fn issue_refresh(&self, subject: &str) -> Result<String, JwtError> {
        self.issue(
            subject,
            TokenScope::RefreshToken,
            Duration::days(REFRESH_TOKEN_EXPIRY_DAYS),
        )
    }

    /// Issue an email-confirmation token for the given user email
    pub fn issue_email_confirmation(&self, subject: &str) -> Result<String, JwtError> {
        self.issue(
            subject,
            TokenScope::EmailConfirmation,
            Duration::days(EMAIL_TOKEN_EXPIRY_DAYS),
        )
    }

    /// Issue a password-reset token for the given user email.
    ///
    /// `exp` is the absolute instant `now + reset_expiry_minutes`; the token
    /// is valid for exactly the configured window.
    pub fn issue_password_reset(&self, subject: &str) -> Result<String, JwtError> {
        self.issue(
            subject,
            TokenScope::PasswordReset,
            Duration::minutes(self.reset_expiry_minutes),
        )
    }

    /// Validate a token and require the expected scope.
    ///
    /// The codec checks signature and expiry only; the scope check here is
    /// the single place token purpose is enforced.
    pub fn validate(&self, token: &str, expected: TokenScope) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // No clock-skew leeway: a token expired one second ago is expired
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidToken => JwtError::Invalid,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::Invalid,
                jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => JwtError::Invalid,
                _ => JwtError::Validation(e.to_string()),
            })?;

        if claims.scope != expected {
            return Err(JwtError::WrongScope);
        }
        Ok(claims)
    }

    /// Get access token expiry in seconds
    pub fn access_token_expiry_seconds(&self) -> i64 {
        self.access_expiry_minutes * 60
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Token has expired")]
    Expired,
    #[error("Invalid token")]
    Invalid,
    #[error("Wrong token scope")]
    WrongScope,
    #[error("Token encoding failed: {0}")]
    Encoding(String),
    #[error("Token validation failed: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> JwtManager {
        JwtManager::new("test-secret-key-at-least-32-chars!!", 15, 30)
    }

    #[test]
    fn test_issue_and_validate_roundtrip() {
        let jwt = manager();

        let token = jwt.issue_access("alice@example.com").expect("issue failed");
        let claims = jwt
            .validate(&token, TokenScope::AccessToken)
            .expect("validate failed");

        assert_eq!(claims.sub, "alice@example.com");
        assert_eq!(claims.scope, TokenScope::AccessToken);
        assert!(claims.exp > claims.iat);
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn test_access_and_refresh_scopes_are_disjoint() {
        let jwt = manager();

        let access = jwt.issue_access("alice@example.com").expect("issue failed");
        let refresh = jwt.issue_refresh("alice@example.com").expect("issue failed");

        let access_claims = jwt
            .validate(&access, TokenScope::AccessToken)
            .expect("access should validate as access");
        let refresh_claims = jwt
            .validate(&refresh, TokenScope::RefreshToken)
            .expect("refresh should validate as refresh");
        assert_ne!(access_claims.scope, refresh_claims.scope);

        // Neither is accepted where the other is required
        assert!(matches!(
            jwt.validate(&refresh, TokenScope::AccessToken),
            Err(JwtError::WrongScope)
        ));
        assert!(matches!(
            jwt.validate(&access, TokenScope::RefreshToken),
            Err(JwtError::WrongScope)
        ));
    }

    #[test]
    fn test_confirmation_and_reset_scopes_checked() {
        let jwt = manager();

        let confirm = jwt
            .issue_email_confirmation("bob@example.com")
            .expect("issue failed");
        let reset = jwt
            .issue_password_reset("bob@example.com")
            .expect("issue failed");

        assert!(jwt.validate(&confirm, TokenScope::EmailConfirmation).is_ok());
        assert!(jwt.validate(&reset, TokenScope::PasswordReset).is_ok());
        assert!(matches!(
            jwt.validate(&confirm, TokenScope::PasswordReset),
            Err(JwtError::WrongScope)
        ));
        assert!(matches!(
            jwt.validate(&reset, TokenScope::AccessToken),
            Err(JwtError::WrongScope)
        ));
    }

    #[test]
    fn test_expiry_boundary() {
        let jwt = manager();

        let expired = jwt
            .issue("carol@example.com", TokenScope::AccessToken, Duration::seconds(-1))
            .expect("issue failed");
        assert!(matches!(
            jwt.validate(&expired, TokenScope::AccessToken),
            Err(JwtError::Expired)
        ));

        let alive = jwt
            .issue("carol@example.com", TokenScope::AccessToken, Duration::seconds(1))
            .expect("issue failed");
        assert!(jwt.validate(&alive, TokenScope::AccessToken).is_ok());
    }

    #[test]
    fn test_reset_token_valid_for_configured_window() {
        // Regression: the reset token must carry an absolute expiry of
        // now + configured minutes, not a bare duration
        let jwt = JwtManager::new("test-secret-key-at-least-32-chars!!", 15, 45);

        let token = jwt
            .issue_password_reset("dave@example.com")
            .expect("issue failed");
        let claims = jwt
            .validate(&token, TokenScope::PasswordReset)
            .expect("freshly issued reset token must validate");

        assert_eq!(claims.exp - claims.iat, 45 * 60);
        let now = OffsetDateTime::now_utc().unix_timestamp();
        assert!(claims.exp > now);
    }

    #[test]
    fn test_garbage_and_wrong_key_rejected() {
        let jwt = manager();

        assert!(jwt.validate("not-a-token", TokenScope::AccessToken).is_err());

        let other = JwtManager::new("another-secret-key-at-least-32-chars", 15, 30);
        let token = other.issue_access("eve@example.com").expect("issue failed");
        assert!(jwt.validate(&token, TokenScope::AccessToken).is_err());
    }

    #[test]
    fn test_scope_claim_wire_format() {
        let json = serde_json::to_string(&TokenScope::AccessToken).expect("serialize");
        assert_eq!(json, "\"access_token\"");
        let json = serde_json::to_string(&TokenScope::RefreshToken).expect("serialize");
        assert_eq!(json, "\"refresh_token\"");
    }
}
