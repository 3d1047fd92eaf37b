//! User persistence: lookups, account mutation, and the refresh-token slot

use rolodex_shared::types::User;
use sha2::{Digest, Sha256};
use sqlx::PgPool;

/// Build a Gravatar URL for a new account's initial avatar.
///
/// Gravatar addresses are keyed by the SHA-256 digest of the trimmed,
/// lowercased email.
pub fn gravatar_url(email: &str) -> String {
    let normalized = email.trim().to_lowercase();
    let digest = Sha256::digest(normalized.as_bytes());
    format!(
        "https://www.gravatar.com/avatar/{}?d=identicon",
        hex::encode(digest)
    )
}

/// Look up a user by email
pub async fn get_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT id, username, email, password_hash, avatar, refresh_token, confirmed, created_at
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await
}

/// Create a user with an unconfirmed email and a Gravatar-derived avatar
pub async fn create(
    pool: &PgPool,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<User, sqlx::Error> {
    let avatar = gravatar_url(email);

    sqlx::query_as(
        r#"
        INSERT INTO users (username, email, password_hash, avatar)
        VALUES ($1, $2, $3, $4)
        RETURNING id, username, email, password_hash, avatar, refresh_token, confirmed, created_at
        "#,
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(avatar)
    .fetch_one(pool)
    .await
}

/// Overwrite the user's refresh-token slot; `None` revokes the session
pub async fn update_refresh_token(
    pool: &PgPool,
    user_id: i64,
    token: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET refresh_token = $2 WHERE id = $1")
        .bind(user_id)
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}

/// Atomically rotate the refresh-token slot from `presented` to `new_token`.
///
/// The compare and the overwrite are one statement, so two concurrent
/// refresh calls cannot both pass the compare against the same stale value.
/// Returns `false` when the stored slot did not match `presented`.
pub async fn swap_refresh_token(
    pool: &PgPool,
    user_id: i64,
    presented: &str,
    new_token: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE users SET refresh_token = $3 WHERE id = $1 AND refresh_token = $2",
    )
    .bind(user_id)
    .bind(presented)
    .bind(new_token)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Mark the user's email as confirmed
pub async fn confirm_email(pool: &PgPool, email: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET confirmed = TRUE WHERE email = $1")
        .bind(email)
        .execute(pool)
        .await?;
    Ok(())
}

/// Replace the user's avatar URL
pub async fn update_avatar(pool: &PgPool, email: &str, url: &str) -> Result<User, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE users SET avatar = $2
        WHERE email = $1
        RETURNING id, username, email, password_hash, avatar, refresh_token, confirmed, created_at
        "#,
    )
    .bind(email)
    .bind(url)
    .fetch_one(pool)
    .await
}

/// Replace the user's password hash
pub async fn update_password(
    pool: &PgPool,
    user_id: i64,
    password_hash: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
        .bind(user_id)
        .bind(password_hash)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gravatar_url_normalizes_email() {
        let a = gravatar_url("Alice@Example.com ");
        let b = gravatar_url("alice@example.com");
        assert_eq!(a, b);
    }

    #[test]
    fn test_gravatar_url_shape() {
        let url = gravatar_url("alice@example.com");
        assert!(url.starts_with("https://www.gravatar.com/avatar/"));
        assert!(url.ends_with("?d=identicon"));
        // SHA-256 digests are 64 hex characters
        let digest = url
            .trim_start_matches("https://www.gravatar.com/avatar/")
            .trim_end_matches("?d=identicon");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
