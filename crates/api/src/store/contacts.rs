//! Owner-scoped contact persistence
//!
//! Every query predicate includes the owner-id equality clause; cross-owner
//! access is impossible at the query boundary, not filtered after the fact.

use rolodex_shared::types::Contact;
use serde::Deserialize;
use sqlx::PgPool;
use time::{Date, Month, OffsetDateTime};

/// Contact fields as supplied by the caller (create and full-replace update)
#[derive(Debug, Clone, Deserialize)]
pub struct ContactInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub birthday: Option<Date>,
    pub note: Option<String>,
}

const DEFAULT_PAGE_SIZE: i64 = 100;
const MAX_PAGE_SIZE: i64 = 500;

/// List the owner's contacts, paginated.
///
/// Out-of-range paging values are clamped: skip to >= 0, limit to 1..=500.
pub async fn list(
    pool: &PgPool,
    owner_id: i64,
    skip: Option<i64>,
    limit: Option<i64>,
) -> Result<Vec<Contact>, sqlx::Error> {
    let skip = skip.unwrap_or(0).max(0);
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

    sqlx::query_as(
        r#"
        SELECT id, first_name, last_name, email, phone_number, birthday, note, user_id, created_at
        FROM contacts
        WHERE user_id = $1
        ORDER BY id
        OFFSET $2 LIMIT $3
        "#,
    )
    .bind(owner_id)
    .bind(skip)
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Fetch one of the owner's contacts by id
pub async fn get(pool: &PgPool, owner_id: i64, id: i64) -> Result<Option<Contact>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT id, first_name, last_name, email, phone_number, birthday, note, user_id, created_at
        FROM contacts
        WHERE id = $2 AND user_id = $1
        "#,
    )
    .bind(owner_id)
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Insert a contact owned by `owner_id`.
///
/// The owner always comes from the authenticated session; a client-supplied
/// owner field does not exist in [`ContactInput`].
pub async fn create(
    pool: &PgPool,
    owner_id: i64,
    input: &ContactInput,
) -> Result<Contact, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO contacts (first_name, last_name, email, phone_number, birthday, note, user_id)
        VALUES ($2, $3, $4, $5, $6, $7, $1)
        RETURNING id, first_name, last_name, email, phone_number, birthday, note, user_id, created_at
        "#,
    )
    .bind(owner_id)
    .bind(&input.first_name)
    .bind(&input.last_name)
    .bind(&input.email)
    .bind(&input.phone_number)
    .bind(input.birthday)
    .bind(&input.note)
    .fetch_one(pool)
    .await
}

/// Full-field replace of one of the owner's contacts.
///
/// Every column is overwritten from the payload, including optional fields
/// the caller left unset (they become NULL).
pub async fn update(
    pool: &PgPool,
    owner_id: i64,
    id: i64,
    input: &ContactInput,
) -> Result<Option<Contact>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE contacts
        SET first_name = $3, last_name = $4, email = $5,
            phone_number = $6, birthday = $7, note = $8
        WHERE id = $2 AND user_id = $1
        RETURNING id, first_name, last_name, email, phone_number, birthday, note, user_id, created_at
        "#,
    )
    .bind(owner_id)
    .bind(id)
    .bind(&input.first_name)
    .bind(&input.last_name)
    .bind(&input.email)
    .bind(&input.phone_number)
    .bind(input.birthday)
    .bind(&input.note)
    .fetch_optional(pool)
    .await
}

/// Delete one of the owner's contacts, returning the removed record
pub async fn delete(pool: &PgPool, owner_id: i64, id: i64) -> Result<Option<Contact>, sqlx::Error> {
    sqlx::query_as(
        r#"
        DELETE FROM contacts
        WHERE id = $2 AND user_id = $1
        RETURNING id, first_name, last_name, email, phone_number, birthday, note, user_id, created_at
        "#,
    )
    .bind(owner_id)
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Case-insensitive substring search over first name, last name, and email
pub async fn search(
    pool: &PgPool,
    owner_id: i64,
    query: &str,
) -> Result<Vec<Contact>, sqlx::Error> {
    let pattern = format!("%{}%", escape_like(query));

    sqlx::query_as(
        r#"
        SELECT id, first_name, last_name, email, phone_number, birthday, note, user_id, created_at
        FROM contacts
        WHERE user_id = $1
          AND (first_name ILIKE $2 OR last_name ILIKE $2 OR email ILIKE $2)
        ORDER BY id
        "#,
    )
    .bind(owner_id)
    .bind(pattern)
    .fetch_all(pool)
    .await
}

/// Contacts whose next birthday occurrence falls within the coming week
/// (today through today + 7 days, inclusive)
pub async fn upcoming_birthdays(pool: &PgPool, owner_id: i64) -> Result<Vec<Contact>, sqlx::Error> {
    let today = OffsetDateTime::now_utc().date();

    let contacts: Vec<Contact> = sqlx::query_as(
        r#"
        SELECT id, first_name, last_name, email, phone_number, birthday, note, user_id, created_at
        FROM contacts
        WHERE user_id = $1 AND birthday IS NOT NULL
        ORDER BY id
        "#,
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    Ok(contacts
        .into_iter()
        .filter(|c| matches!(c.birthday, Some(b) if birthday_in_window(b, today)))
        .collect())
}

/// Escape LIKE metacharacters so user input matches as a literal substring
fn escape_like(query: &str) -> String {
    query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Whether the next occurrence of `birthday` falls within `[today, today+7]`.
///
/// Birthdays recur annually, so only month and day are compared; the year a
/// contact was born in is irrelevant. A Feb 29 birthday observes Feb 28 in
/// non-leap years.
fn birthday_in_window(birthday: Date, today: Date) -> bool {
    let next = match occurrence_in_year(birthday, today.year()) {
        Some(d) if d >= today => d,
        _ => match occurrence_in_year(birthday, today.year() + 1) {
            Some(d) => d,
            None => return false,
        },
    };
    (next - today).whole_days() <= 7
}

/// The date the birthday is observed in `year` (Feb 29 falls back to Feb 28)
fn occurrence_in_year(birthday: Date, year: i32) -> Option<Date> {
    Date::from_calendar_date(year, birthday.month(), birthday.day())
        .or_else(|_| Date::from_calendar_date(year, Month::February, 28))
        .ok()
}
