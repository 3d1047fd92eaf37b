//! Database-backed integration tests for the auth core and the owner-scoped
//! contact store.
//!
//! These run against a real PostgreSQL instance and are ignored unless one is
//! available: `DATABASE_URL=postgres://... cargo test -- --ignored`

use rolodex_api::auth::{hash_password, verify_password, JwtManager, TokenScope};
use rolodex_api::store::{contacts, contacts::ContactInput, users};
use rolodex_shared::db;
use rolodex_shared::types::User;
use sqlx::PgPool;
use std::time::{SystemTime, UNIX_EPOCH};
use time::{Date, Duration, OffsetDateTime};

async fn test_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let pool = db::create_pool(&url, 5).await.expect("Failed to create pool");
    db::run_migrations(&pool).await.expect("Failed to run migrations");
    pool
}

fn unique(tag: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    format!("{}-{}", tag, nanos)
}

async fn create_user(pool: &PgPool, tag: &str) -> User {
    let email = format!("{}@example.com", unique(tag));
    let hash = hash_password("integration-secret").expect("hash failed");
    users::create(pool, tag, &email, &hash)
        .await
        .expect("user creation failed")
}

fn contact_input(tag: &str, birthday: Option<Date>) -> ContactInput {
    ContactInput {
        first_name: format!("First{}", tag),
        last_name: format!("Last{}", tag),
        email: format!("{}@contacts.example.com", unique(tag)),
        phone_number: "+1-555-0100".to_string(),
        birthday,
        note: Some("met at the conference".to_string()),
    }
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn signup_login_authorize_roundtrip() {
    let pool = test_pool().await;
    let jwt = JwtManager::new("integration-secret-at-least-32-chars!", 15, 30);

    let user = create_user(&pool, "alice").await;

    // Duplicate signup with the same email must conflict
    let dup = users::create(&pool, "alice", &user.email, &user.password_hash).await;
    assert!(dup.is_err(), "duplicate email must violate the unique index");

    // Fresh accounts start unconfirmed; login must be refused until confirmed
    assert!(!user.confirmed);
    assert!(verify_password("integration-secret", &user.password_hash));

    users::confirm_email(&pool, &user.email).await.expect("confirm failed");
    let confirmed = users::get_by_email(&pool, &user.email)
        .await
        .expect("lookup failed")
        .expect("user must exist");
    assert!(confirmed.confirmed);

    // authorize: the access token resolves back to the same account
    let access = jwt.issue_access(&user.email).expect("issue failed");
    let claims = jwt
        .validate(&access, TokenScope::AccessToken)
        .expect("access token must validate");
    let resolved = users::get_by_email(&pool, &claims.sub)
        .await
        .expect("lookup failed")
        .expect("subject must resolve");
    assert_eq!(resolved.id, user.id);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn refresh_reuse_detection_nulls_the_slot() {
    let pool = test_pool().await;
    let jwt = JwtManager::new("integration-secret-at-least-32-chars!", 15, 30);

    let user = create_user(&pool, "rotator").await;

    let r1 = jwt.issue_refresh(&user.email).expect("issue failed");
    users::update_refresh_token(&pool, user.id, Some(&r1))
        .await
        .expect("slot write failed");

    // Legitimate rotation: R1 -> R2
    let r2 = jwt.issue_refresh(&user.email).expect("issue failed");
    assert!(users::swap_refresh_token(&pool, user.id, &r1, &r2)
        .await
        .expect("swap failed"));

    // Replay of R1 must fail the compare-and-swap...
    let r3 = jwt.issue_refresh(&user.email).expect("issue failed");
    assert!(!users::swap_refresh_token(&pool, user.id, &r1, &r3)
        .await
        .expect("swap failed"));

    // ...after which the slot is revoked, forcing a full re-login
    users::update_refresh_token(&pool, user.id, None)
        .await
        .expect("revoke failed");
    let revoked = users::get_by_email(&pool, &user.email)
        .await
        .expect("lookup failed")
        .expect("user must exist");
    assert_eq!(revoked.refresh_token, None);

    // Even the once-valid R2 is now dead
    let r4 = jwt.issue_refresh(&user.email).expect("issue failed");
    assert!(!users::swap_refresh_token(&pool, user.id, &r2, &r4)
        .await
        .expect("swap failed"));
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn ownership_isolation() {
    let pool = test_pool().await;

    let owner_a = create_user(&pool, "owner-a").await;
    let owner_b = create_user(&pool, "owner-b").await;

    let created = contacts::create(&pool, owner_a.id, &contact_input("iso", None))
        .await
        .expect("create failed");

    // Owner B can neither read, replace, delete, nor find A's contact
    assert!(contacts::get(&pool, owner_b.id, created.id)
        .await
        .expect("get failed")
        .is_none());
    assert!(contacts::update(&pool, owner_b.id, created.id, &contact_input("iso2", None))
        .await
        .expect("update failed")
        .is_none());
    assert!(contacts::delete(&pool, owner_b.id, created.id)
        .await
        .expect("delete failed")
        .is_none());
    let hits = contacts::search(&pool, owner_b.id, &created.email)
        .await
        .expect("search failed");
    assert!(hits.is_empty());

    // The record is untouched for its owner
    let still_there = contacts::get(&pool, owner_a.id, created.id)
        .await
        .expect("get failed")
        .expect("owner must still see the contact");
    assert_eq!(still_there.first_name, created.first_name);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn search_is_case_insensitive_substring() {
    let pool = test_pool().await;
    let owner = create_user(&pool, "searcher").await;

    let mut input = contact_input("case", None);
    let marker = unique("JohnDoe");
    input.email = format!("{}@X.com", marker);
    let created = contacts::create(&pool, owner.id, &input)
        .await
        .expect("create failed");

    let hits = contacts::search(&pool, owner.id, &marker.to_lowercase())
        .await
        .expect("search failed");
    assert!(hits.iter().any(|c| c.id == created.id));

    // LIKE metacharacters match literally, not as wildcards
    let none = contacts::search(&pool, owner.id, "%@X.com")
        .await
        .expect("search failed");
    assert!(none.is_empty());
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn update_replaces_every_field() {
    let pool = test_pool().await;
    let owner = create_user(&pool, "updater").await;

    let created = contacts::create(
        &pool,
        owner.id,
        &contact_input("full", Some(Date::from_ordinal_date(1990, 100).expect("valid date"))),
    )
    .await
    .expect("create failed");
    assert!(created.note.is_some());
    assert!(created.birthday.is_some());

    // A payload with unset optionals clears the stored values
    let mut replacement = contact_input("replaced", None);
    replacement.note = None;
    let updated = contacts::update(&pool, owner.id, created.id, &replacement)
        .await
        .expect("update failed")
        .expect("contact must exist");

    assert_eq!(updated.first_name, replacement.first_name);
    assert_eq!(updated.note, None);
    assert_eq!(updated.birthday, None);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn upcoming_birthdays_window() {
    let pool = test_pool().await;
    let owner = create_user(&pool, "birthdays").await;

    let today = OffsetDateTime::now_utc().date();
    // Year 2000 is a leap year, so today's month/day always exists in it
    let soon = Date::from_calendar_date(2000, today.month(), today.day()).expect("valid date");
    let far_date = today + Duration::days(60);
    let far = Date::from_calendar_date(2000, far_date.month(), far_date.day()).expect("valid date");

    let in_window = contacts::create(&pool, owner.id, &contact_input("soon", Some(soon)))
        .await
        .expect("create failed");
    let out_of_window = contacts::create(&pool, owner.id, &contact_input("far", Some(far)))
        .await
        .expect("create failed");

    let upcoming = contacts::upcoming_birthdays(&pool, owner.id)
        .await
        .expect("query failed");

    assert!(upcoming.iter().any(|c| c.id == in_window.id));
    assert!(!upcoming.iter().any(|c| c.id == out_of_window.id));
}
