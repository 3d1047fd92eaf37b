//! API routes

pub mod auth;
pub mod contacts;
pub mod health;
pub mod users;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{auth::require_auth, state::AppState};

/// Create all API routes
pub fn create_router(state: AppState) -> Router {
    // Health check routes (at root level for infrastructure monitoring)
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness));

    // Public API routes (no auth required)
    let public_api_routes = Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", get(auth::refresh))
        .route("/auth/confirm-email/:token", get(auth::confirm_email))
        .route("/auth/resend-confirmation", post(auth::resend_confirmation))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password", post(auth::reset_password));

    // Protected API routes (access token required)
    let protected_api_routes = Router::new()
        // User routes
        .route("/users/me", get(users::me))
        .route("/users/avatar", patch(users::update_avatar))
        // Contact routes
        .route("/contacts", get(contacts::list_contacts))
        .route("/contacts", post(contacts::create_contact))
        .route("/contacts/search", get(contacts::search_contacts))
        .route("/contacts/upcoming-birthdays", get(contacts::upcoming_birthdays))
        .route("/contacts/:contact_id", get(contacts::get_contact))
        .route("/contacts/:contact_id", put(contacts::update_contact))
        .route("/contacts/:contact_id", delete(contacts::delete_contact))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let api_routes = Router::new()
        .merge(public_api_routes)
        .merge(protected_api_routes);

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        // Global request body cap; avatar uploads are the largest payloads
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .with_state(state)
}
