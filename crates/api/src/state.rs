//! Shared application state

use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    auth::JwtManager,
    config::Config,
    email::{EmailConfig, EmailService},
    media::MediaClient,
};

/// State shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub jwt_manager: JwtManager,
    pub email: EmailService,
    pub media: MediaClient,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config) -> Self {
        let jwt_manager = JwtManager::new(
            &config.jwt_secret,
            config.access_token_expire_minutes,
            config.reset_token_expire_minutes,
        );
        let email = EmailService::new(EmailConfig::from_config(&config));
        let media = MediaClient::new(&config);

        Self {
            pool,
            config: Arc::new(config),
            jwt_manager,
            email,
            media,
        }
    }
}
