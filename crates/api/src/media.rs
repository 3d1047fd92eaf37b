//! Avatar hosting
//!
//! Uploads avatar images to Cloudinary's unsigned-upload endpoint, keyed by
//! username so re-uploads overwrite the previous avatar, and returns the
//! stable display URL.

use serde::Deserialize;

use crate::config::Config;

/// Avatar host client
#[derive(Clone)]
pub struct MediaClient {
    upload_url: String,
    upload_preset: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

impl MediaClient {
    /// Create a client from application configuration
    pub fn new(config: &Config) -> Self {
        Self::with_upload_url(
            format!(
                "https://api.cloudinary.com/v1_1/{}/image/upload",
                config.cloudinary_cloud_name
            ),
            config.cloudinary_upload_preset.clone(),
        )
    }

    /// Create a client against an explicit upload endpoint
    pub fn with_upload_url(upload_url: String, upload_preset: String) -> Self {
        Self {
            upload_url,
            upload_preset,
            client: reqwest::Client::new(),
        }
    }

    /// Check if avatar uploads are configured
    pub fn is_enabled(&self) -> bool {
        !self.upload_preset.is_empty()
    }

    /// Upload an avatar image keyed by username; returns the display URL
    pub async fn upload_avatar(&self, username: &str, bytes: Vec<u8>) -> Result<String, MediaError> {
        if !self.is_enabled() {
            return Err(MediaError::NotConfigured);
        }

        let part = reqwest::multipart::Part::bytes(bytes).file_name("avatar");
        let form = reqwest::multipart::Form::new()
            .text("upload_preset", self.upload_preset.clone())
            .text("public_id", format!("avatars/{}", username))
            .part("file", part);

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| MediaError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Avatar upload rejected");
            return Err(MediaError::Upstream(status.as_u16()));
        }

        let parsed: UploadResponse = response
            .json()
            .await
            .map_err(|e| MediaError::Transport(e.to_string()))?;

        Ok(parsed.secure_url)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Avatar hosting is not configured")]
    NotConfigured,
    #[error("Avatar upload failed: {0}")]
    Transport(String),
    #[error("Avatar host returned status {0}")]
    Upstream(u16),
}
