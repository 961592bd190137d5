// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Each platform gets an explicit [`ProviderConfig`]; endpoints default to
//! the production URLs and can be overridden to point at a mock server.

use std::env;
use std::time::Duration;

/// OAuth client settings and endpoints for one platform.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// OAuth client identifier (TikTok calls it the client key)
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Scopes requested at authorization
    pub scopes: Vec<String>,
    /// Browser-facing authorization endpoint
    pub authorize_url: String,
    /// Code exchange endpoint
    pub token_url: String,
    /// Base URL of the content API (no trailing slash)
    pub api_base_url: String,
}

impl ProviderConfig {
    pub fn tiktok(client_key: String, client_secret: String) -> Self {
        Self {
            client_id: client_key,
            client_secret,
            scopes: vec!["user.info.basic".to_string(), "video.list".to_string()],
            authorize_url: "https://www.tiktok.com/v2/auth/authorize/".to_string(),
            token_url: "https://open.tiktokapis.com/v2/oauth/token/".to_string(),
            api_base_url: "https://open.tiktokapis.com/v2".to_string(),
        }
    }

    pub fn youtube(client_id: String, client_secret: String) -> Self {
        Self {
            client_id,
            client_secret,
            scopes: vec!["https://www.googleapis.com/auth/youtube.readonly".to_string()],
            authorize_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            api_base_url: "https://www.googleapis.com/youtube/v3".to_string(),
        }
    }

    /// Instagram Basic Display. The API base also serves the long-lived
    /// token exchange and refresh.
    pub fn instagram(client_id: String, client_secret: String) -> Self {
        Self {
            client_id,
            client_secret,
            scopes: vec!["user_profile".to_string(), "user_media".to_string()],
            authorize_url: "https://api.instagram.com/oauth/authorize".to_string(),
            token_url: "https://api.instagram.com/oauth/access_token".to_string(),
            api_base_url: "https://graph.instagram.com".to_string(),
        }
    }

    /// Point every endpoint at `base_url` (used with mock servers).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        self.authorize_url = format!("{}/oauth/authorize", base);
        self.token_url = format!("{}/oauth/token", base);
        self.api_base_url = base.to_string();
        self
    }
}

/// Which persistence backend the server uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    Memory,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub tiktok: ProviderConfig,
    pub youtube: ProviderConfig,
    pub instagram: ProviderConfig,
    /// YouTube Data API key for unauthenticated channel lookups
    pub youtube_api_key: Option<String>,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Items fetched per sync
    pub sync_max_items: u32,
    /// Timeout applied to every outbound provider request
    pub http_timeout: Duration,
    pub store_backend: StoreBackend,
}

impl Config {
    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            tiktok: ProviderConfig::tiktok("test_tiktok_key".to_string(), "test_secret".to_string()),
            youtube: ProviderConfig::youtube(
                "test_google_id".to_string(),
                "test_secret".to_string(),
            ),
            instagram: ProviderConfig::instagram(
                "test_instagram_id".to_string(),
                "test_secret".to_string(),
            ),
            youtube_api_key: None,
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            sync_max_items: crate::services::providers::DEFAULT_MAX_ITEMS,
            http_timeout: Duration::from_secs(5),
            store_backend: StoreBackend::Memory,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let store_backend = match env::var("STORE_BACKEND").as_deref() {
            Ok("memory") => StoreBackend::Memory,
            Ok("firestore") | Err(_) => StoreBackend::Firestore,
            Ok(_) => return Err(ConfigError::Invalid("STORE_BACKEND")),
        };

        Ok(Self {
            tiktok: ProviderConfig::tiktok(
                required("TIKTOK_CLIENT_KEY")?,
                required("TIKTOK_CLIENT_SECRET")?,
            ),
            youtube: ProviderConfig::youtube(
                required("GOOGLE_CLIENT_ID")?,
                required("GOOGLE_CLIENT_SECRET")?,
            ),
            instagram: ProviderConfig::instagram(
                required("INSTAGRAM_CLIENT_ID")?,
                required("INSTAGRAM_CLIENT_SECRET")?,
            ),
            youtube_api_key: env::var("YOUTUBE_API_KEY")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: parsed_or("PORT", 8080)?,
            sync_max_items: parsed_or("SYNC_MAX_ITEMS", crate::services::providers::DEFAULT_MAX_ITEMS)?,
            http_timeout: Duration::from_secs(parsed_or("HTTP_TIMEOUT_SECS", 30)?),
            store_backend,
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .map(|v| v.trim().to_string())
        .map_err(|_| ConfigError::Missing(name))
}

fn parsed_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
