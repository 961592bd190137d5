// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Platform adapters.
//!
//! Each platform speaks a different OAuth dialect:
//! - TikTok: plain authorization-code exchange, refresh with a refresh token
//! - YouTube: Google offline-access grant, no refresh path here
//! - Instagram: short-lived code exchange, upgraded to a long-lived token
//!   which is itself refreshed
//!
//! [`ProviderAdapter`] hides the differences behind one interface.

pub mod instagram;
pub mod tiktok;
pub mod youtube;

pub use instagram::InstagramAdapter;
pub use tiktok::TikTokAdapter;
pub use youtube::YouTubeAdapter;

use crate::error::AppError;
use crate::models::{Platform, RemoteContentItem, SocialConnection, TokenResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Default number of items fetched per sync.
pub const DEFAULT_MAX_ITEMS: u32 = 5;

/// Per-platform OAuth and content API operations.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn platform(&self) -> Platform;

    /// URL the user is sent to in order to grant access.
    fn authorize_url(&self, user_id: &str, redirect_uri: &str, issued_at: DateTime<Utc>)
        -> String;

    /// Exchange an authorization code for tokens.
    async fn exchange_code(&self, code: &str, redirect_uri: &str)
        -> Result<TokenResult, AppError>;

    /// Post-process the tokens from [`exchange_code`](Self::exchange_code)
    /// before they are used or stored.
    async fn finish_exchange(&self, token: TokenResult) -> Result<TokenResult, AppError> {
        Ok(token)
    }

    /// Refresh capability, if the platform has one.
    fn refresher(&self) -> Option<&dyn TokenRefresher> {
        None
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<serde_json::Value, AppError>;

    /// Latest items, newest first, at most `max_count`.
    async fn fetch_content_items(
        &self,
        access_token: &str,
        max_count: u32,
    ) -> Result<Vec<RemoteContentItem>, AppError>;
}

/// Token refresh for platforms that support it.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// The credential the refresh call consumes, taken from the stored
    /// connection. Defaults to the refresh token.
    fn refresh_credential<'a>(&self, connection: &'a SocialConnection) -> Option<&'a str> {
        connection.refresh_token.as_deref()
    }

    async fn refresh_token(&self, credential: &str) -> Result<TokenResult, AppError>;
}

/// Adapters keyed by platform.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    adapters: HashMap<Platform, Arc<dyn ProviderAdapter>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under its own platform, replacing any previous one.
    pub fn register(mut self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.adapters.insert(adapter.platform(), adapter);
        self
    }

    pub fn get(&self, platform: Platform) -> Result<Arc<dyn ProviderAdapter>, AppError> {
        self.adapters
            .get(&platform)
            .cloned()
            .ok_or_else(|| AppError::InvalidPlatform(platform.to_string()))
    }
}

/// Standard OAuth token response body.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct OAuthTokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

impl From<OAuthTokenResponse> for TokenResult {
    fn from(response: OAuthTokenResponse) -> Self {
        TokenResult {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_in: response.expires_in,
        }
    }
}

/// Check response status and parse the JSON body.
///
/// Non-success responses become [`AppError::RemoteApi`] carrying the
/// provider's body.
pub(crate) async fn check_response_json<T: for<'de> Deserialize<'de>>(
    platform: Platform,
    response: reqwest::Response,
) -> Result<T, AppError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(%platform, status = %status, "Provider API request failed");
        return Err(AppError::remote(
            platform,
            format!("HTTP {}: {}", status, body),
        ));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::remote(platform, format!("JSON parse error: {}", e)))
}

/// Map a transport failure to a remote API error.
pub(crate) fn request_error(platform: Platform, context: &str, err: reqwest::Error) -> AppError {
    AppError::remote(platform, format!("{} failed: {}", context, err))
}

/// Join scopes and percent-encode them for a query string.
pub(crate) fn encode_scopes(scopes: &[String], separator: &str) -> String {
    urlencoding::encode(&scopes.join(separator)).into_owned()
}
