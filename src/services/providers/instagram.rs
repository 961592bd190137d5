// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Instagram Basic Display API.
//!
//! The code exchange yields a short-lived token (about an hour). It is
//! immediately traded for a long-lived token, which is what gets stored
//! and later refreshed.

use super::{
    check_response_json, encode_scopes, request_error, OAuthTokenResponse, ProviderAdapter,
    TokenRefresher,
};
use crate::config::ProviderConfig;
use crate::error::AppError;
use crate::models::{MediaKind, Platform, RemoteContentItem, SocialConnection, TokenResult};
use crate::services::state_token::{self, AuthState};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

const PROFILE_FIELDS: &str = "id,username,account_type,media_count";
const MEDIA_FIELDS: &str = "id,caption,media_type,media_url,permalink,thumbnail_url,timestamp";

/// Instagram adapter.
#[derive(Clone)]
pub struct InstagramAdapter {
    http: reqwest::Client,
    config: ProviderConfig,
}

impl InstagramAdapter {
    pub fn new(config: ProviderConfig, http: reqwest::Client) -> Self {
        Self { http, config }
    }

    /// Trade a short-lived token for a long-lived one.
    pub async fn upgrade_to_long_lived_token(
        &self,
        short_lived_token: &str,
    ) -> Result<TokenResult, AppError> {
        let url = format!("{}/access_token", self.config.api_base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("grant_type", "ig_exchange_token"),
                ("client_secret", self.config.client_secret.as_str()),
                ("access_token", short_lived_token),
            ])
            .send()
            .await
            .map_err(|e| request_error(Platform::Instagram, "Long-lived token exchange", e))?;

        let token: OAuthTokenResponse =
            check_response_json(Platform::Instagram, response).await?;
        Ok(token.into())
    }
}

#[async_trait]
impl ProviderAdapter for InstagramAdapter {
    fn platform(&self) -> Platform {
        Platform::Instagram
    }

    fn authorize_url(
        &self,
        user_id: &str,
        redirect_uri: &str,
        issued_at: DateTime<Utc>,
    ) -> String {
        let state =
            state_token::encode(&AuthState::new(user_id, Platform::Instagram, issued_at));
        format!(
            "{}?client_id={}&redirect_uri={}&scope={}&response_type=code&state={}",
            self.config.authorize_url,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(redirect_uri),
            encode_scopes(&self.config.scopes, ","),
            urlencoding::encode(&state)
        )
    }

    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenResult, AppError> {
        let response = self
            .http
            .post(&self.config.token_url)
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("grant_type", "authorization_code"),
                ("redirect_uri", redirect_uri),
                ("code", code),
            ])
            .send()
            .await
            .map_err(|e| request_error(Platform::Instagram, "Token exchange", e))?;

        let token: OAuthTokenResponse =
            check_response_json(Platform::Instagram, response).await?;
        Ok(token.into())
    }

    async fn finish_exchange(&self, token: TokenResult) -> Result<TokenResult, AppError> {
        self.upgrade_to_long_lived_token(&token.access_token).await
    }

    fn refresher(&self) -> Option<&dyn TokenRefresher> {
        Some(self)
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<serde_json::Value, AppError> {
        let url = format!("{}/me", self.config.api_base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("fields", PROFILE_FIELDS), ("access_token", access_token)])
            .send()
            .await
            .map_err(|e| request_error(Platform::Instagram, "Profile request", e))?;

        check_response_json(Platform::Instagram, response).await
    }

    async fn fetch_content_items(
        &self,
        access_token: &str,
        max_count: u32,
    ) -> Result<Vec<RemoteContentItem>, AppError> {
        let url = format!("{}/me/media", self.config.api_base_url);
        let limit = max_count.to_string();
        let response = self
            .http
            .get(&url)
            .query(&[
                ("fields", MEDIA_FIELDS),
                ("limit", limit.as_str()),
                ("access_token", access_token),
            ])
            .send()
            .await
            .map_err(|e| request_error(Platform::Instagram, "Media request", e))?;

        let body: MediaResponse = check_response_json(Platform::Instagram, response).await?;
        let media = body
            .data
            .ok_or_else(|| AppError::remote(Platform::Instagram, "Failed to fetch media"))?;

        Ok(media
            .into_iter()
            .take(max_count as usize)
            .filter_map(InstagramMedia::into_item)
            .collect())
    }
}

#[async_trait]
impl TokenRefresher for InstagramAdapter {
    /// Long-lived tokens refresh themselves; there is no separate refresh token.
    fn refresh_credential<'a>(&self, connection: &'a SocialConnection) -> Option<&'a str> {
        Some(connection.access_token.as_str())
    }

    async fn refresh_token(&self, long_lived_token: &str) -> Result<TokenResult, AppError> {
        let url = format!("{}/refresh_access_token", self.config.api_base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("grant_type", "ig_refresh_token"),
                ("access_token", long_lived_token),
            ])
            .send()
            .await
            .map_err(|e| request_error(Platform::Instagram, "Token refresh", e))?;

        let token: OAuthTokenResponse =
            check_response_json(Platform::Instagram, response).await?;
        Ok(token.into())
    }
}

#[derive(Debug, Deserialize)]
struct MediaResponse {
    #[serde(default)]
    data: Option<Vec<InstagramMedia>>,
}

#[derive(Debug, Deserialize)]
struct InstagramMedia {
    #[serde(default)]
    caption: Option<String>,
    #[serde(default)]
    media_type: Option<String>,
    #[serde(default)]
    media_url: Option<String>,
    #[serde(default)]
    permalink: Option<String>,
    #[serde(default)]
    thumbnail_url: Option<String>,
}

impl InstagramMedia {
    fn into_item(self) -> Option<RemoteContentItem> {
        let url = self.permalink.filter(|p| !p.is_empty())?;
        let media_kind = match self.media_type.as_deref() {
            Some("VIDEO") => MediaKind::Video,
            Some("CAROUSEL_ALBUM") => MediaKind::CarouselAlbum,
            _ => MediaKind::Image,
        };
        // Videos expose a still frame separately; images are their own thumbnail.
        let thumbnail_url = match media_kind {
            MediaKind::Video => self.thumbnail_url,
            _ => self.media_url,
        };
        Some(RemoteContentItem {
            external_url: url,
            title: self.caption,
            thumbnail_url,
            media_kind,
        })
    }
}
