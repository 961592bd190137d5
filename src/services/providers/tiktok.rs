// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! TikTok Login Kit and Display API.

use super::{
    check_response_json, encode_scopes, request_error, OAuthTokenResponse, ProviderAdapter,
    TokenRefresher,
};
use crate::config::ProviderConfig;
use crate::error::AppError;
use crate::models::{MediaKind, Platform, RemoteContentItem, TokenResult};
use crate::services::state_token::{self, AuthState};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

const PROFILE_FIELDS: &str = "open_id,display_name,avatar_url,follower_count";
const VIDEO_FIELDS: &str =
    "id,title,video_description,cover_image_url,share_url,like_count,view_count";

/// TikTok adapter: authorization-code grant with rotating refresh tokens.
#[derive(Clone)]
pub struct TikTokAdapter {
    http: reqwest::Client,
    config: ProviderConfig,
}

impl TikTokAdapter {
    pub fn new(config: ProviderConfig, http: reqwest::Client) -> Self {
        Self { http, config }
    }

    async fn post_token_form(
        &self,
        form: &[(&str, &str)],
        context: &str,
    ) -> Result<TokenResult, AppError> {
        let response = self
            .http
            .post(&self.config.token_url)
            .form(form)
            .send()
            .await
            .map_err(|e| request_error(Platform::TikTok, context, e))?;

        let token: OAuthTokenResponse = check_response_json(Platform::TikTok, response).await?;
        Ok(token.into())
    }
}

#[async_trait]
impl ProviderAdapter for TikTokAdapter {
    fn platform(&self) -> Platform {
        Platform::TikTok
    }

    fn authorize_url(
        &self,
        user_id: &str,
        redirect_uri: &str,
        issued_at: DateTime<Utc>,
    ) -> String {
        let state = state_token::encode(&AuthState::new(user_id, Platform::TikTok, issued_at));
        format!(
            "{}?client_key={}&scope={}&response_type=code&redirect_uri={}&state={}",
            self.config.authorize_url,
            urlencoding::encode(&self.config.client_id),
            encode_scopes(&self.config.scopes, ","),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&state)
        )
    }

    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenResult, AppError> {
        self.post_token_form(
            &[
                ("client_key", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
                ("redirect_uri", redirect_uri),
            ],
            "Token exchange",
        )
        .await
    }

    fn refresher(&self) -> Option<&dyn TokenRefresher> {
        Some(self)
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<serde_json::Value, AppError> {
        let url = format!("{}/user/info/", self.config.api_base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[("fields", PROFILE_FIELDS)])
            .send()
            .await
            .map_err(|e| request_error(Platform::TikTok, "Profile request", e))?;

        check_response_json(Platform::TikTok, response).await
    }

    async fn fetch_content_items(
        &self,
        access_token: &str,
        max_count: u32,
    ) -> Result<Vec<RemoteContentItem>, AppError> {
        let url = format!("{}/video/list/", self.config.api_base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .query(&[("fields", VIDEO_FIELDS)])
            .json(&serde_json::json!({ "max_count": max_count }))
            .send()
            .await
            .map_err(|e| request_error(Platform::TikTok, "Video list request", e))?;

        let body: VideoListResponse = check_response_json(Platform::TikTok, response).await?;
        let videos = body
            .data
            .and_then(|d| d.videos)
            .ok_or_else(|| AppError::remote(Platform::TikTok, "Failed to fetch videos"))?;

        Ok(videos
            .into_iter()
            .take(max_count as usize)
            .filter_map(TikTokVideo::into_item)
            .collect())
    }
}

#[async_trait]
impl TokenRefresher for TikTokAdapter {
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResult, AppError> {
        self.post_token_form(
            &[
                ("client_key", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ],
            "Token refresh",
        )
        .await
    }
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    data: Option<VideoListData>,
}

#[derive(Debug, Deserialize)]
struct VideoListData {
    #[serde(default)]
    videos: Option<Vec<TikTokVideo>>,
}

#[derive(Debug, Deserialize)]
struct TikTokVideo {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    cover_image_url: Option<String>,
    #[serde(default)]
    share_url: Option<String>,
}

impl TikTokVideo {
    fn into_item(self) -> Option<RemoteContentItem> {
        let Some(url) = self.share_url.filter(|u| !u.is_empty()) else {
            tracing::debug!(video_id = ?self.id, "TikTok video without share URL, skipping");
            return None;
        };
        Some(RemoteContentItem {
            external_url: url,
            title: self.title,
            thumbnail_url: self.cover_image_url,
            media_kind: MediaKind::Video,
        })
    }
}
