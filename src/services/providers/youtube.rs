// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! YouTube via Google OAuth (offline access) and the YouTube Data API v3.
//!
//! The offline grant returns a Google refresh token, but this adapter does
//! not refresh; see DESIGN.md.

use super::{check_response_json, encode_scopes, request_error, OAuthTokenResponse, ProviderAdapter};
use crate::config::ProviderConfig;
use crate::error::AppError;
use crate::models::{MediaKind, Platform, RemoteContentItem, TokenResult};
use crate::services::state_token::{self, AuthState};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

/// YouTube adapter.
#[derive(Clone)]
pub struct YouTubeAdapter {
    http: reqwest::Client,
    config: ProviderConfig,
    api_key: Option<String>,
}

impl YouTubeAdapter {
    pub fn new(config: ProviderConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            config,
            api_key: None,
        }
    }

    /// Enable the unauthenticated lookups in [`latest_video_public`](Self::latest_video_public).
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Channels owned by the token's user (`mine=true`).
    async fn get_channels(&self, access_token: &str) -> Result<serde_json::Value, AppError> {
        let url = format!("{}/channels", self.config.api_base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[("part", "snippet,statistics"), ("mine", "true")])
            .send()
            .await
            .map_err(|e| request_error(Platform::YouTube, "Channel request", e))?;

        check_response_json(Platform::YouTube, response).await
    }

    /// Most recent video of a public channel, without user authorization.
    ///
    /// Accepts `.../channel/{id}` and `.../@handle` URLs. Handles are
    /// resolved through channel search.
    pub async fn latest_video_public(
        &self,
        channel_url: &str,
    ) -> Result<Option<RemoteContentItem>, AppError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("YouTube API key not configured".to_string()))?;

        let channel_id = match parse_channel_url(channel_url) {
            Some(ChannelRef::Id(id)) => id,
            Some(ChannelRef::Handle(handle)) => self
                .resolve_handle(&handle, api_key)
                .await?
                .ok_or(AppError::ChannelNotFound)?,
            None => return Err(AppError::ChannelNotFound),
        };

        let url = format!("{}/search", self.config.api_base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("part", "snippet"),
                ("channelId", channel_id.as_str()),
                ("order", "date"),
                ("type", "video"),
                ("maxResults", "1"),
                ("key", api_key),
            ])
            .send()
            .await
            .map_err(|e| request_error(Platform::YouTube, "Public search request", e))?;

        let body: SearchResponse = check_response_json(Platform::YouTube, response).await?;
        Ok(body.items.into_iter().find_map(SearchItem::into_item))
    }

    async fn resolve_handle(&self, handle: &str, api_key: &str) -> Result<Option<String>, AppError> {
        let url = format!("{}/search", self.config.api_base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("part", "snippet"),
                ("q", handle),
                ("type", "channel"),
                ("key", api_key),
            ])
            .send()
            .await
            .map_err(|e| request_error(Platform::YouTube, "Channel search request", e))?;

        let body: SearchResponse = check_response_json(Platform::YouTube, response).await?;
        Ok(body
            .items
            .into_iter()
            .find_map(|item| item.snippet.and_then(|s| s.channel_id)))
    }
}

#[async_trait]
impl ProviderAdapter for YouTubeAdapter {
    fn platform(&self) -> Platform {
        Platform::YouTube
    }

    fn authorize_url(
        &self,
        user_id: &str,
        redirect_uri: &str,
        issued_at: DateTime<Utc>,
    ) -> String {
        let state = state_token::encode(&AuthState::new(user_id, Platform::YouTube, issued_at));
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&state={}",
            self.config.authorize_url,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(redirect_uri),
            encode_scopes(&self.config.scopes, " "),
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
                ("code", code),
                ("grant_type", "authorization_code"),
                ("redirect_uri", redirect_uri),
            ])
            .send()
            .await
            .map_err(|e| request_error(Platform::YouTube, "Token exchange", e))?;

        let token: OAuthTokenResponse = check_response_json(Platform::YouTube, response).await?;
        Ok(token.into())
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<serde_json::Value, AppError> {
        self.get_channels(access_token).await
    }

    async fn fetch_content_items(
        &self,
        access_token: &str,
        max_count: u32,
    ) -> Result<Vec<RemoteContentItem>, AppError> {
        let channels: ChannelListResponse =
            serde_json::from_value(self.get_channels(access_token).await?).map_err(|e| {
                AppError::remote(Platform::YouTube, format!("JSON parse error: {}", e))
            })?;

        let channel_id = channels
            .items
            .into_iter()
            .next()
            .map(|c| c.id)
            .ok_or(AppError::ChannelNotFound)?;

        let url = format!("{}/search", self.config.api_base_url);
        let max_results = max_count.to_string();
        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("part", "snippet"),
                ("channelId", channel_id.as_str()),
                ("order", "date"),
                ("type", "video"),
                ("maxResults", max_results.as_str()),
            ])
            .send()
            .await
            .map_err(|e| request_error(Platform::YouTube, "Video search request", e))?;

        let body: SearchResponse = check_response_json(Platform::YouTube, response).await?;
        Ok(body
            .items
            .into_iter()
            .take(max_count as usize)
            .filter_map(SearchItem::into_item)
            .collect())
    }
}

/// Channel reference extracted from a channel URL.
#[derive(Debug, PartialEq, Eq)]
enum ChannelRef {
    Id(String),
    Handle(String),
}

fn parse_channel_url(channel_url: &str) -> Option<ChannelRef> {
    let first_segment = |rest: &str| {
        rest.split(['/', '?', '#'])
            .next()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    if let Some((_, rest)) = channel_url.split_once("/channel/") {
        first_segment(rest).map(ChannelRef::Id)
    } else if let Some((_, rest)) = channel_url.split_once("/@") {
        first_segment(rest).map(ChannelRef::Handle)
    } else {
        None
    }
}

#[derive(Debug, Deserialize)]
struct ChannelListResponse {
    #[serde(default)]
    items: Vec<Channel>,
}

#[derive(Debug, Deserialize)]
struct Channel {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    id: Option<SearchItemId>,
    #[serde(default)]
    snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    #[serde(default)]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    channel_id: Option<String>,
    #[serde(default)]
    thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    #[serde(default)]
    high: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

impl SearchItem {
    fn into_item(self) -> Option<RemoteContentItem> {
        let video_id = self.id.and_then(|id| id.video_id)?;
        let snippet = self.snippet;
        Some(RemoteContentItem {
            external_url: format!("{}{}", WATCH_URL, video_id),
            title: snippet.as_ref().and_then(|s| s.title.clone()),
            thumbnail_url: snippet
                .and_then(|s| s.thumbnails)
                .and_then(|t| t.high)
                .map(|t| t.url),
            media_kind: MediaKind::Video,
        })
    }
}
