// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Social account linking and sync routes.

use crate::error::{AppError, Result};
use crate::models::{Link, Platform, RemoteContentItem};
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/social/connect", post(connect))
        .route("/api/social/callback", post(callback))
        .route("/api/social/sync", post(sync))
        .route("/api/social/disconnect", post(disconnect))
        .route("/api/social/youtube/latest", get(youtube_latest))
}

fn validate(request: &impl Validate) -> Result<()> {
    request
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

// ─── Connect ─────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    platform: String,
    #[validate(length(min = 1, max = 128))]
    user_id: String,
    #[validate(url)]
    redirect_uri: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ConnectResponse {
    pub authorize_url: String,
}

/// Start linking a platform: returns the provider's authorize URL.
async fn connect(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ConnectRequest>,
) -> Result<Json<ConnectResponse>> {
    // Unknown platforms are reported as such even when other fields are bad.
    request.platform.parse::<Platform>()?;
    validate(&request)?;

    let authorize_url =
        state
            .social
            .connect(&request.platform, &request.user_id, &request.redirect_uri)?;

    Ok(Json(ConnectResponse { authorize_url }))
}

// ─── Callback ────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CallbackRequest {
    #[validate(length(min = 1))]
    code: String,
    #[validate(length(min = 1))]
    state: String,
    #[validate(url)]
    redirect_uri: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackResponse {
    pub success: bool,
    pub platform: Platform,
    pub profile: serde_json::Value,
}

/// OAuth callback - exchange the code and store the connection.
async fn callback(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CallbackRequest>,
) -> Result<Json<CallbackResponse>> {
    validate(&request)?;

    let result = state
        .social
        .callback(&request.code, &request.state, &request.redirect_uri)
        .await?;

    Ok(Json(CallbackResponse {
        success: true,
        platform: result.platform,
        profile: result.profile,
    }))
}

// ─── Sync / Disconnect ───────────────────────────────────────

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserPlatformRequest {
    #[validate(length(min = 1, max = 128))]
    user_id: String,
    platform: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SyncResponse {
    pub success: bool,
    pub platform: Platform,
    pub synced_links: Vec<Link>,
}

/// Import the latest items from a connected platform.
async fn sync(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UserPlatformRequest>,
) -> Result<Json<SyncResponse>> {
    let platform: Platform = request.platform.parse()?;
    validate(&request)?;

    let result = state.social.sync(&request.user_id, platform).await?;

    Ok(Json(SyncResponse {
        success: true,
        platform: result.platform,
        synced_links: result.synced_links,
    }))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DisconnectResponse {
    pub success: bool,
}

/// Remove a connection. Synced links are kept.
async fn disconnect(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UserPlatformRequest>,
) -> Result<Json<DisconnectResponse>> {
    let platform: Platform = request.platform.parse()?;
    validate(&request)?;

    state.social.disconnect(&request.user_id, platform).await?;

    Ok(Json(DisconnectResponse { success: true }))
}

// ─── Public YouTube lookup ───────────────────────────────────

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LatestVideoParams {
    #[validate(url)]
    channel_url: String,
}

#[derive(Serialize)]
pub struct LatestVideoResponse {
    pub video: Option<RemoteContentItem>,
}

/// Latest video of a public YouTube channel (no account link needed).
async fn youtube_latest(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LatestVideoParams>,
) -> Result<Json<LatestVideoResponse>> {
    validate(&params)?;

    let video = state.youtube.latest_video_public(&params.channel_url).await?;

    Ok(Json(LatestVideoResponse { video }))
}
