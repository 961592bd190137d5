// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Social Sync: link TikTok, YouTube and Instagram accounts to a profile
//!
//! This crate provides the backend API that connects a user's accounts on
//! external content platforms and imports their latest videos and posts as
//! profile links, without ever importing the same URL twice.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::{ConnectionStore, LinkStore};
use error::AppError;
use services::{
    InstagramAdapter, ProviderRegistry, SocialService, SyncEngine, TikTokAdapter, YouTubeAdapter,
};
use std::sync::Arc;
use time_utils::Clock;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub social: SocialService,
    /// Also registered in `social`; kept concrete for public channel lookups.
    pub youtube: Arc<YouTubeAdapter>,
}

impl AppState {
    /// Wire the platform adapters and services on top of the given stores.
    pub fn build(
        config: Config,
        connections: Arc<dyn ConnectionStore>,
        links: Arc<dyn LinkStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HTTP client init failed: {}", e)))?;

        let youtube = Arc::new(
            YouTubeAdapter::new(config.youtube.clone(), http.clone())
                .with_api_key(config.youtube_api_key.clone()),
        );

        let providers = ProviderRegistry::new()
            .register(Arc::new(TikTokAdapter::new(
                config.tiktok.clone(),
                http.clone(),
            )))
            .register(youtube.clone())
            .register(Arc::new(InstagramAdapter::new(
                config.instagram.clone(),
                http,
            )));

        let sync = SyncEngine::new(links, clock.clone()).with_max_items(config.sync_max_items);
        let social = SocialService::new(providers, connections, sync, clock);

        Ok(Self {
            config,
            social,
            youtube,
        })
    }
}
