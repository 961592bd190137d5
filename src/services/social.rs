// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account linking and sync operations.
//!
//! [`SocialService`] composes the adapters, token lifecycle and sync engine
//! into the four operations exposed over HTTP: connect, callback, sync and
//! disconnect. Remote calls within one operation run strictly in sequence.

use crate::db::ConnectionStore;
use crate::error::{AppError, Result};
use crate::models::{Platform, SocialConnection};
use crate::services::providers::ProviderRegistry;
use crate::services::state_token;
use crate::services::sync::{SyncEngine, SyncResult};
use crate::services::token_lifecycle::TokenLifecycle;
use crate::time_utils::{expiry_from, Clock};
use std::sync::Arc;

/// Outcome of a completed OAuth callback.
#[derive(Debug, Clone)]
pub struct CallbackResult {
    pub user_id: String,
    pub platform: Platform,
    pub profile: serde_json::Value,
}

/// High-level service for connecting platforms and syncing their content.
#[derive(Clone)]
pub struct SocialService {
    providers: ProviderRegistry,
    connections: Arc<dyn ConnectionStore>,
    tokens: TokenLifecycle,
    sync: SyncEngine,
    clock: Arc<dyn Clock>,
}

impl SocialService {
    pub fn new(
        providers: ProviderRegistry,
        connections: Arc<dyn ConnectionStore>,
        sync: SyncEngine,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tokens: TokenLifecycle::new(connections.clone(), clock.clone()),
            providers,
            connections,
            sync,
            clock,
        }
    }

    /// Build the authorize URL that starts linking `platform` for `user_id`.
    pub fn connect(&self, platform: &str, user_id: &str, redirect_uri: &str) -> Result<String> {
        let platform: Platform = platform.parse()?;

        if !state_token::is_encodable_user_id(user_id) {
            return Err(AppError::BadRequest(
                "userId must be non-empty and must not contain ':'".to_string(),
            ));
        }

        let adapter = self.providers.get(platform)?;
        let url = adapter.authorize_url(user_id, redirect_uri, self.clock.now());

        tracing::info!(user_id, %platform, "Starting OAuth flow");
        Ok(url)
    }

    /// Complete an OAuth round trip: exchange the code, fetch the profile and
    /// store (or replace) the connection.
    pub async fn callback(
        &self,
        code: &str,
        state: &str,
        redirect_uri: &str,
    ) -> Result<CallbackResult> {
        let auth_state = state_token::decode(state)?;
        let platform = auth_state.platform;
        let user_id = auth_state.user_id;
        let adapter = self.providers.get(platform)?;

        tracing::info!(%user_id, %platform, "Exchanging authorization code for tokens");

        let token = adapter.exchange_code(code, redirect_uri).await?;
        let token = adapter.finish_exchange(token).await?;
        let profile = adapter.fetch_profile(&token.access_token).await?;

        let now = self.clock.now();
        let connection = SocialConnection {
            user_id: user_id.clone(),
            platform,
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at: expiry_from(now, token.expires_in),
            profile: profile.clone(),
            connected_at: now,
        };

        self.connections.upsert_connection(&connection).await?;

        tracing::info!(%user_id, %platform, "Connection stored");

        Ok(CallbackResult {
            user_id,
            platform,
            profile,
        })
    }

    /// Import the latest items from a connected platform as links.
    pub async fn sync(&self, user_id: &str, platform: Platform) -> Result<SyncResult> {
        let adapter = self.providers.get(platform)?;

        let connection = self
            .connections
            .get_connection(user_id, platform)
            .await?
            .ok_or(AppError::NotConnected { platform })?;

        let connection = self.tokens.ensure_fresh(adapter.as_ref(), connection).await?;

        self.sync
            .sync_to_links(adapter.as_ref(), user_id, &connection.access_token)
            .await
    }

    /// Remove the stored connection. Previously synced links stay.
    pub async fn disconnect(&self, user_id: &str, platform: Platform) -> Result<()> {
        self.connections.delete_connection(user_id, platform).await?;
        tracing::info!(user_id, %platform, "Connection removed");
        Ok(())
    }
}
