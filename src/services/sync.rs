// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Content sync: import a platform's latest items as profile links.
//!
//! Handles the core workflow:
//! 1. Fetch the latest items from the platform
//! 2. Skip items whose URL the user already has as a link
//! 3. Insert the rest, appended after the user's existing links
//!
//! The (user, url) uniqueness is enforced by the link store; an insert that
//! loses a race with a concurrent sync is treated as already synced.

use crate::db::{InsertOutcome, LinkStore};
use crate::error::Result;
use crate::models::{Link, Platform, RemoteContentItem};
use crate::services::providers::{ProviderAdapter, DEFAULT_MAX_ITEMS};
use crate::time_utils::Clock;
use serde::Serialize;
use std::sync::Arc;

/// Longest Instagram caption used verbatim as a link title.
const MAX_CAPTION_TITLE_CHARS: usize = 50;

/// Links created by one sync run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub platform: Platform,
    /// Newly inserted links only
    pub synced_links: Vec<Link>,
}

/// Imports remote items into the link store.
#[derive(Clone)]
pub struct SyncEngine {
    links: Arc<dyn LinkStore>,
    clock: Arc<dyn Clock>,
    max_items: u32,
}

impl SyncEngine {
    pub fn new(links: Arc<dyn LinkStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            links,
            clock,
            max_items: DEFAULT_MAX_ITEMS,
        }
    }

    pub fn with_max_items(mut self, max_items: u32) -> Self {
        self.max_items = max_items;
        self
    }

    /// Fetch the latest items for `user_id` and insert the ones not yet linked.
    pub async fn sync_to_links(
        &self,
        adapter: &dyn ProviderAdapter,
        user_id: &str,
        access_token: &str,
    ) -> Result<SyncResult> {
        let platform = adapter.platform();
        let items = adapter
            .fetch_content_items(access_token, self.max_items)
            .await?;

        tracing::debug!(user_id, %platform, fetched = items.len(), "Fetched remote items");

        let base_position = self.links.count_links(user_id).await?;
        let mut synced_links = Vec::new();

        for item in items {
            if self
                .links
                .find_link(user_id, &item.external_url)
                .await?
                .is_some()
            {
                tracing::debug!(user_id, url = %item.external_url, "Already linked, skipping");
                continue;
            }

            let position = u32::try_from(base_position + synced_links.len()).unwrap_or(u32::MAX);
            let link = build_link(user_id, platform, item, position, self.clock.as_ref());

            match self.links.insert_link(&link).await? {
                InsertOutcome::Inserted => synced_links.push(link),
                InsertOutcome::AlreadyExists => {
                    tracing::debug!(user_id, url = %link.url, "Linked concurrently, skipping");
                }
            }
        }

        tracing::info!(
            user_id,
            %platform,
            synced = synced_links.len(),
            "Sync complete"
        );

        Ok(SyncResult {
            platform,
            synced_links,
        })
    }
}

fn build_link(
    user_id: &str,
    platform: Platform,
    item: RemoteContentItem,
    position: u32,
    clock: &dyn Clock,
) -> Link {
    Link {
        user_id: user_id.to_string(),
        title: link_title(platform, item.title.as_deref()),
        url: item.external_url,
        icon: platform.link_icon().to_string(),
        source: Some(platform),
        thumbnail: item.thumbnail_url,
        is_active: true,
        position,
        created_at: clock.now(),
    }
}

/// Title for an imported item. Instagram captions are cut to 50 characters
/// with a trailing `...`.
fn link_title(platform: Platform, title: Option<&str>) -> String {
    let title = match title.map(str::trim) {
        Some(t) if !t.is_empty() => t,
        _ => return platform.fallback_title().to_string(),
    };

    match platform {
        Platform::Instagram if title.chars().count() > MAX_CAPTION_TITLE_CHARS => {
            let truncated: String = title.chars().take(MAX_CAPTION_TITLE_CHARS).collect();
            format!("{}...", truncated)
        }
        _ => title.to_string(),
    }
}
