// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Link model shared with the link-in-bio profile.

use super::Platform;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A link on a user's profile page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Link {
    pub user_id: String,
    pub title: String,
    pub url: String,
    pub icon: String,
    /// Platform the link was imported from; `None` for manually added links
    #[serde(default)]
    pub source: Option<Platform>,
    pub thumbnail: Option<String>,
    pub is_active: bool,
    pub position: u32,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub created_at: DateTime<Utc>,
}

impl Link {
    /// Document key derived from the dedup key (user, url).
    pub fn document_id(&self) -> String {
        link_document_id(&self.user_id, &self.url)
    }
}

/// Hash of (user, url) so arbitrary URLs make valid document ids.
pub fn link_document_id(user_id: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(user_id.as_bytes());
    hasher.update([0u8]);
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

/// Kind of media behind a remote item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaKind {
    Video,
    Image,
    CarouselAlbum,
}

/// Provider-normalized remote video or post, consumed by the sync engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteContentItem {
    pub external_url: String,
    pub title: Option<String>,
    pub thumbnail_url: Option<String>,
    pub media_kind: MediaKind,
}
