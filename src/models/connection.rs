// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Social connection model for storage.

use super::Platform;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OAuth credentials linking one user to one platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialConnection {
    /// Owning user
    pub user_id: String,
    /// Connected platform
    pub platform: Platform,
    /// Current access token
    pub access_token: String,
    /// Refresh token, when the provider issues one
    pub refresh_token: Option<String>,
    /// When the access token expires (absent = no known expiry)
    pub expires_at: Option<DateTime<Utc>>,
    /// Profile blob returned by the provider at connect time
    pub profile: serde_json::Value,
    /// When the connection was (re)established
    pub connected_at: DateTime<Utc>,
}

impl SocialConnection {
    /// Document key, unique per (user, platform).
    pub fn document_id(&self) -> String {
        connection_document_id(&self.user_id, self.platform)
    }

    /// Whether the access token is past its expiry.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

pub fn connection_document_id(user_id: &str, platform: Platform) -> String {
    format!("{}_{}", user_id, platform)
}

/// Tokens returned from a code exchange, upgrade or refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenResult {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
}
