// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Supported content platforms.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// External content platform a user can connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Platform {
    TikTok,
    YouTube,
    Instagram,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::TikTok, Platform::YouTube, Platform::Instagram];

    /// Wire tag used in requests, state tokens and stored records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::TikTok => "tiktok",
            Platform::YouTube => "youtube",
            Platform::Instagram => "instagram",
        }
    }

    /// Icon shown next to links imported from this platform.
    pub fn link_icon(&self) -> &'static str {
        match self {
            Platform::TikTok => "📱",
            Platform::YouTube => "📺",
            Platform::Instagram => "📸",
        }
    }

    /// Title used when the remote item has none.
    pub fn fallback_title(&self) -> &'static str {
        match self {
            Platform::TikTok => "TikTok Video",
            Platform::YouTube => "YouTube Video",
            Platform::Instagram => "Instagram Post",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tiktok" => Ok(Platform::TikTok),
            "youtube" => Ok(Platform::YouTube),
            "instagram" => Ok(Platform::Instagram),
            other => Err(AppError::InvalidPlatform(other.to_string())),
        }
    }
}
