// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth state parameter encoding.
//!
//! The state binds a user, a platform and the time the authorization was
//! started: `base64("{user_id}:{platform}:{issued_at_millis}")`.
//!
//! The token is NOT signed and carries no expiry. It correlates a callback
//! with its request but gives no replay protection on its own.

use crate::error::AppError;
use crate::models::Platform;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};

const SEPARATOR: char = ':';

/// Decoded contents of an OAuth state parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    pub user_id: String,
    pub platform: Platform,
    pub issued_at: DateTime<Utc>,
}

impl AuthState {
    /// Build a state, truncating `issued_at` to the millisecond precision
    /// the encoding carries.
    pub fn new(user_id: impl Into<String>, platform: Platform, issued_at: DateTime<Utc>) -> Self {
        let issued_at =
            DateTime::from_timestamp_millis(issued_at.timestamp_millis()).unwrap_or(issued_at);
        Self {
            user_id: user_id.into(),
            platform,
            issued_at,
        }
    }
}

/// Whether a user id can be carried through the state unchanged.
pub fn is_encodable_user_id(user_id: &str) -> bool {
    !user_id.is_empty() && !user_id.contains(SEPARATOR)
}

/// Encode a state for the authorize redirect.
pub fn encode(state: &AuthState) -> String {
    let payload = format!(
        "{}{sep}{}{sep}{}",
        state.user_id,
        state.platform,
        state.issued_at.timestamp_millis(),
        sep = SEPARATOR
    );
    STANDARD.encode(payload.as_bytes())
}

/// Decode a state received on the OAuth callback.
pub fn decode(token: &str) -> Result<AuthState, AppError> {
    let bytes = STANDARD
        .decode(token.trim())
        .map_err(|e| AppError::MalformedState(format!("invalid base64: {}", e)))?;
    let payload = String::from_utf8(bytes)
        .map_err(|_| AppError::MalformedState("state is not valid UTF-8".to_string()))?;

    let parts: Vec<&str> = payload.split(SEPARATOR).collect();
    let [user_id, platform, issued_at] = parts.as_slice() else {
        return Err(AppError::MalformedState(format!(
            "expected 3 fields, found {}",
            parts.len()
        )));
    };

    if user_id.is_empty() {
        return Err(AppError::MalformedState("empty user id".to_string()));
    }

    let platform: Platform = platform
        .parse()
        .map_err(|_| AppError::MalformedState(format!("unknown platform '{}'", platform)))?;

    let issued_at = issued_at
        .parse::<i64>()
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .ok_or_else(|| AppError::MalformedState(format!("bad timestamp '{}'", issued_at)))?;

    Ok(AuthState {
        user_id: user_id.to_string(),
        platform,
        issued_at,
    })
}
