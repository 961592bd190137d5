// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use crate::models::Platform;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid platform: {0}")]
    InvalidPlatform(String),

    #[error("Malformed OAuth state: {0}")]
    MalformedState(String),

    #[error("{platform} API error: {message}")]
    RemoteApi { platform: Platform, message: String },

    #[error("Channel not found")]
    ChannelNotFound,

    #[error("Not connected to {platform}")]
    NotConnected { platform: Platform },

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Build a remote API error for the given platform.
    pub fn remote(platform: Platform, message: impl Into<String>) -> Self {
        AppError::RemoteApi {
            platform,
            message: message.into(),
        }
    }

    /// Whether this error came back from a provider API.
    pub fn is_remote_api_error(&self) -> bool {
        matches!(self, AppError::RemoteApi { .. })
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::InvalidPlatform(tag) => {
                (StatusCode::BAD_REQUEST, "invalid_platform", Some(tag.clone()))
            }
            AppError::MalformedState(msg) => {
                (StatusCode::BAD_REQUEST, "malformed_state", Some(msg.clone()))
            }
            AppError::RemoteApi { .. } => {
                (StatusCode::BAD_GATEWAY, "remote_api_error", Some(self.to_string()))
            }
            AppError::ChannelNotFound => (StatusCode::NOT_FOUND, "channel_not_found", None),
            AppError::NotConnected { .. } => {
                (StatusCode::NOT_FOUND, "not_connected", Some(self.to_string()))
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Persistence(msg) => {
                tracing::error!(error = %msg, "Persistence error");
                (StatusCode::INTERNAL_SERVER_ERROR, "persistence_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
