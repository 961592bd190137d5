// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth callback and provider API tests against a mock server.

use chrono::Duration;
use serde_json::json;
use social_sync::db::{ConnectionStore, LinkStore};
use social_sync::error::AppError;
use social_sync::models::Platform;
use social_sync::services::state_token::{self, AuthState};
use wiremock::matchers::{any, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::{connection, create_test_app, create_test_app_with, test_now};

const USER: &str = "user-1";
const REDIRECT: &str = "https://app.example.com/oauth/callback";

fn state_for(platform: Platform) -> String {
    state_token::encode(&AuthState::new(USER, platform, test_now()))
}

// ═══════════════════════════════════════════════════════════════════════════
// CALLBACK
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_instagram_callback_stores_long_lived_token() {
    let server = MockServer::start().await;
    let (_app, state, store) = create_test_app_with(&server.uri());

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("code=ig-code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "short-lived",
            "user_id": 17841400000_i64
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/access_token"))
        .and(query_param("grant_type", "ig_exchange_token"))
        .and(query_param("access_token", "short-lived"))
        .and(query_param("client_secret", "test_secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "long-lived",
            "token_type": "bearer",
            "expires_in": 5184000
        })))
        .expect(1)
        .mount(&server)
        .await;

    // The profile must be fetched with the upgraded token only.
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(query_param("access_token", "long-lived"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "17841400000",
            "username": "creator",
            "account_type": "PERSONAL",
            "media_count": 12
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/me"))
        .and(query_param("access_token", "short-lived"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = state
        .social
        .callback("ig-code", &state_for(Platform::Instagram), REDIRECT)
        .await
        .unwrap();

    assert_eq!(result.user_id, USER);
    assert_eq!(result.platform, Platform::Instagram);
    assert_eq!(result.profile["username"], "creator");

    let stored = store
        .get_connection(USER, Platform::Instagram)
        .await
        .unwrap()
        .expect("connection stored");
    assert_eq!(stored.access_token, "long-lived");
    assert_eq!(stored.refresh_token, None);
    assert_eq!(stored.expires_at, Some(test_now() + Duration::seconds(5184000)));
    assert_eq!(stored.connected_at, test_now());
}

#[tokio::test]
async fn test_tiktok_callback_stores_connection() {
    let server = MockServer::start().await;
    let (_app, state, store) = create_test_app_with(&server.uri());

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("client_key=test_tiktok_key"))
        .and(body_string_contains("grant_type=authorization_code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "act.123",
            "refresh_token": "rft.456",
            "expires_in": 86400,
            "open_id": "open-1",
            "scope": "user.info.basic,video.list",
            "token_type": "Bearer"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/user/info/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "user": { "open_id": "open-1", "display_name": "Creator" } }
        })))
        .mount(&server)
        .await;

    let result = state
        .social
        .callback("tt-code", &state_for(Platform::TikTok), REDIRECT)
        .await
        .unwrap();
    assert_eq!(result.profile["data"]["user"]["display_name"], "Creator");

    let stored = store
        .get_connection(USER, Platform::TikTok)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.access_token, "act.123");
    assert_eq!(stored.refresh_token.as_deref(), Some("rft.456"));
    assert_eq!(stored.expires_at, Some(test_now() + Duration::seconds(86400)));
}

#[tokio::test]
async fn test_reconnect_replaces_connection() {
    let server = MockServer::start().await;
    let (_app, state, store) = create_test_app_with(&server.uri());

    store
        .upsert_connection(&connection(USER, Platform::YouTube, "old-token", None))
        .await
        .unwrap();

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "new-token",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/channels"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "items": [{ "id": "UC1" }] })),
        )
        .mount(&server)
        .await;

    state
        .social
        .callback("yt-code", &state_for(Platform::YouTube), REDIRECT)
        .await
        .unwrap();

    let stored = store
        .get_connection(USER, Platform::YouTube)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.access_token, "new-token");
    assert_eq!(stored.refresh_token, None);
    assert_eq!(stored.profile["items"][0]["id"], "UC1");
}

#[tokio::test]
async fn test_tiktok_exchange_failure_surfaces_body() {
    let server = MockServer::start().await;
    let (_app, state, store) = create_test_app_with(&server.uri());

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Authorization code is expired."
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/user/info/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = state
        .social
        .callback("stale-code", &state_for(Platform::TikTok), REDIRECT)
        .await
        .unwrap_err();

    match err {
        AppError::RemoteApi { platform, message } => {
            assert_eq!(platform, Platform::TikTok);
            assert!(message.contains("400"), "message: {}", message);
            assert!(message.contains("invalid_grant"), "message: {}", message);
        }
        other => panic!("expected RemoteApi, got {:?}", other),
    }

    assert!(store
        .get_connection(USER, Platform::TikTok)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_malformed_state_makes_no_remote_calls() {
    let server = MockServer::start().await;
    let (_app, state, _store) = create_test_app_with(&server.uri());

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    for bad in ["not base64!!", "dXNlcjE6bXlzcGFjZToxNzAwMDAwMDAwMDAw", ""] {
        let err = state.social.callback("code", bad, REDIRECT).await.unwrap_err();
        assert!(matches!(err, AppError::MalformedState(_)), "{}: {:?}", bad, err);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// YOUTUBE
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_youtube_sync_without_channel() {
    let server = MockServer::start().await;
    let (_app, state, store) = create_test_app_with(&server.uri());
    store
        .upsert_connection(&connection(USER, Platform::YouTube, "yt-token", None))
        .await
        .unwrap();

    Mock::given(method("GET"))
        .and(path("/channels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = state.social.sync(USER, Platform::YouTube).await.unwrap_err();
    assert!(matches!(err, AppError::ChannelNotFound));
    assert_eq!(store.count_links(USER).await.unwrap(), 0);
}

#[tokio::test]
async fn test_youtube_latest_video_by_handle() {
    let server = MockServer::start().await;
    let (_app, state, _store) = create_test_app_with(&server.uri());

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("type", "channel"))
        .and(query_param("q", "creator"))
        .and(query_param("key", "test-api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "snippet": { "channelId": "UC999" } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("type", "video"))
        .and(query_param("channelId", "UC999"))
        .and(query_param("maxResults", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "id": { "videoId": "vid1" }, "snippet": { "title": "Newest" } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let video = state
        .youtube
        .latest_video_public("https://www.youtube.com/@creator")
        .await
        .unwrap()
        .expect("a video");
    assert_eq!(video.external_url, "https://www.youtube.com/watch?v=vid1");
    assert_eq!(video.title.as_deref(), Some("Newest"));
}

#[tokio::test]
async fn test_youtube_latest_video_unknown_handle() {
    let server = MockServer::start().await;
    let (_app, state, _store) = create_test_app_with(&server.uri());

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("type", "channel"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .mount(&server)
        .await;

    let err = state
        .youtube
        .latest_video_public("https://www.youtube.com/@nobody")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ChannelNotFound));

    let err = state
        .youtube
        .latest_video_public("https://www.youtube.com/watch?v=abc")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ChannelNotFound));
}

#[tokio::test]
async fn test_youtube_latest_video_requires_api_key() {
    let (_app, state, _store) = create_test_app();

    let err = state
        .youtube
        .latest_video_public("https://www.youtube.com/channel/UC1")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}
