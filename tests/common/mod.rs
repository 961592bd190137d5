// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::{DateTime, TimeZone, Utc};
use social_sync::config::Config;
use social_sync::db::{FirestoreDb, MemoryStore};
use social_sync::models::{Platform, SocialConnection};
use social_sync::routes::create_router;
use social_sync::time_utils::Clock;
use social_sync::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Clock pinned to a fixed instant.
#[allow(dead_code)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// The instant every test app runs at.
#[allow(dead_code)]
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

/// Test config with every provider endpoint pointed at `server_uri`.
#[allow(dead_code)]
pub fn test_config(server_uri: &str) -> Config {
    let mut config = Config::test_default();
    config.tiktok = config.tiktok.with_base_url(server_uri);
    config.youtube = config.youtube.with_base_url(server_uri);
    config.instagram = config.instagram.with_base_url(server_uri);
    config.youtube_api_key = Some("test-api-key".to_string());
    config
}

/// Create a test app on an in-memory store, talking to providers at
/// `server_uri`. Returns the router, the shared state and the store.
#[allow(dead_code)]
pub fn create_test_app_with(server_uri: &str) -> (axum::Router, Arc<AppState>, MemoryStore) {
    create_app(test_config(server_uri))
}

/// Create a test app with production provider URLs (never contacted).
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, MemoryStore) {
    create_app(Config::test_default())
}

fn create_app(config: Config) -> (axum::Router, Arc<AppState>, MemoryStore) {
    let store = MemoryStore::new();
    let state = Arc::new(
        AppState::build(
            config,
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(FixedClock(test_now())),
        )
        .expect("Failed to build app state"),
    );

    (create_router(state.clone()), state, store)
}

/// A stored connection with the given expiry.
#[allow(dead_code)]
pub fn connection(
    user_id: &str,
    platform: Platform,
    access_token: &str,
    expires_at: Option<DateTime<Utc>>,
) -> SocialConnection {
    SocialConnection {
        user_id: user_id.to_string(),
        platform,
        access_token: access_token.to_string(),
        refresh_token: Some(format!("{}-refresh", access_token)),
        expires_at,
        profile: serde_json::json!({}),
        connected_at: test_now(),
    }
}
