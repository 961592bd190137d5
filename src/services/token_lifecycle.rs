// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Access token refresh before use.
//!
//! Refresh is fail-soft: when the provider rejects the refresh, the stored
//! connection is handed back unchanged and the caller's next API call
//! surfaces the provider error.

use crate::db::ConnectionStore;
use crate::error::AppError;
use crate::models::{Platform, SocialConnection};
use crate::services::providers::ProviderAdapter;
use crate::time_utils::{expiry_from, Clock};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Per-connection locks serializing refreshes within this process.
pub type RefreshLocks = Arc<DashMap<(String, Platform), Arc<Mutex<()>>>>;

/// Keeps stored access tokens usable.
#[derive(Clone)]
pub struct TokenLifecycle {
    connections: Arc<dyn ConnectionStore>,
    clock: Arc<dyn Clock>,
    refresh_locks: RefreshLocks,
}

impl TokenLifecycle {
    pub fn new(connections: Arc<dyn ConnectionStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            connections,
            clock,
            refresh_locks: Arc::new(DashMap::new()),
        }
    }

    /// Return a connection whose token is not known to be expired, refreshing
    /// it through the adapter if needed.
    ///
    /// - No expiry, or expiry in the future: returned as is, no remote call.
    /// - Expired, platform cannot refresh: returned as is.
    /// - Expired, refresh fails: returned as is (logged).
    /// - Expired, connection deleted meanwhile: returned as is, not refreshed.
    /// - Expired, refresh succeeds: new access token and expiry persisted.
    ///
    /// Only a failure to persist the refreshed credential is an error.
    pub async fn ensure_fresh(
        &self,
        adapter: &dyn ProviderAdapter,
        connection: SocialConnection,
    ) -> Result<SocialConnection, AppError> {
        if !connection.is_expired(self.clock.now()) {
            return Ok(connection);
        }

        let user_id = connection.user_id.clone();
        let platform = connection.platform;

        let Some(refresher) = adapter.refresher() else {
            tracing::info!(
                %user_id,
                %platform,
                "Access token expired but platform has no refresh path"
            );
            return Ok(connection);
        };

        let lock = self
            .refresh_locks
            .entry((user_id.clone(), platform))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        // Another task may have refreshed or disconnected while we waited.
        let current = match self.connections.get_connection(&user_id, platform).await? {
            Some(stored) if !stored.is_expired(self.clock.now()) => {
                tracing::debug!(%user_id, %platform, "Token already refreshed by another task");
                return Ok(stored);
            }
            Some(stored) => stored,
            None => {
                tracing::info!(%user_id, %platform, "Connection removed, skipping refresh");
                return Ok(connection);
            }
        };

        let Some(credential) = refresher.refresh_credential(&current) else {
            tracing::warn!(%user_id, %platform, "Access token expired and no refresh token stored");
            return Ok(current);
        };

        tracing::info!(%user_id, %platform, "Access token expired, refreshing");

        let refreshed = match refresher.refresh_token(credential).await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    %user_id,
                    %platform,
                    "Token refresh failed, continuing with stored token"
                );
                return Ok(current);
            }
        };

        let updated = SocialConnection {
            access_token: refreshed.access_token,
            expires_at: expiry_from(self.clock.now(), refreshed.expires_in),
            ..current
        };

        self.connections.update_credentials(&updated).await?;

        tracing::info!(%user_id, %platform, "Token refreshed and stored");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{RemoteContentItem, TokenResult};
    use crate::services::providers::TokenRefresher;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    /// Adapter whose refresh either succeeds with a fixed token or fails.
    struct FakeAdapter {
        refresh_calls: AtomicUsize,
        succeed: bool,
        can_refresh: bool,
    }

    impl FakeAdapter {
        fn new(succeed: bool, can_refresh: bool) -> Self {
            Self {
                refresh_calls: AtomicUsize::new(0),
                succeed,
                can_refresh,
            }
        }
    }

    #[async_trait]
    impl ProviderAdapter for FakeAdapter {
        fn platform(&self) -> Platform {
            Platform::TikTok
        }

        fn authorize_url(&self, _: &str, _: &str, _: DateTime<Utc>) -> String {
            String::new()
        }

        async fn exchange_code(&self, _: &str, _: &str) -> Result<TokenResult, AppError> {
            unreachable!("not used by token lifecycle")
        }

        fn refresher(&self) -> Option<&dyn TokenRefresher> {
            if self.can_refresh {
                Some(self)
            } else {
                None
            }
        }

        async fn fetch_profile(&self, _: &str) -> Result<serde_json::Value, AppError> {
            Ok(serde_json::Value::Null)
        }

        async fn fetch_content_items(
            &self,
            _: &str,
            _: u32,
        ) -> Result<Vec<RemoteContentItem>, AppError> {
            Ok(vec![])
        }
    }

    #[async_trait]
    impl TokenRefresher for FakeAdapter {
        async fn refresh_token(&self, _: &str) -> Result<TokenResult, AppError> {
            self.refresh_calls.fetch_add(1, Ordering::SeqCst);
            if self.succeed {
                Ok(TokenResult {
                    access_token: "fresh".to_string(),
                    refresh_token: Some("ignored".to_string()),
                    expires_in: Some(3600),
                })
            } else {
                Err(AppError::remote(Platform::TikTok, "HTTP 400: invalid_grant"))
            }
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap()
    }

    fn connection(expires_at: Option<DateTime<Utc>>) -> SocialConnection {
        SocialConnection {
            user_id: "user-1".to_string(),
            platform: Platform::TikTok,
            access_token: "stale".to_string(),
            refresh_token: Some("refresh".to_string()),
            expires_at,
            profile: serde_json::json!({"display_name": "me"}),
            connected_at: now() - Duration::days(30),
        }
    }

    async fn lifecycle_with(conn: &SocialConnection) -> (TokenLifecycle, MemoryStore) {
        let store = MemoryStore::new();
        store.upsert_connection(conn).await.unwrap();
        let lifecycle = TokenLifecycle::new(Arc::new(store.clone()), Arc::new(FixedClock(now())));
        (lifecycle, store)
    }

    #[tokio::test]
    async fn test_future_expiry_skips_refresh() {
        let conn = connection(Some(now() + Duration::minutes(1)));
        let (lifecycle, _) = lifecycle_with(&conn).await;
        let adapter = FakeAdapter::new(true, true);

        let result = lifecycle.ensure_fresh(&adapter, conn.clone()).await.unwrap();

        assert_eq!(result, conn);
        assert_eq!(adapter.refresh_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_expiry_skips_refresh() {
        let conn = connection(None);
        let (lifecycle, _) = lifecycle_with(&conn).await;
        let adapter = FakeAdapter::new(true, true);

        let result = lifecycle.ensure_fresh(&adapter, conn.clone()).await.unwrap();

        assert_eq!(result, conn);
        assert_eq!(adapter.refresh_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed_and_persisted() {
        let conn = connection(Some(now() - Duration::minutes(1)));
        let (lifecycle, store) = lifecycle_with(&conn).await;
        let adapter = FakeAdapter::new(true, true);

        let result = lifecycle.ensure_fresh(&adapter, conn.clone()).await.unwrap();

        assert_eq!(adapter.refresh_calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.access_token, "fresh");
        assert_eq!(result.expires_at, Some(now() + Duration::hours(1)));
        // Only the access token and expiry change.
        assert_eq!(result.refresh_token, conn.refresh_token);
        assert_eq!(result.profile, conn.profile);

        let stored = store
            .get_connection("user-1", Platform::TikTok)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, result);
    }

    #[tokio::test]
    async fn test_refresh_failure_returns_original() {
        let conn = connection(Some(now() - Duration::minutes(1)));
        let (lifecycle, store) = lifecycle_with(&conn).await;
        let adapter = FakeAdapter::new(false, true);

        let result = lifecycle.ensure_fresh(&adapter, conn.clone()).await.unwrap();

        assert_eq!(adapter.refresh_calls.load(Ordering::SeqCst), 1);
        assert_eq!(result, conn);
        let stored = store
            .get_connection("user-1", Platform::TikTok)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.access_token, "stale");
    }

    #[tokio::test]
    async fn test_platform_without_refresh_returns_original() {
        let conn = connection(Some(now() - Duration::minutes(1)));
        let (lifecycle, _) = lifecycle_with(&conn).await;
        let adapter = FakeAdapter::new(true, false);

        let result = lifecycle.ensure_fresh(&adapter, conn.clone()).await.unwrap();

        assert_eq!(result, conn);
        assert_eq!(adapter.refresh_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_disconnected_connection_is_not_refreshed() {
        let conn = connection(Some(now() - Duration::minutes(1)));
        let (lifecycle, store) = lifecycle_with(&conn).await;
        store
            .delete_connection("user-1", Platform::TikTok)
            .await
            .unwrap();
        let adapter = FakeAdapter::new(true, true);

        let result = lifecycle.ensure_fresh(&adapter, conn.clone()).await.unwrap();

        assert_eq!(result, conn);
        assert_eq!(adapter.refresh_calls.load(Ordering::SeqCst), 0);
        assert!(store
            .get_connection("user-1", Platform::TikTok)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_concurrent_callers_refresh_once() {
        let conn = connection(Some(now() - Duration::minutes(1)));
        let (lifecycle, _) = lifecycle_with(&conn).await;
        let adapter = Arc::new(FakeAdapter::new(true, true));

        let mut handles = vec![];
        for _ in 0..8 {
            let lifecycle = lifecycle.clone();
            let adapter = adapter.clone();
            let conn = conn.clone();
            handles.push(tokio::spawn(async move {
                lifecycle.ensure_fresh(adapter.as_ref(), conn).await.unwrap()
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap().access_token, "fresh");
        }
        assert_eq!(adapter.refresh_calls.load(Ordering::SeqCst), 1);
    }
}
