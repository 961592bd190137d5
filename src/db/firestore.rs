// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Social connections (one document per user and platform)
//! - Links (one document per user and URL)

use super::{collections, ConnectionStore, InsertOutcome, LinkStore};
use crate::error::AppError;
use crate::models::connection::connection_document_id;
use crate::models::link::link_document_id;
use crate::models::{Link, Platform, SocialConnection};
use async_trait::async_trait;
use firestore::errors::FirestoreError;
use firestore::{path, paths, FirestoreWritePrecondition};
use serde::Deserialize;

/// Result row of the link count aggregation.
#[derive(Debug, Deserialize)]
struct LinkCount {
    count: usize,
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id).await.map_err(|e| {
            AppError::Persistence(format!("Failed to connect to Firestore: {}", e))
        })?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Persistence(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create an offline client for testing.
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client.as_ref().ok_or_else(|| {
            AppError::Persistence("Database not connected (offline mode)".to_string())
        })
    }
}

// ─── Connection Operations ───────────────────────────────────

#[async_trait]
impl ConnectionStore for FirestoreDb {
    async fn get_connection(
        &self,
        user_id: &str,
        platform: Platform,
    ) -> Result<Option<SocialConnection>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::SOCIAL_CONNECTIONS)
            .obj()
            .one(&connection_document_id(user_id, platform))
            .await
            .map_err(|e| AppError::Persistence(e.to_string()))
    }

    async fn upsert_connection(&self, connection: &SocialConnection) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::SOCIAL_CONNECTIONS)
            .document_id(connection.document_id())
            .object(connection)
            .execute()
            .await
            .map_err(|e| AppError::Persistence(e.to_string()))?;
        Ok(())
    }

    /// Field-masked update that requires the document to exist, so a
    /// connection deleted by a concurrent disconnect is not recreated.
    async fn update_credentials(&self, connection: &SocialConnection) -> Result<(), AppError> {
        let result: Result<(), FirestoreError> = self
            .get_client()?
            .fluent()
            .update()
            .fields(paths!(SocialConnection::{access_token, expires_at}))
            .in_col(collections::SOCIAL_CONNECTIONS)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .document_id(connection.document_id())
            .object(connection)
            .execute()
            .await;

        match result {
            Ok(()) => Ok(()),
            Err(FirestoreError::DataNotFoundError(_)) => {
                tracing::debug!(
                    user_id = %connection.user_id,
                    platform = %connection.platform,
                    "Connection gone, credentials not written"
                );
                Ok(())
            }
            Err(e) => Err(AppError::Persistence(e.to_string())),
        }
    }

    async fn delete_connection(
        &self,
        user_id: &str,
        platform: Platform,
    ) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::SOCIAL_CONNECTIONS)
            .document_id(connection_document_id(user_id, platform))
            .execute()
            .await
            .map_err(|e| AppError::Persistence(e.to_string()))?;
        Ok(())
    }
}

// ─── Link Operations ─────────────────────────────────────────

#[async_trait]
impl LinkStore for FirestoreDb {
    /// Look up by the hashed document id first (synced links), then fall
    /// back to a field query so manually created links are found too.
    async fn find_link(&self, user_id: &str, url: &str) -> Result<Option<Link>, AppError> {
        let client = self.get_client()?;

        let by_id: Option<Link> = client
            .fluent()
            .select()
            .by_id_in(collections::LINKS)
            .obj()
            .one(&link_document_id(user_id, url))
            .await
            .map_err(|e| AppError::Persistence(e.to_string()))?;

        if by_id.is_some() {
            return Ok(by_id);
        }

        let matches: Vec<Link> = client
            .fluent()
            .select()
            .from(collections::LINKS)
            .filter(|q| {
                q.for_all([
                    q.field("user_id").eq(user_id),
                    q.field("url").eq(url),
                ])
            })
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Persistence(e.to_string()))?;

        Ok(matches.into_iter().next())
    }

    /// Create-only write: a second insert for the same (user, url) hits the
    /// existing document and fails with a conflict.
    async fn insert_link(&self, link: &Link) -> Result<InsertOutcome, AppError> {
        let result: Result<Link, FirestoreError> = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::LINKS)
            .document_id(link.document_id())
            .object(link)
            .execute()
            .await;

        match result {
            Ok(_) => Ok(InsertOutcome::Inserted),
            Err(FirestoreError::DataConflictError(_)) => {
                tracing::debug!(
                    user_id = %link.user_id,
                    url = %link.url,
                    "Link insert conflict (already synced)"
                );
                Ok(InsertOutcome::AlreadyExists)
            }
            Err(e) => Err(AppError::Persistence(e.to_string())),
        }
    }

    async fn count_links(&self, user_id: &str) -> Result<usize, AppError> {
        let counts: Vec<LinkCount> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::LINKS)
            .filter(|q| q.for_all([q.field("user_id").eq(user_id)]))
            .aggregate(|a| a.fields([a.field(path!(LinkCount::count)).count()]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Persistence(e.to_string()))?;

        Ok(counts.first().map_or(0, |c| c.count))
    }

    async fn list_links(&self, user_id: &str) -> Result<Vec<Link>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::LINKS)
            .filter(|q| q.for_all([q.field("user_id").eq(user_id)]))
            .order_by([("position", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Persistence(e.to_string()))
    }
}
