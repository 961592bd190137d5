// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! The services depend on the [`ConnectionStore`] and [`LinkStore`] traits;
//! [`FirestoreDb`] backs them in production and [`MemoryStore`] in tests.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::error::AppError;
use crate::models::{Link, Platform, SocialConnection};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    pub const SOCIAL_CONNECTIONS: &str = "social_connections";
    pub const LINKS: &str = "links";
}

/// Outcome of a conflict-aware link insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// A link with the same (user, url) already exists.
    AlreadyExists,
}

/// Persistence for social connections, keyed by (user, platform).
#[async_trait]
pub trait ConnectionStore: Send + Sync {
    async fn get_connection(
        &self,
        user_id: &str,
        platform: Platform,
    ) -> Result<Option<SocialConnection>, AppError>;

    /// Create or fully replace the connection for (user, platform).
    async fn upsert_connection(&self, connection: &SocialConnection) -> Result<(), AppError>;

    /// Write only `access_token` and `expires_at` of an existing connection.
    async fn update_credentials(&self, connection: &SocialConnection) -> Result<(), AppError>;

    /// Delete the connection. Deleting a missing connection is not an error.
    async fn delete_connection(&self, user_id: &str, platform: Platform)
        -> Result<(), AppError>;
}

/// Persistence for profile links, unique on (user, url).
#[async_trait]
pub trait LinkStore: Send + Sync {
    async fn find_link(&self, user_id: &str, url: &str) -> Result<Option<Link>, AppError>;

    /// Insert a link unless one with the same (user, url) exists.
    async fn insert_link(&self, link: &Link) -> Result<InsertOutcome, AppError>;

    async fn count_links(&self, user_id: &str) -> Result<usize, AppError>;

    /// All links for a user, ordered by position.
    async fn list_links(&self, user_id: &str) -> Result<Vec<Link>, AppError>;
}
