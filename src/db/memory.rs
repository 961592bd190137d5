// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store for tests and local runs without Firestore.

use super::{ConnectionStore, InsertOutcome, LinkStore};
use crate::error::AppError;
use crate::models::{Link, Platform, SocialConnection};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

/// Store backed by concurrent hash maps.
///
/// Link inserts go through the map's entry API, so the (user, url)
/// uniqueness holds under concurrent callers.
#[derive(Clone, Default)]
pub struct MemoryStore {
    connections: Arc<DashMap<(String, Platform), SocialConnection>>,
    links: Arc<DashMap<(String, String), Link>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionStore for MemoryStore {
    async fn get_connection(
        &self,
        user_id: &str,
        platform: Platform,
    ) -> Result<Option<SocialConnection>, AppError> {
        Ok(self
            .connections
            .get(&(user_id.to_string(), platform))
            .map(|c| c.clone()))
    }

    async fn upsert_connection(&self, connection: &SocialConnection) -> Result<(), AppError> {
        self.connections.insert(
            (connection.user_id.clone(), connection.platform),
            connection.clone(),
        );
        Ok(())
    }

    async fn update_credentials(&self, connection: &SocialConnection) -> Result<(), AppError> {
        if let Some(mut stored) = self
            .connections
            .get_mut(&(connection.user_id.clone(), connection.platform))
        {
            stored.access_token = connection.access_token.clone();
            stored.expires_at = connection.expires_at;
        }
        Ok(())
    }

    async fn delete_connection(
        &self,
        user_id: &str,
        platform: Platform,
    ) -> Result<(), AppError> {
        self.connections.remove(&(user_id.to_string(), platform));
        Ok(())
    }
}

#[async_trait]
impl LinkStore for MemoryStore {
    async fn find_link(&self, user_id: &str, url: &str) -> Result<Option<Link>, AppError> {
        Ok(self
            .links
            .get(&(user_id.to_string(), url.to_string()))
            .map(|l| l.clone()))
    }

    async fn insert_link(&self, link: &Link) -> Result<InsertOutcome, AppError> {
        match self.links.entry((link.user_id.clone(), link.url.clone())) {
            Entry::Occupied(_) => Ok(InsertOutcome::AlreadyExists),
            Entry::Vacant(slot) => {
                slot.insert(link.clone());
                Ok(InsertOutcome::Inserted)
            }
        }
    }

    async fn count_links(&self, user_id: &str) -> Result<usize, AppError> {
        Ok(self.links.iter().filter(|l| l.user_id == user_id).count())
    }

    async fn list_links(&self, user_id: &str) -> Result<Vec<Link>, AppError> {
        let mut links: Vec<Link> = self
            .links
            .iter()
            .filter(|l| l.user_id == user_id)
            .map(|l| l.clone())
            .collect();
        links.sort_by_key(|l| l.position);
        Ok(links)
    }
}
