// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Social Sync API Server
//!
//! Links TikTok, YouTube and Instagram accounts to user profiles and imports
//! their latest content as profile links.

use social_sync::{
    config::{Config, StoreBackend},
    db::{ConnectionStore, FirestoreDb, LinkStore, MemoryStore},
    time_utils::SystemClock,
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Social Sync API");

    let (connections, links) = match config.store_backend {
        StoreBackend::Firestore => {
            let db = Arc::new(FirestoreDb::new(&config.gcp_project_id).await?);
            tracing::info!(project = %config.gcp_project_id, "Firestore store initialized");
            (db.clone() as Arc<dyn ConnectionStore>, db as Arc<dyn LinkStore>)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            let store = Arc::new(MemoryStore::new());
            (store.clone() as Arc<dyn ConnectionStore>, store as Arc<dyn LinkStore>)
        }
    };

    let state = Arc::new(AppState::build(
        config.clone(),
        connections,
        links,
        Arc::new(SystemClock),
    )?);

    let app = social_sync::routes::create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() -> Result<(), tracing_subscriber::filter::ParseError> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("social_sync=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
