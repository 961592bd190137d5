// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod providers;
pub mod social;
pub mod state_token;
pub mod sync;
pub mod token_lifecycle;

pub use providers::{
    InstagramAdapter, ProviderAdapter, ProviderRegistry, TikTokAdapter, TokenRefresher,
    YouTubeAdapter,
};
pub use social::{CallbackResult, SocialService};
pub use state_token::AuthState;
pub use sync::{SyncEngine, SyncResult};
pub use token_lifecycle::TokenLifecycle;
