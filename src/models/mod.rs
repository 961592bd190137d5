// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod connection;
pub mod link;
pub mod platform;

pub use connection::{SocialConnection, TokenResult};
pub use link::{Link, MediaKind, RemoteContentItem};
pub use platform::Platform;
