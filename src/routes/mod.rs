// ABOUTME: HTTP route assembly for the journaling API
// ABOUTME: Merges auth, journal, chat, user status, and health routers with shared middleware
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Reverie

//! # HTTP Routes
//!
//! Route handlers grouped per resource. Every journal/chat handler resolves
//! the acting user through the session guard before touching any store.

pub mod auth;
pub mod chat;
pub mod health;
pub mod journal;
pub mod user_status;

use crate::resources::ServerResources;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the full application router
#[must_use]
pub fn router(resources: Arc<ServerResources>) -> Router {
    Router::new()
        .merge(health::HealthRoutes::routes())
        .merge(auth::AuthRoutes::routes(resources.clone()))
        .merge(journal::JournalRoutes::routes(resources.clone()))
        .merge(chat::ChatRoutes::routes(resources.clone()))
        .merge(user_status::UserStatusRoutes::routes(resources))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
