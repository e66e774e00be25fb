// ABOUTME: Liveness endpoint for deployment probes
// ABOUTME: Reports service name and version without touching any store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Reverie

//! Health check route

use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

/// Health routes handler
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create the health route
    #[must_use]
    pub fn routes() -> Router {
        Router::new().route("/api/health", get(Self::health))
    }

    /// Liveness probe; requires no authentication
    async fn health() -> impl IntoResponse {
        Json(serde_json::json!({
            "status": "ok",
            "service": "reverie-server",
            "version": env!("CARGO_PKG_VERSION"),
        }))
    }
}
