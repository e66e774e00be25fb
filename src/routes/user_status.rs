// ABOUTME: User status route handlers for the per-user profile summary
// ABOUTME: A create-once singleton per user, updated in place and deletable

// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Reverie

//! User status routes
//!
//! Each user owns at most one status record, a free-text profile summary.
//! Creating a second one is a conflict; updates overwrite the summary of the
//! existing record only.

use crate::errors::AppError;
use crate::models::{UserStatus, UserStatusRequest};
use crate::resources::ServerResources;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// User status routes handler
pub struct UserStatusRoutes;

impl UserStatusRoutes {
    /// Create all user status routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/user/status",
                get(Self::get_status)
                    .post(Self::create_status)
                    .put(Self::update_status)
                    .delete(Self::delete_status),
            )
            .with_state(resources)
    }

    /// Create the caller's status record; at most one exists per user
    async fn create_status(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<UserStatusRequest>,
    ) -> Result<Response, AppError> {
        let user_id = resources.sessions.resolve_user(&headers).await?;
        Self::require_user(&resources, user_id).await?;

        if request.user_summary.trim().is_empty() {
            return Err(AppError::missing_field("UserSummary"));
        }

        let now = Utc::now();
        let status = UserStatus {
            user_id,
            summary: request.user_summary,
            created_at: now,
            updated_at: now,
        };

        // A second create for the same user surfaces as a conflict
        resources.database.create_user_status(&status).await?;

        info!("Created user status for {user_id}");
        Ok((StatusCode::CREATED, Json(status)).into_response())
    }

    /// Get the caller's status record
    async fn get_status(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user_id = resources.sessions.resolve_user(&headers).await?;

        let status = resources
            .database
            .get_user_status(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User status"))?;

        Ok((StatusCode::OK, Json(status)).into_response())
    }

    /// Overwrite the summary of the caller's existing status record
    async fn update_status(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<UserStatusRequest>,
    ) -> Result<Response, AppError> {
        let user_id = resources.sessions.resolve_user(&headers).await?;
        Self::require_user(&resources, user_id).await?;

        if request.user_summary.trim().is_empty() {
            return Err(AppError::missing_field("UserSummary"));
        }

        let updated = resources
            .database
            .update_user_status(user_id, &request.user_summary)
            .await?;
        if updated == 0 {
            return Err(AppError::not_found("User status"));
        }

        info!("Updated user status for {user_id}");
        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "success": true })),
        )
            .into_response())
    }

    /// Delete the caller's status record
    async fn delete_status(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user_id = resources.sessions.resolve_user(&headers).await?;

        let deleted = resources.database.delete_user_status(user_id).await?;
        if deleted == 0 {
            return Err(AppError::not_found("User status"));
        }

        info!("Deleted user status for {user_id}");
        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "success": true })),
        )
            .into_response())
    }

    /// The acting user must still exist before any status write
    async fn require_user(
        resources: &Arc<ServerResources>,
        user_id: Uuid,
    ) -> Result<(), AppError> {
        resources
            .database
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;
        Ok(())
    }
}
