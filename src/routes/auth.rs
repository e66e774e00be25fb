// ABOUTME: Registration, login, and logout route handlers
// ABOUTME: Verifies credentials with bcrypt and manages the sid session cookie
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Reverie

//! Authentication routes
//!
//! Login issues an opaque session token, replacing any prior session for the
//! user, and sets it in the `sid` cookie. Logout revokes the session and
//! clears the cookie.

use crate::auth::{clear_cookie_header, session_cookie_header};
use crate::errors::AppError;
use crate::models::{LoginRequest, RegisterRequest, User};
use crate::resources::ServerResources;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Authentication routes handler
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all authentication routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/auth/register", post(Self::register))
            .route("/api/auth/login", post(Self::login))
            .route("/api/auth/logout", post(Self::logout))
            .with_state(resources)
    }

    /// Register a new user account
    async fn register(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<RegisterRequest>,
    ) -> Result<Response, AppError> {
        for (field, value) in [
            ("FirstName", &request.first_name),
            ("LastName", &request.last_name),
            ("Email", &request.email),
            ("Password", &request.password),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::missing_field(field));
            }
        }

        let password_hash = bcrypt::hash(&request.password, bcrypt::DEFAULT_COST)
            .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?;

        let user = User {
            id: Uuid::new_v4(),
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            password_hash,
            journal_entries: Vec::new(),
            created_at: Utc::now(),
        };

        let user_id = resources.database.create_user(&user).await?;
        info!("Registered user {user_id}");

        Ok((
            StatusCode::CREATED,
            Json(serde_json::json!({ "userId": user_id })),
        )
            .into_response())
    }

    /// Log in with email and password, issuing a session cookie
    async fn login(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<LoginRequest>,
    ) -> Result<Response, AppError> {
        if request.email.trim().is_empty() {
            return Err(AppError::missing_field("Email"));
        }
        if request.password.is_empty() {
            return Err(AppError::missing_field("Password"));
        }

        let user = resources
            .database
            .get_user_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        let verified = bcrypt::verify(&request.password, &user.password_hash)
            .map_err(|e| AppError::internal(format!("Failed to verify password: {e}")))?;
        if !verified {
            return Err(AppError::auth_invalid("Invalid password"));
        }

        let session = resources.sessions.issue_session(user.id).await?;
        info!("User {} logged in", user.id);

        let cookie = session_cookie_header(&session.token, resources.sessions.ttl());
        Ok((
            StatusCode::OK,
            [(header::SET_COOKIE, cookie)],
            Json(serde_json::json!({ "userId": user.id })),
        )
            .into_response())
    }

    /// Log out, revoking the caller's session and clearing the cookie
    async fn logout(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user_id = resources.sessions.resolve_user(&headers).await?;
        resources.sessions.revoke_session(user_id).await?;
        info!("User {user_id} logged out");

        Ok((
            StatusCode::OK,
            [(header::SET_COOKIE, clear_cookie_header())],
            Json(serde_json::json!({ "success": true })),
        )
            .into_response())
    }
}
