// ABOUTME: Opaque-token session authentication and cookie handling
// ABOUTME: Issues, resolves, and revokes sessions; gates every journal/chat operation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Reverie

//! # Authentication and Session Management
//!
//! Sessions are opaque random tokens carried in the `sid` cookie and stored
//! server-side with an issuance time and TTL. A user holds at most one live
//! session: logging in again replaces the prior token. Expired tokens fail
//! resolution exactly like unknown ones, so a client cannot distinguish
//! revocation from expiry.

use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::Session;
use axum::http::HeaderMap;
use chrono::{Duration as ChronoDuration, Utc};
use rand::RngCore;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "sid";

/// Number of random bytes in a session token (hex-encoded to 64 chars)
const TOKEN_BYTES: usize = 32;

/// Session guard: resolves the acting user for a request and manages the
/// session lifecycle.
#[derive(Clone)]
pub struct SessionManager {
    database: Database,
    ttl: Duration,
}

impl SessionManager {
    /// Create a new session manager
    #[must_use]
    pub const fn new(database: Database, ttl: Duration) -> Self {
        Self { database, ttl }
    }

    /// Issue a fresh session for a user, replacing any prior one
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be persisted.
    pub async fn issue_session(&self, user_id: Uuid) -> AppResult<Session> {
        let now = Utc::now();
        let ttl = ChronoDuration::from_std(self.ttl)
            .map_err(|e| AppError::config(format!("Session TTL out of range: {e}")))?;

        let session = Session {
            token: generate_token(),
            user_id,
            created_at: now,
            expires_at: now + ttl,
        };

        self.database.upsert_session(&session).await?;
        debug!("Issued session for user {user_id}");
        Ok(session)
    }

    /// Resolve the acting user from request headers.
    ///
    /// Fails with `AuthRequired` when the `sid` cookie is absent and
    /// `AuthInvalid` when the token is unknown or expired — always before any
    /// store is touched on behalf of the request.
    ///
    /// # Errors
    ///
    /// Returns an authentication error as described above, or a database
    /// error if the lookup itself fails.
    pub async fn resolve_user(&self, headers: &HeaderMap) -> AppResult<Uuid> {
        let token =
            get_cookie_value(headers, SESSION_COOKIE).ok_or_else(AppError::auth_required)?;

        let session = self
            .database
            .get_session(&token)
            .await?
            .ok_or_else(|| AppError::auth_invalid("Unknown session token"))?;

        // Expired tokens fail the same way as absent ones
        if session.is_expired(Utc::now()) {
            return Err(AppError::auth_invalid("Session has expired"));
        }

        Ok(session.user_id)
    }

    /// Revoke the user's session (logout)
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be deleted.
    pub async fn revoke_session(&self, user_id: Uuid) -> AppResult<()> {
        self.database.delete_session(user_id).await
    }

    /// Session lifetime, used to compute cookie Max-Age
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// Generate an opaque session token
fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Extract a cookie value from request headers
#[must_use]
pub fn get_cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookie_header = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;

    cookie_header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_owned())
    })
}

/// Build the `Set-Cookie` header value for a freshly issued session
#[must_use]
pub fn session_cookie_header(token: &str, max_age: Duration) -> String {
    format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        max_age.as_secs()
    )
}

/// Build the `Set-Cookie` header value that clears the session cookie
#[must_use]
pub fn clear_cookie_header() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}
