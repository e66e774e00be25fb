// ABOUTME: Journal entry route handlers including the day-bucketed upsert workflow
// ABOUTME: Creates or updates entries, maintains the entry-chat link, and folds in AI summaries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Reverie

//! Journal routes
//!
//! The upsert handler is the heart of the backend: one entry per
//! `(user, calendar day)`, created together with its chat thread, with the
//! AI summary folded into persisted state. Repeat submissions for the same
//! day update the existing entry in place.

use crate::errors::AppError;
use crate::models::{JournalEntry, UpsertEntryRequest};
use crate::resources::ServerResources;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{NaiveDate, NaiveTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Journal routes handler
pub struct JournalRoutes;

impl JournalRoutes {
    /// Create all journal routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/journal/entries",
                get(Self::list_entries).post(Self::upsert_entry),
            )
            .route(
                "/api/journal/entries/:entry_id",
                get(Self::get_entry).delete(Self::delete_entry),
            )
            .with_state(resources)
    }

    /// Create or update the journal entry for a calendar day.
    ///
    /// Existence of an entry for `(user, day)` is the sole create-vs-update
    /// test; title/content equality is irrelevant.
    async fn upsert_entry(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<UpsertEntryRequest>,
    ) -> Result<Response, AppError> {
        let user_id = resources.sessions.resolve_user(&headers).await?;

        let day = validate_upsert_request(&request)?;

        // The acting user must still exist before any write
        resources
            .database
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        let existing = resources.database.find_entry_for_day(user_id, day).await?;

        match existing {
            Some(entry) => Self::update_existing_entry(&resources, entry, &request).await,
            None => Self::create_new_entry(&resources, user_id, day, &request).await,
        }
    }

    /// Update path: repair the chat link first, then fold in a fresh summary
    async fn update_existing_entry(
        resources: &Arc<ServerResources>,
        entry: JournalEntry,
        request: &UpsertEntryRequest,
    ) -> Result<Response, AppError> {
        // Link repair comes before any other field update: an entry whose
        // chat_id is empty or dangling gets a fresh chat persisted first.
        let chat_missing = entry.chat_id.is_empty()
            || resources.database.get_chat(&entry.chat_id).await?.is_none();

        if chat_missing {
            // An orphaned chat still pointing at this entry gets relinked
            // rather than replaced
            let chat_id = match resources.database.get_chat_by_journal(&entry.id).await? {
                Some(orphan) => orphan.id,
                None => {
                    let chat_id = Uuid::new_v4().to_string();
                    resources.database.create_chat(&chat_id, &entry.id).await?;
                    chat_id
                }
            };
            let updated = resources.database.set_entry_chat(&entry.id, &chat_id).await?;
            if updated == 0 {
                return Err(AppError::database("Failed to repair chat link"));
            }
            warn!("Repaired missing chat link for entry {}", entry.id);
        }

        // Summarization failure is only tolerated on the create path;
        // here it aborts the update.
        let summary = resources.gateway.summarize(&request.content).await?;

        let updated = resources
            .database
            .update_entry_fields(&entry.id, &request.title, &request.content, &summary)
            .await?;
        if updated == 0 {
            return Err(AppError::database("Journal entry update had no effect"));
        }

        info!("Updated journal entry {} for day {}", entry.id, entry.day());
        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "journalId": entry.id })),
        )
            .into_response())
    }

    /// Create path: entry and chat are created together; a failed
    /// summarization falls back to an empty summary rather than aborting
    async fn create_new_entry(
        resources: &Arc<ServerResources>,
        user_id: Uuid,
        day: NaiveDate,
        request: &UpsertEntryRequest,
    ) -> Result<Response, AppError> {
        let summary = match resources.gateway.summarize(&request.content).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!("Summarization failed, creating entry without summary: {e}");
                String::new()
            }
        };

        let now = Utc::now();
        let entry = JournalEntry {
            id: Uuid::new_v4().to_string(),
            user_id,
            title: request.title.clone(),
            content: request.content.clone(),
            entry_at: day.and_time(NaiveTime::MIN).and_utc(),
            summary,
            chat_id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
        };

        // A lost race against a concurrent upsert for the same day surfaces
        // as a conflict from the (user_id, day) uniqueness constraint.
        resources.database.create_entry_with_chat(&entry).await?;

        info!("Created journal entry {} for day {day}", entry.id);
        Ok((
            StatusCode::CREATED,
            Json(serde_json::json!({ "journalId": entry.id })),
        )
            .into_response())
    }

    /// List the caller's entries, newest first
    async fn list_entries(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user_id = resources.sessions.resolve_user(&headers).await?;
        let entries = resources.database.list_entries(user_id).await?;

        Ok((
            StatusCode::OK,
            Json(serde_json::json!({
                "entries": entries,
                "total": entries.len(),
            })),
        )
            .into_response())
    }

    /// Get a single entry owned by the caller
    async fn get_entry(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(entry_id): Path<String>,
    ) -> Result<Response, AppError> {
        let user_id = resources.sessions.resolve_user(&headers).await?;
        let entry = Self::load_owned_entry(&resources, &entry_id, user_id).await?;

        Ok((StatusCode::OK, Json(entry)).into_response())
    }

    /// Delete an entry, its chat thread, and its index membership
    async fn delete_entry(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(entry_id): Path<String>,
    ) -> Result<Response, AppError> {
        let user_id = resources.sessions.resolve_user(&headers).await?;
        let entry = Self::load_owned_entry(&resources, &entry_id, user_id).await?;

        let deleted = resources.database.delete_entry(&entry).await?;
        if !deleted {
            return Err(AppError::not_found("Journal entry"));
        }

        info!("Deleted journal entry {entry_id}");
        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "success": true })),
        )
            .into_response())
    }

    /// Fetch an entry and verify ownership; foreign entries read as absent
    async fn load_owned_entry(
        resources: &Arc<ServerResources>,
        entry_id: &str,
        user_id: Uuid,
    ) -> Result<JournalEntry, AppError> {
        let entry = resources
            .database
            .get_entry(entry_id)
            .await?
            .filter(|entry| entry.user_id == user_id)
            .ok_or_else(|| AppError::not_found("Journal entry"))?;
        Ok(entry)
    }
}

/// Validate the upsert request, returning the parsed calendar day
fn validate_upsert_request(request: &UpsertEntryRequest) -> Result<NaiveDate, AppError> {
    for (field, value) in [
        ("Title", &request.title),
        ("Content", &request.content),
        ("Date", &request.date),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::missing_field(field));
        }
    }

    NaiveDate::parse_from_str(&request.date, "%Y-%m-%d").map_err(|_| {
        AppError::invalid_format(format!(
            "Date '{}' must be formatted as yyyy-MM-dd",
            request.date
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(title: &str, content: &str, date: &str) -> UpsertEntryRequest {
        UpsertEntryRequest {
            title: title.into(),
            content: content.into(),
            date: date.into(),
        }
    }

    #[test]
    fn test_validate_accepts_well_formed_request() {
        let day = validate_upsert_request(&request("T", "C", "2024-01-01")).unwrap();
        assert_eq!(day, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn test_validate_rejects_empty_fields() {
        assert!(validate_upsert_request(&request("", "C", "2024-01-01")).is_err());
        assert!(validate_upsert_request(&request("T", "  ", "2024-01-01")).is_err());
        assert!(validate_upsert_request(&request("T", "C", "")).is_err());
    }

    #[test]
    fn test_validate_rejects_malformed_dates() {
        assert!(validate_upsert_request(&request("T", "C", "01/01/2024")).is_err());
        assert!(validate_upsert_request(&request("T", "C", "2024-13-01")).is_err());
        assert!(validate_upsert_request(&request("T", "C", "yesterday")).is_err());
    }
}
