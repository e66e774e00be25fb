// ABOUTME: User status database operations
// ABOUTME: One profile-summary row per user, created once and updated in place

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::UserStatus;
use chrono::Utc;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create the user status table
    pub(super) async fn migrate_user_status(&self) -> AppResult<()> {
        // user_id as the primary key gives the one-status-per-user
        // invariant; a second insert is a conflict, not a replace.
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS user_status (
                user_id TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
                summary TEXT NOT NULL,
                created_at DATETIME NOT NULL,
                updated_at DATETIME NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Create the user's status row
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` if the user already has a status, or
    /// a database error on failure.
    pub async fn create_user_status(&self, status: &UserStatus) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO user_status (user_id, summary, created_at, updated_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(status.user_id.to_string())
        .bind(&status.summary)
        .bind(status.created_at)
        .bind(status.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::already_exists("User status already exists for this user")
            }
            _ => AppError::from(e),
        })?;

        Ok(())
    }

    /// Get the user's status row, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_user_status(&self, user_id: Uuid) -> AppResult<Option<UserStatus>> {
        let row = sqlx::query(
            "SELECT user_id, summary, created_at, updated_at FROM user_status WHERE user_id = $1",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(UserStatus {
            user_id,
            summary: row.get("summary"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }))
    }

    /// Overwrite the summary of an existing status row
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails; the returned count is
    /// zero when no status row exists for the user.
    pub async fn update_user_status(&self, user_id: Uuid, summary: &str) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE user_status SET summary = $2, updated_at = $3 WHERE user_id = $1",
        )
        .bind(user_id.to_string())
        .bind(summary)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Delete the user's status row
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails; the returned count is
    /// zero when no status row exists for the user.
    pub async fn delete_user_status(&self, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM user_status WHERE user_id = $1")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
