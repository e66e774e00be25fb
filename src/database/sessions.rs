// ABOUTME: Session store database operations
// ABOUTME: One live token per user, replaced on re-login, validated with a TTL

use super::Database;
use crate::errors::AppResult;
use crate::models::Session;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create the sessions table
    pub(super) async fn migrate_sessions(&self) -> AppResult<()> {
        // UNIQUE(user_id) gives the one-live-token-per-user invariant;
        // re-issuing a session replaces the prior row.
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS sessions (
                user_id TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
                token TEXT UNIQUE NOT NULL,
                created_at DATETIME NOT NULL,
                expires_at DATETIME NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_sessions_token ON sessions(token)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Store a session, replacing any prior session for the same user
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn upsert_session(&self, session: &Session) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO sessions (user_id, token, created_at, expires_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT(user_id) DO UPDATE SET
                token = excluded.token,
                created_at = excluded.created_at,
                expires_at = excluded.expires_at
            ",
        )
        .bind(session.user_id.to_string())
        .bind(&session.token)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Look up a session by its opaque token
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_session(&self, token: &str) -> AppResult<Option<Session>> {
        let row = sqlx::query(
            "SELECT user_id, token, created_at, expires_at FROM sessions WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let user_id_raw: String = row.get("user_id");
        let user_id = Uuid::parse_str(&user_id_raw).map_err(|e| {
            crate::errors::AppError::database(format!("Malformed user id '{user_id_raw}': {e}"))
        })?;

        Ok(Some(Session {
            token: row.get("token"),
            user_id,
            created_at: row.get("created_at"),
            expires_at: row.get("expires_at"),
        }))
    }

    /// Delete the session for a user, if any (logout)
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn delete_session(&self, user_id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
