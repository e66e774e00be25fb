// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Handles environment variables and runtime configuration parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Reverie

//! Environment-based configuration management

use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Default HTTP port
const DEFAULT_HTTP_PORT: u16 = 8081;

/// Default SQLite database URL
const DEFAULT_DATABASE_URL: &str = "sqlite:./data/reverie.db";

/// Default AI gateway base URL
const DEFAULT_AI_GATEWAY_URL: &str = "http://localhost:5005";

/// Default session lifetime in hours
const DEFAULT_SESSION_TTL_HOURS: u64 = 24 * 7;

/// Default connect timeout for gateway calls, seconds
const DEFAULT_GATEWAY_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default request timeout for gateway calls, seconds.
/// Gateway calls must be bounded so a slow upstream cannot pin a request forever.
const DEFAULT_GATEWAY_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Server configuration loaded from the environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// Database connection URL
    pub database_url: String,
    /// Base URL of the external AI summarization/chat service
    pub ai_gateway_url: String,
    /// Session lifetime
    pub session_ttl: Duration,
    /// Connect timeout for outbound gateway calls
    pub gateway_connect_timeout: Duration,
    /// Request timeout for outbound gateway calls
    pub gateway_request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: DEFAULT_HTTP_PORT,
            database_url: DEFAULT_DATABASE_URL.into(),
            ai_gateway_url: DEFAULT_AI_GATEWAY_URL.into(),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_HOURS * 3600),
            gateway_connect_timeout: Duration::from_secs(DEFAULT_GATEWAY_CONNECT_TIMEOUT_SECS),
            gateway_request_timeout: Duration::from_secs(DEFAULT_GATEWAY_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// Reads:
    /// - `HTTP_PORT`: listen port (default 8081)
    /// - `DATABASE_URL`: SQLite URL (default `sqlite:./data/reverie.db`)
    /// - `AI_GATEWAY_URL`: AI service base URL (default `http://localhost:5005`)
    /// - `SESSION_TTL_HOURS`: session lifetime (default 168)
    /// - `AI_GATEWAY_TIMEOUT_SECS`: request timeout for gateway calls (default 60)
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but fails to parse.
    pub fn from_env() -> AppResult<Self> {
        let defaults = Self::default();

        let http_port = parse_env("HTTP_PORT", defaults.http_port)?;
        let database_url = env::var("DATABASE_URL").unwrap_or(defaults.database_url);
        let ai_gateway_url = env::var("AI_GATEWAY_URL").unwrap_or(defaults.ai_gateway_url);
        let session_ttl_hours = parse_env("SESSION_TTL_HOURS", DEFAULT_SESSION_TTL_HOURS)?;
        let request_timeout_secs = parse_env(
            "AI_GATEWAY_TIMEOUT_SECS",
            DEFAULT_GATEWAY_REQUEST_TIMEOUT_SECS,
        )?;

        Ok(Self {
            http_port,
            database_url,
            ai_gateway_url,
            session_ttl: Duration::from_secs(session_ttl_hours * 3600),
            gateway_connect_timeout: defaults.gateway_connect_timeout,
            gateway_request_timeout: Duration::from_secs(request_timeout_secs),
        })
    }

    /// One-line configuration summary for startup logging
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "port={} database={} gateway={} session_ttl={}h",
            self.http_port,
            self.database_url,
            self.ai_gateway_url,
            self.session_ttl.as_secs() / 3600
        )
    }
}

/// Parse an environment variable, falling back to a default when unset
fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> AppResult<T> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| AppError::config(format!("Invalid value for {name}: {raw}"))),
        Err(_) => Ok(default),
    }
}
