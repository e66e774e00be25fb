// ABOUTME: Shared server resources threaded through route handlers
// ABOUTME: Bundles database, session manager, AI gateway, and configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Reverie

//! Centralized dependency container for route handlers

use crate::auth::SessionManager;
use crate::config::ServerConfig;
use crate::database::Database;
use crate::llm::AiGateway;
use std::sync::Arc;

/// Shared resources available to every request handler
pub struct ServerResources {
    /// Persistent store for all aggregates
    pub database: Database,
    /// Session guard
    pub sessions: SessionManager,
    /// External AI service client
    pub gateway: Arc<dyn AiGateway>,
    /// Server configuration
    pub config: ServerConfig,
}

impl ServerResources {
    /// Create the resource bundle
    #[must_use]
    pub fn new(database: Database, gateway: Arc<dyn AiGateway>, config: ServerConfig) -> Self {
        let sessions = SessionManager::new(database.clone(), config.session_ttl);
        Self {
            database,
            sessions,
            gateway,
            config,
        }
    }
}
