// ABOUTME: Server binary for the Reverie journaling backend
// ABOUTME: Wires configuration, database, AI gateway, and the HTTP router together

// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Reverie

//! # Reverie Server Binary
//!
//! Starts the journaling API with session authentication, `SQLite` storage,
//! and the external AI gateway client.

use anyhow::Result;
use clap::Parser;
use reverie_server::{
    config::ServerConfig, database::Database, llm::HttpAiGateway, logging,
    resources::ServerResources, routes,
};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "reverie-server")]
#[command(about = "Reverie - personal journaling API with AI summaries and chat")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override AI gateway base URL
    #[arg(long)]
    ai_gateway_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(ai_gateway_url) = args.ai_gateway_url {
        config.ai_gateway_url = ai_gateway_url;
    }

    logging::init_from_env()?;

    info!("Starting Reverie journaling server");
    info!("{}", config.summary());

    let database = Database::new(&config.database_url).await?;
    database.migrate().await?;
    info!("Database initialized: {}", config.database_url);

    let gateway = Arc::new(HttpAiGateway::new(&config)?);
    info!("AI gateway client ready: {}", config.ai_gateway_url);

    let resources = Arc::new(ServerResources::new(database, gateway, config.clone()));
    let app = routes::router(resources);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
