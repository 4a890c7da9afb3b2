// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Crucible Server CLI
//!
//! The `crucible` binary wires configuration, logging, storage, and the two
//! external model services together and serves the HTTP surface.
//!
//! ## Configuration
//!
//! - `ANTHROPIC_API_KEY` (required) - reasoning service credentials
//! - `ANTHROPIC_MODEL` (optional) - reasoning model override
//! - `HUGGINGFACE_TOKEN` (optional) - calibrated forecasting; absence means
//!   validations run without a calibrated estimate, silently
//! - `DATABASE_URL` (optional) - PostgreSQL graph store; absence selects the
//!   in-memory store

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use clap::{Parser, Subcommand};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crucible_core::application::StandardIntelligenceService;
use crucible_core::infrastructure::db::Database;
use crucible_core::infrastructure::forecaster::OpenForecastClient;
use crucible_core::infrastructure::llm::AnthropicReasoner;
use crucible_core::infrastructure::repositories::postgres::{
    init_schema, PostgresConnectionRepository, PostgresIdeaRepository, PostgresProjectRepository,
};
use crucible_core::infrastructure::repositories::InMemoryGraphStore;
use crucible_core::presentation::{app, AppState};

/// Crucible - strategic intelligence for discovering paths to your goals
#[derive(Parser)]
#[command(name = "crucible")]
#[command(version, about, long_about = None)]
struct Cli {
    /// HTTP API host
    #[arg(long, global = true, env = "CRUCIBLE_HOST", default_value = "127.0.0.1")]
    host: String,

    /// HTTP API port
    #[arg(long, global = true, env = "CRUCIBLE_PORT", default_value = "8000")]
    port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "CRUCIBLE_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API server (default)
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(&cli.host, cli.port).await,
    }
}

async fn serve(host: &str, port: u16) -> Result<()> {
    let api_key = std::env::var("ANTHROPIC_API_KEY")
        .context("ANTHROPIC_API_KEY is required for the reasoning service")?;
    let reasoning = Arc::new(match std::env::var("ANTHROPIC_MODEL") {
        Ok(model) => AnthropicReasoner::new(api_key, model),
        Err(_) => AnthropicReasoner::with_default_model(api_key),
    });

    let forecaster = Arc::new(OpenForecastClient::from_token(
        std::env::var("HUGGINGFACE_TOKEN").ok(),
    ));
    if forecaster.is_enabled() {
        info!("calibrated forecasting enabled");
    } else {
        info!("calibrated forecasting disabled (no HUGGINGFACE_TOKEN)");
    }

    let intelligence = Arc::new(StandardIntelligenceService::new(reasoning, forecaster));

    let state = match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let db = Database::new(&url).await.context("connecting to PostgreSQL")?;
            init_schema(db.get_pool()).await.context("initializing schema")?;
            info!("graph store: PostgreSQL");
            Arc::new(AppState {
                projects: Arc::new(PostgresProjectRepository::new(db.get_pool().clone())),
                ideas: Arc::new(PostgresIdeaRepository::new(db.get_pool().clone())),
                connections: Arc::new(PostgresConnectionRepository::new(db.get_pool().clone())),
                intelligence,
            })
        }
        Err(_) => {
            info!("graph store: in-memory (set DATABASE_URL for persistence)");
            let store = InMemoryGraphStore::new();
            Arc::new(AppState {
                projects: Arc::new(store.clone()),
                ideas: Arc::new(store.clone()),
                connections: Arc::new(store),
                intelligence,
            })
        }
    };

    // CORS for the canvas frontend
    let cors = CorsLayer::new()
        .allow_origin([
            "http://localhost:3000".parse::<HeaderValue>()?,
            "http://localhost:3001".parse::<HeaderValue>()?,
            "http://127.0.0.1:3001".parse::<HeaderValue>()?,
        ])
        .allow_methods(Any)
        .allow_headers(Any);

    let router = app(state).layer(cors);

    let listener = tokio::net::TcpListener::bind((host, port))
        .await
        .with_context(|| format!("binding {}:{}", host, port))?;
    info!("listening on {}:{}", host, port);

    axum::serve(listener, router).await?;
    Ok(())
}
