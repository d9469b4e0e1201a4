//! # UsPage Server
//!
//! CRUD web application for personalized couple landing pages and
//! Valentine-style yes/no invitations.
//!
//! ## Overview
//!
//! - **Accounts**: registration and login with opaque bearer tokens;
//!   issuing a token revokes the previous one of the same kind
//! - **Themes**: system presets plus per-user themes with an owned
//!   background image
//! - **Landings & Invitations**: per-user slugs, soft deletes, public
//!   slug pages, media galleries with attachment limits
//! - **Media**: multipart uploads into a blob store, guarded deletion
//!
//! ## Architecture
//!
//! The server is built on Axum and uses PostgreSQL for persistent
//! storage; every ownership, uniqueness and limit invariant lives in
//! `uspage-core`'s service layer.

mod handlers;
mod infra;
mod routes;

use std::sync::Arc;

use anyhow::Context;
use axum::{Router, extract::DefaultBodyLimit};
use clap::Parser;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use uspage_core::database::Database;
use uspage_core::storage::{LocalDiskStorage, StorageBackend};

use crate::infra::app_state::AppState;
use crate::infra::config::{Cli, Config};

/// Uploads are capped at 10 MiB; leave headroom for multipart framing.
const BODY_LIMIT_BYTES: usize = 12 * 1024 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    let config = Config::load(&args)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db = Database::connect(
        &config.database.url,
        config.database.max_connections,
    )
    .await?;
    db.migrate().await?;

    tokio::fs::create_dir_all(&config.storage.root)
        .await
        .with_context(|| {
            format!(
                "failed to create media root {}",
                config.storage.root.display()
            )
        })?;
    let storage: Arc<dyn StorageBackend> = Arc::new(LocalDiskStorage::new(
        &config.storage.root,
        &config.storage.public_base_url,
    ));

    info!(
        media_root = %config.storage.root.display(),
        public_base_url = %config.storage.public_base_url,
        "media storage ready"
    );

    let addr = std::net::SocketAddr::from((config.server.host, config.server.port));
    let media_root = config.storage.root.clone();
    let state = AppState::new(config, db, storage);

    let app = Router::new()
        .nest("/api", routes::create_api_router(state.clone()))
        .nest_service("/media", ServeDir::new(media_root))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("listening on {addr}");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
