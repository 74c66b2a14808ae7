// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! BudgetLink Server - hosts budget/3D linking sessions.
//!
//! The browser dashboard posts its decoded budget lines and scene element
//! names, then toggles budget codes; every toggle answers with the
//! `setMaterial` calls the renderer has to replay. The manual link tooling
//! (validate, export, import) serves offline curation before deploy.
//!
//! # Endpoints
//!
//! - `GET /api/v1/health` - Health check
//! - `POST /api/v1/sessions` - Create a session and build its index
//! - `GET /api/v1/sessions/:id/index` - Correspondence index
//! - `POST /api/v1/sessions/:id/toggle` - Toggle a budget code
//! - `POST /api/v1/sessions/:id/clear` - Clear the selection
//! - `GET /api/v1/sessions/:id/report` - Coverage report
//! - `DELETE /api/v1/sessions/:id` - Close a session
//! - `POST /api/v1/links/validate` - Validate a linking config
//! - `POST /api/v1/links/export` - Export as JSON or CSV
//! - `POST /api/v1/links/import` - Import from JSON or CSV
//! - `GET /api/v1/patterns/:code` - Patterns for a budget code

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use budget_link_core::PatternTable;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

mod config;
mod error;
mod routes;
mod services;
mod types;

use config::Config;
use services::SessionStore;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub patterns: Arc<PatternTable>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, patterns: PatternTable) -> Self {
        Self {
            sessions: Arc::new(SessionStore::new(config.max_sessions)),
            patterns: Arc::new(patterns),
            config: Arc::new(config),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,tower_http=debug,budget_link_server=debug".into()),
        )
        .pretty()
        .init();

    let config = Config::from_env();
    let patterns = config.load_pattern_table()?;

    tracing::info!(
        port = config.port,
        max_sessions = config.max_sessions,
        max_body_size_mb = config.max_body_size_mb,
        curated_codes = patterns.entries.len(),
        pattern_table = config.pattern_table_path.as_deref().unwrap_or("built-in"),
        "Starting BudgetLink Server"
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = app(AppState::new(config, patterns));

    tracing::info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

/// Builds the router with its middleware stack.
pub fn app(state: AppState) -> Router {
    let config = Arc::clone(&state.config);

    Router::new()
        // Root endpoint - API information
        .route("/", get(routes::health::info))
        // Health check
        .route("/api/v1/health", get(routes::health::check))
        // Linking sessions
        .route("/api/v1/sessions", post(routes::sessions::create))
        .route("/api/v1/sessions/:id", delete(routes::sessions::delete))
        .route("/api/v1/sessions/:id/index", get(routes::sessions::index))
        .route("/api/v1/sessions/:id/toggle", post(routes::sessions::toggle))
        .route("/api/v1/sessions/:id/clear", post(routes::sessions::clear))
        .route("/api/v1/sessions/:id/report", get(routes::sessions::report))
        // Manual link tooling
        .route("/api/v1/links/validate", post(routes::links::validate_config))
        .route("/api/v1/links/export", post(routes::links::export))
        .route("/api/v1/links/import", post(routes::links::import))
        // Pattern table
        .route("/api/v1/patterns/:code", get(routes::patterns::lookup))
        // Middleware
        .layer(DefaultBodyLimit::max(config.max_body_size_mb * 1024 * 1024))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}
