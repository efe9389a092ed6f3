// ABOUTME: HTTP server assembly holding shared state, middleware layers, and the run loop
// ABOUTME: Builds the axum router from route groups and serves it with graceful shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriLens

//! # Server Assembly
//!
//! [`AppState`] carries the explicitly constructed completion provider and
//! the resolved configuration; every handler receives it through axum's
//! `State` extractor. There is no other shared mutable state - requests are
//! independent and nothing is coordinated across them.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{extract::DefaultBodyLimit, Router};
use http::{header::HeaderName, HeaderValue, Method};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::{
    config::ServerConfig,
    llm::{CompletionProvider, GeminiProvider},
    routes::{FoodRoutes, HealthRoutes, PageRoutes},
};

/// Headroom added to the outbound completion bound for the inbound timeout
const INBOUND_TIMEOUT_HEADROOM: Duration = Duration::from_secs(15);

/// Shared state injected into every handler
pub struct AppState {
    /// Completion provider; `None` when no credential was configured
    pub provider: Option<Arc<dyn CompletionProvider>>,
    /// Resolved server configuration
    pub config: ServerConfig,
}

impl AppState {
    /// Build state from configuration, constructing the Gemini provider
    /// when a credential is present
    #[must_use]
    pub fn from_config(config: ServerConfig) -> Self {
        let provider = config.gemini.api_key.clone().map(|api_key| {
            Arc::new(
                GeminiProvider::new(api_key)
                    .with_default_model(config.gemini.model.clone())
                    .with_timeout(config.gemini.timeout),
            ) as Arc<dyn CompletionProvider>
        });
        Self { provider, config }
    }

    /// Build state around an already-constructed provider
    ///
    /// This is the seam test doubles plug into: any [`CompletionProvider`]
    /// can stand in for the real vendor.
    #[must_use]
    pub fn with_provider(config: ServerConfig, provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            provider: Some(provider),
            config,
        }
    }
}

/// Assemble the full application router
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = setup_cors(&state.config);
    let inbound_timeout = state
        .config
        .gemini
        .timeout
        .saturating_add(INBOUND_TIMEOUT_HEADROOM);
    let static_dir = state.config.assets.static_dir.clone();
    let max_upload_bytes = state.config.http.max_upload_bytes;

    Router::new()
        .merge(FoodRoutes::routes(Arc::clone(&state)))
        .merge(PageRoutes::routes(Arc::clone(&state)))
        .merge(HealthRoutes::routes())
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TimeoutLayer::new(inbound_timeout))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Configure CORS settings for the HTTP API
///
/// Uses the `CORS_ORIGINS` configuration: wildcard for development, a
/// specific origin list for production.
fn setup_cors(config: &ServerConfig) -> CorsLayer {
    let origins = &config.http.cors_origins;
    let allow_origin = if origins.is_empty() || origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| HeaderValue::from_str(o).ok())
            .collect();
        if parsed.is_empty() {
            AllowOrigin::any()
        } else {
            AllowOrigin::list(parsed)
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("accept"),
            HeaderName::from_static("origin"),
            HeaderName::from_static("x-requested-with"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
}

/// Bind and serve until a shutdown signal arrives
///
/// # Errors
///
/// Returns an error if the listener fails to bind or the server fails
/// while running.
pub async fn run(config: ServerConfig) -> Result<()> {
    let state = Arc::new(AppState::from_config(config));
    let router = build_router(Arc::clone(&state));

    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.http_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("HTTP server listening on http://{addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Resolve when the process receives ctrl-c
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
