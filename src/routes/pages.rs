// ABOUTME: Static page routes serving the site's HTML without any handler logic
// ABOUTME: Maps each browser-facing path to a file under the templates directory
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriLens

//! Static page routes
//!
//! The site's pages are plain HTML files; these routes only hand bytes
//! back. Asset serving for `/static` lives in the server assembly via
//! `tower-http`'s `ServeDir`.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use tracing::warn;

use crate::server::AppState;

/// Browser-facing path to template file mapping
const PAGES: &[(&str, &str)] = &[
    ("/", "food.html"),
    ("/morerecipe.html", "morerecipe.html"),
    ("/about.html", "about.html"),
    ("/altrecp", "altrecp.html"),
    ("/recipe.html", "recipe.html"),
    ("/avoidfoods", "avoidfoods.html"),
    ("/nutrical.html", "nutrical.html"),
    ("/AI", "AI.html"),
    ("/foodswap", "foodswap.html"),
];

/// Static page handlers
pub struct PageRoutes;

impl PageRoutes {
    /// Create all page routes
    pub fn routes(state: Arc<AppState>) -> Router {
        let mut router = Router::new();
        for &(path, file) in PAGES {
            router = router.route(
                path,
                get(move |state: State<Arc<AppState>>| Self::serve_page(state, file)),
            );
        }
        router.with_state(state)
    }

    /// Serve one HTML file from the templates directory
    async fn serve_page(State(state): State<Arc<AppState>>, file: &'static str) -> Response {
        let path = state.config.assets.templates_dir.join(file);
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Html(contents).into_response(),
            Err(e) => {
                warn!(page = file, error = %e, "Failed to read page template");
                (StatusCode::NOT_FOUND, "page not found").into_response()
            }
        }
    }
}
