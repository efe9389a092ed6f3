// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides canned completion providers and server state builders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriLens

#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
#![allow(missing_docs)]

//! Shared test utilities for `nutrilens`
//!
//! Canned completion providers stand in for the Gemini vendor so handler
//! behavior can be exercised without network access.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use nutrilens::{
    config::{AssetsConfig, GeminiConfig, HttpConfig, ServerConfig},
    errors::AppError,
    llm::{CompletionProvider, ImagePayload},
    server::{build_router, AppState},
};

/// Provider returning one fixed response for every request
///
/// Prompts are recorded so tests can assert what the handlers sent.
pub struct CannedProvider {
    response: String,
    pub prompts: Mutex<Vec<String>>,
}

impl CannedProvider {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CompletionProvider for CannedProvider {
    fn name(&self) -> &'static str {
        "canned"
    }

    fn display_name(&self) -> &'static str {
        "Canned Test Provider"
    }

    fn default_model(&self) -> &str {
        "canned-model"
    }

    async fn generate(&self, prompt: &str) -> Result<String, AppError> {
        self.prompts.lock().unwrap().push(prompt.to_owned());
        Ok(self.response.clone())
    }

    async fn generate_from_image(
        &self,
        prompt: &str,
        _image: &ImagePayload,
    ) -> Result<String, AppError> {
        self.prompts.lock().unwrap().push(prompt.to_owned());
        Ok(self.response.clone())
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        Ok(true)
    }
}

/// Provider failing every request with an external-service error
pub struct FailingProvider;

#[async_trait]
impl CompletionProvider for FailingProvider {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn display_name(&self) -> &'static str {
        "Failing Test Provider"
    }

    fn default_model(&self) -> &str {
        "failing-model"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, AppError> {
        Err(AppError::external_service("test", "completion call failed"))
    }

    async fn generate_from_image(
        &self,
        _prompt: &str,
        _image: &ImagePayload,
    ) -> Result<String, AppError> {
        Err(AppError::external_service("test", "completion call failed"))
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        Ok(false)
    }
}

/// Configuration for tests; no environment access involved
pub fn test_config() -> ServerConfig {
    ServerConfig {
        http_port: 0,
        gemini: GeminiConfig {
            api_key: Some("test-key".to_owned()),
            model: "canned-model".to_owned(),
            timeout: Duration::from_secs(5),
        },
        http: HttpConfig {
            cors_origins: vec!["*".to_owned()],
            max_upload_bytes: 1024 * 1024,
        },
        assets: AssetsConfig {
            templates_dir: PathBuf::from("templates"),
            static_dir: PathBuf::from("static"),
        },
    }
}

/// Full router backed by an arbitrary provider
pub fn router_with_provider(provider: Arc<dyn CompletionProvider>) -> Router {
    build_router(Arc::new(AppState::with_provider(test_config(), provider)))
}

/// Full router backed by a canned provider returning `response`
pub fn canned_router(response: &str) -> Router {
    router_with_provider(Arc::new(CannedProvider::new(response)))
}

/// Full router with no completion provider configured
pub fn unconfigured_router() -> Router {
    let mut config = test_config();
    config.gemini.api_key = None;
    build_router(Arc::new(AppState {
        provider: None,
        config,
    }))
}
