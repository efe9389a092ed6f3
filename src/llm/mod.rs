// ABOUTME: Completion provider abstraction for pluggable AI text/vision generation
// ABOUTME: Defines the narrow generate/generateFromImage contract handlers depend on
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriLens

//! # Completion Provider Service Provider Interface
//!
//! This module defines the contract an AI completion vendor must implement to
//! back the NutriLens endpoints. The surface is deliberately narrow - a
//! prompt in, free text out, optionally conditioned on an image - so that
//! the response normalizer and the handlers can be tested against canned
//! providers without network access.
//!
//! The provider is constructed once at startup and injected into handlers
//! through shared state; there is no process-wide model handle.
//!
//! ## Example: Using a Provider
//!
//! ```rust,no_run
//! use nutrilens::llm::CompletionProvider;
//!
//! async fn example(provider: &dyn CompletionProvider) {
//!     let text = provider
//!         .generate("Provide detailed nutritional information for kiwi.")
//!         .await;
//! }
//! ```

pub mod gemini;
pub mod prompts;

pub use gemini::GeminiProvider;

use async_trait::async_trait;
use bytes::Bytes;

use crate::errors::AppError;

/// Image attached to a vision completion request
#[derive(Debug, Clone)]
pub struct ImagePayload {
    /// Raw image bytes as received from the upload
    pub data: Bytes,
    /// MIME type reported by the upload (e.g. `image/jpeg`)
    pub mime_type: String,
}

impl ImagePayload {
    /// Create an image payload from raw bytes and a MIME type
    pub fn new(data: impl Into<Bytes>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// Completion provider trait for one-shot text and vision generation
///
/// Implement this trait to add a new AI vendor to NutriLens. The design
/// follows the async trait pattern for compatibility with the tokio-based
/// runtime.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Unique provider identifier (e.g., "gemini")
    fn name(&self) -> &'static str;

    /// Human-readable display name for the provider
    fn display_name(&self) -> &'static str;

    /// Default model used for requests
    fn default_model(&self) -> &str;

    /// Generate free text for a prompt
    async fn generate(&self, prompt: &str) -> Result<String, AppError>;

    /// Generate free text for a prompt conditioned on an image
    async fn generate_from_image(
        &self,
        prompt: &str,
        image: &ImagePayload,
    ) -> Result<String, AppError>;

    /// Check if the provider is reachable and the API key is valid
    async fn health_check(&self) -> Result<bool, AppError>;
}
