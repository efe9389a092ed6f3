// ABOUTME: Main library entry point for the NutriLens food information platform
// ABOUTME: Exposes AI-backed nutrition endpoints, response normalization, and server assembly
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriLens

#![deny(unsafe_code)]

//! # NutriLens Server
//!
//! The back-end of a food/nutrition information site. Browser-facing
//! endpoints proxy user input - a food name, a food item, a health
//! condition, or an uploaded photo - to a generative AI completion
//! service, normalize the free-text reply into strict JSON, and return it
//! with a uniform response envelope.
//!
//! ## Architecture
//!
//! - **Normalizer**: converts decorated completion text into
//!   schema-validated JSON (the core of the crate)
//! - **LLM**: narrow completion-provider interface with a Gemini
//!   implementation
//! - **Routes**: thin axum handlers, one module per endpoint family
//! - **Config**: environment-only configuration resolved once at startup
//! - **Server**: state construction, middleware stack, and the run loop
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use nutrilens::config::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     nutrilens::server::run(config).await
//! }
//! ```

/// Configuration management
pub mod config;

/// Unified error handling system with standard error codes
pub mod errors;

/// Completion provider abstraction and the Gemini implementation
pub mod llm;

/// Logging configuration and structured logging setup
pub mod logging;

/// Completion response normalization (fence stripping, parsing, schemas)
pub mod normalizer;

/// HTTP route handlers organized by domain
pub mod routes;

/// Server state, router assembly, and run loop
pub mod server;
