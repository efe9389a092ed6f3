// ABOUTME: Environment-based server configuration resolved once at startup
// ABOUTME: Covers HTTP binding, Gemini credentials, asset directories, and CORS origins
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriLens

//! # Server Configuration
//!
//! Environment-only configuration, loaded once in `main` and shared through
//! application state. The Gemini credential is resolved here into an
//! explicit configured/unconfigured state; request handlers never compare
//! key strings against sentinels.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Default HTTP port (matches the site the front-end was written against)
const DEFAULT_HTTP_PORT: u16 = 5000;

/// Default Gemini model
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Default outbound completion timeout in seconds
const DEFAULT_GEMINI_TIMEOUT_SECS: u64 = 30;

/// Default cap on multipart upload size in bytes (10 MiB)
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Gemini completion service configuration
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key; `None` when the service is unconfigured
    pub api_key: Option<String>,
    /// Model identifier for all completion requests
    pub model: String,
    /// Bound on every outbound completion call
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Whether a usable credential was present at startup
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

/// HTTP server behavior configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Comma-separated CORS origins, `*` for any
    pub cors_origins: Vec<String>,
    /// Cap on multipart upload size in bytes
    pub max_upload_bytes: usize,
}

/// Static asset locations served without logic
#[derive(Debug, Clone)]
pub struct AssetsConfig {
    /// Directory holding the HTML pages
    pub templates_dir: PathBuf,
    /// Directory holding CSS/JS/image assets
    pub static_dir: PathBuf,
}

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP API port
    pub http_port: u16,
    /// Gemini completion service settings
    pub gemini: GeminiConfig,
    /// HTTP behavior settings
    pub http: HttpConfig,
    /// Static asset locations
    pub assets: AssetsConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error when a set variable fails to parse (e.g. a
    /// non-numeric `HTTP_PORT`). Unset variables fall back to defaults.
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        if let Err(e) = dotenvy::dotenv() {
            warn!("No .env file found or failed to load: {}", e);
        }

        let api_key = env::var("GEMINI_API_KEY")
            .ok()
            .map(|k| k.trim().to_owned())
            .filter(|k| !k.is_empty());
        if api_key.is_none() {
            warn!("GEMINI_API_KEY not set; AI-backed endpoints will refuse requests");
        }

        Ok(Self {
            http_port: env_var_or("HTTP_PORT", &DEFAULT_HTTP_PORT.to_string())?
                .parse()
                .context("Invalid HTTP_PORT value")?,
            gemini: GeminiConfig {
                api_key,
                model: env_var_or("GEMINI_MODEL", DEFAULT_GEMINI_MODEL)?,
                timeout: Duration::from_secs(
                    env_var_or(
                        "GEMINI_TIMEOUT_SECS",
                        &DEFAULT_GEMINI_TIMEOUT_SECS.to_string(),
                    )?
                    .parse()
                    .context("Invalid GEMINI_TIMEOUT_SECS value")?,
                ),
            },
            http: HttpConfig {
                cors_origins: parse_origins(&env_var_or("CORS_ORIGINS", "*")?),
                max_upload_bytes: env_var_or(
                    "MAX_UPLOAD_BYTES",
                    &DEFAULT_MAX_UPLOAD_BYTES.to_string(),
                )?
                .parse()
                .context("Invalid MAX_UPLOAD_BYTES value")?,
            },
            assets: AssetsConfig {
                templates_dir: PathBuf::from(env_var_or("TEMPLATES_DIR", "templates")?),
                static_dir: PathBuf::from(env_var_or("STATIC_DIR", "static")?),
            },
        })
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "NutriLens Server Configuration:\n\
             - HTTP Port: {}\n\
             - Gemini: {}\n\
             - Gemini Model: {}\n\
             - Completion Timeout: {}s\n\
             - CORS Origins: {}\n\
             - Templates Dir: {}\n\
             - Static Dir: {}",
            self.http_port,
            if self.gemini.is_configured() {
                "Configured"
            } else {
                "Not configured"
            },
            self.gemini.model,
            self.gemini.timeout.as_secs(),
            self.http.cors_origins.join(","),
            self.assets.templates_dir.display(),
            self.assets.static_dir.display(),
        )
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> Result<String> {
    Ok(env::var(key).unwrap_or_else(|_| default.to_owned()))
}

/// Parse comma-separated CORS origins
fn parse_origins(origins_str: &str) -> Vec<String> {
    if origins_str == "*" {
        vec!["*".to_owned()]
    } else {
        origins_str
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect()
    }
}
