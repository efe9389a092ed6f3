// ABOUTME: Unified error handling with standard error codes and in-band failure responses
// ABOUTME: Defines AppError, ErrorCode, and the uniform JSON failure envelope sent to clients
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriLens

//! # Unified Error Handling System
//!
//! This module provides the centralized error handling for the NutriLens server.
//! It defines standard error types and error codes, plus the uniform failure
//! envelope the browser client receives.
//!
//! Unlike a conventional REST API, failures from the AI-backed endpoints are
//! reported **in-band**: the handler responds with HTTP 200 and a body of
//! `{"success": false, "error": "...", "error_type": "..."}`. Nothing from a
//! handler propagates as an unhandled fault to the client.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Standard error codes used throughout the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Validation (3000-3999)
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput = 3000,

    // External Services (5000-5999)
    #[serde(rename = "EXTERNAL_SERVICE_ERROR")]
    ExternalServiceError = 5000,
    #[serde(rename = "EXTERNAL_RATE_LIMITED")]
    ExternalRateLimited = 5003,

    // Configuration (6000-6999)
    #[serde(rename = "CONFIG_ERROR")]
    ConfigError = 6000,

    // Completion Response Normalization (7000-7999)
    #[serde(rename = "PARSE_ERROR")]
    ParseError = 7000,
    #[serde(rename = "SCHEMA_ERROR")]
    SchemaError = 7001,

    // Internal Errors (9000-9999)
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
}

impl ErrorCode {
    /// Get the wire name of this error code as sent in `error_type`
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "INVALID_INPUT",
            Self::ExternalServiceError => "EXTERNAL_SERVICE_ERROR",
            Self::ExternalRateLimited => "EXTERNAL_RATE_LIMITED",
            Self::ConfigError => "CONFIG_ERROR",
            Self::ParseError => "PARSE_ERROR",
            Self::SchemaError => "SCHEMA_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::InvalidInput => "The provided input is invalid",
            Self::ExternalServiceError => "The AI completion service encountered an error",
            Self::ExternalRateLimited => "The AI completion service rate limit was exceeded",
            Self::ConfigError => "Configuration error encountered",
            Self::ParseError => "The AI response could not be parsed as JSON",
            Self::SchemaError => "The AI response is missing required structure",
            Self::InternalError => "An internal server error occurred",
        }
    }
}

/// Unified error type for the application
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Convenience functions for creating common errors
impl AppError {
    /// Invalid or missing request input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Completion text is not valid JSON and no recoverable JSON substring exists
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ParseError, message)
    }

    /// Parsed JSON lacks the required structure
    pub fn schema(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SchemaError, message)
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// External service error
    pub fn external_service(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ExternalServiceError,
            format!("{}: {}", service.into(), message.into()),
        )
    }

    /// Internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

/// In-band failure envelope sent to the browser client
///
/// Serialized with HTTP 200: the front-end inspects `success`, not the
/// status code.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiFailure {
    /// Always `false`
    pub success: bool,
    /// Human-readable error message
    pub error: String,
    /// Wire name of the error code
    pub error_type: String,
}

impl From<AppError> for ApiFailure {
    fn from(error: AppError) -> Self {
        Self {
            success: false,
            error: error.message,
            error_type: error.code.as_str().to_owned(),
        }
    }
}

/// Conversion from `anyhow::Error` for handler catch-all paths
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::new(ErrorCode::InternalError, error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_wire_names() {
        assert_eq!(ErrorCode::ParseError.as_str(), "PARSE_ERROR");
        assert_eq!(ErrorCode::SchemaError.as_str(), "SCHEMA_ERROR");
        assert_eq!(ErrorCode::ConfigError.as_str(), "CONFIG_ERROR");
        assert_eq!(ErrorCode::InvalidInput.as_str(), "INVALID_INPUT");
    }

    #[test]
    fn test_api_failure_from_app_error() {
        let failure = ApiFailure::from(AppError::schema("Missing required field: calories"));

        assert!(!failure.success);
        assert_eq!(failure.error, "Missing required field: calories");
        assert_eq!(failure.error_type, "SCHEMA_ERROR");
    }

    #[test]
    fn test_api_failure_serialization() {
        let failure = ApiFailure::from(AppError::parse("unexpected token"));
        let json = serde_json::to_value(&failure).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["error_type"], "PARSE_ERROR");
    }
}
