// ABOUTME: Configuration module organization for the NutriLens server
// ABOUTME: Centralizes environment-driven settings behind typed config structs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriLens

//! Configuration management for NutriLens
//!
//! All configuration is environment-driven; there is no config file format.
//! [`environment::ServerConfig::from_env`] is the single entry point.

/// Environment variable based server configuration
pub mod environment;

pub use environment::{AssetsConfig, GeminiConfig, HttpConfig, ServerConfig};
