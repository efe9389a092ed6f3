// ABOUTME: Server binary wiring configuration, logging, and the HTTP run loop
// ABOUTME: Production entry point for the NutriLens food information API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriLens

//! # NutriLens Server Binary
//!
//! Starts the NutriLens HTTP API: static site pages plus the AI-backed
//! food endpoints.

use anyhow::Result;
use clap::Parser;
use nutrilens::{config::ServerConfig, logging, server};
use tracing::info;

#[derive(Parser)]
#[command(name = "nutrilens-server")]
#[command(about = "NutriLens - AI-backed nutrition info API")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Handle container environments where clap may not work properly
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Argument parsing failed: {e}");
            eprintln!("Using default configuration");
            Args { http_port: None }
        }
    };

    // Load configuration from environment
    let mut config = ServerConfig::from_env()?;

    // Override port if specified
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    // Initialize production logging
    logging::init_from_env()?;

    info!("Starting NutriLens server");
    info!("{}", config.summary());

    server::run(config).await
}
