// ABOUTME: Route module organization for NutriLens HTTP endpoints
// ABOUTME: Groups handlers by domain with thin route definitions per module
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriLens

//! Route modules for the NutriLens server
//!
//! Each domain module contains route definitions and thin handler functions.
//! The AI-backed food endpoints live in [`foods`]; [`pages`] serves the
//! site's HTML without logic; [`health`] provides monitoring endpoints.

/// AI-backed food information endpoints
pub mod foods;
/// Health check and system status routes
pub mod health;
/// Static page routes served without logic
pub mod pages;

/// Food endpoint route handlers
pub use foods::FoodRoutes;
/// Health check route handlers
pub use health::HealthRoutes;
/// Static page route handlers
pub use pages::PageRoutes;
