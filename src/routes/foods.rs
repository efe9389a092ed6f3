// ABOUTME: Route handlers for the AI-backed food endpoints
// ABOUTME: Each handler proxies user input to the completion provider and normalizes the reply
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriLens

//! Food information routes
//!
//! Five endpoints share one shape: validate the input, render a prompt,
//! call the completion provider, run the reply through the response
//! normalizer, and answer with the uniform envelope. Failures are reported
//! in-band with HTTP 200; the outermost conversion in each handler
//! guarantees nothing propagates as an unhandled fault.

use std::sync::Arc;

use axum::{
    extract::{
        multipart::MultipartRejection, rejection::JsonRejection, Multipart, State,
    },
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::{
    errors::{ApiFailure, AppError, AppResult},
    llm::{prompts, CompletionProvider, ImagePayload},
    normalizer::{self, ArraySchema, ObjectSchema},
    server::AppState,
};

/// Fixed message for requests arriving before a credential was configured
const UNCONFIGURED_MESSAGE: &str =
    "Gemini API key not configured. Please set GEMINI_API_KEY environment variable.";

/// MIME type assumed when the upload does not declare one
const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// Required and numeric fields of a nutrition-info reply
const NUTRITION_SCHEMA: ObjectSchema = ObjectSchema {
    required: &[
        "name",
        "serving_size",
        "serving_weight",
        "calories",
        "protein",
        "carbohydrates",
        "fat",
        "fiber",
        "sugar",
        "sodium",
        "potassium",
        "benefits",
        "when_to_consume",
        "how_to_consume",
        "daily_recommendation",
    ],
    numeric: &[
        "serving_weight",
        "calories",
        "protein",
        "carbohydrates",
        "fat",
        "fiber",
        "sugar",
        "sodium",
        "potassium",
    ],
};

/// Shape of a find-alternatives reply: exactly two alternatives
const ALTERNATIVES_SCHEMA: ArraySchema = ArraySchema {
    expected_len: 2,
    element_required: &["name", "nutritionalInfo", "description"],
    numeric_map: "nutritionalInfo",
};

// ============================================================================
// Request Types
// ============================================================================

/// Request for nutrition information
#[derive(Debug, Deserialize)]
pub struct NutritionInfoRequest {
    /// Name of the food to look up
    #[serde(default)]
    pub food_name: String,
}

/// Request for recipe generation
#[derive(Debug, Deserialize)]
pub struct GenerateRecipeRequest {
    /// Food item the recipes must use
    #[serde(default)]
    pub food: String,
}

/// Request for healthy alternatives
#[derive(Debug, Deserialize)]
pub struct FindAlternativesRequest {
    /// Food item to find alternatives for
    #[serde(default)]
    pub food_item: String,
}

/// Request for dietary recommendations
#[derive(Debug, Deserialize)]
pub struct HealthRecommendationsRequest {
    /// Health condition to advise on
    #[serde(default)]
    pub health_conditions: String,
}

// ============================================================================
// Food Routes
// ============================================================================

/// Food endpoint handlers
pub struct FoodRoutes;

impl FoodRoutes {
    /// Create all food routes
    pub fn routes(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/get_nutrition_info", post(Self::get_nutrition_info))
            .route("/generate_recipe", post(Self::generate_recipe))
            .route("/find_alternatives", post(Self::find_alternatives))
            .route(
                "/get_health_recommendations",
                post(Self::get_health_recommendations),
            )
            .route("/identify_food", post(Self::identify_food))
            .with_state(state)
    }

    /// Resolve the completion provider, or fail with the fixed config message
    fn provider(state: &AppState) -> AppResult<&Arc<dyn CompletionProvider>> {
        state
            .provider
            .as_ref()
            .ok_or_else(|| AppError::config(UNCONFIGURED_MESSAGE))
    }

    /// Unwrap an extracted JSON body, reporting malformed bodies in-band
    fn request_body<T>(body: Result<Json<T>, JsonRejection>) -> AppResult<T> {
        body.map(|Json(request)| request)
            .map_err(|e| AppError::invalid_input(e.body_text()))
    }

    /// Convert a handler result into the uniform response envelope
    fn api_response(payload_key: &str, result: AppResult<Value>) -> Json<Value> {
        match result {
            Ok(value) => {
                let mut body = serde_json::Map::new();
                body.insert("success".to_owned(), Value::Bool(true));
                body.insert(payload_key.to_owned(), value);
                Json(Value::Object(body))
            }
            Err(error) => {
                warn!(code = error.code.as_str(), error = %error.message, "Request failed");
                let failure = ApiFailure::from(error);
                serde_json::to_value(&failure).map_or_else(
                    |_| {
                        Json(json!({
                            "success": false,
                            "error": "Failed to serialize error response",
                            "error_type": "INTERNAL_ERROR",
                        }))
                    },
                    Json,
                )
            }
        }
    }

    // ========================================================================
    // Handlers
    // ========================================================================

    /// Get detailed nutrition information for a food item
    async fn get_nutrition_info(
        State(state): State<Arc<AppState>>,
        body: Result<Json<NutritionInfoRequest>, JsonRejection>,
    ) -> Json<Value> {
        Self::api_response(
            "nutrition_info",
            Self::nutrition_info(&state, Self::request_body(body)).await,
        )
    }

    async fn nutrition_info(
        state: &AppState,
        request: AppResult<NutritionInfoRequest>,
    ) -> AppResult<Value> {
        let provider = Self::provider(state)?;
        let food_name = request?.food_name;
        if food_name.is_empty() {
            return Err(AppError::invalid_input("No food name provided"));
        }

        info!(food = %food_name, "Fetching nutrition info");
        let raw = provider
            .generate(&prompts::nutrition_info(&food_name))
            .await?;

        let mut value = normalizer::parse_completion_json(&raw).map_err(|e| {
            AppError::new(e.code, format!("Failed to parse nutrition data: {}", e.message))
        })?;
        NUTRITION_SCHEMA.validate(&mut value)?;
        Ok(value)
    }

    /// Generate three recipes for a food item
    async fn generate_recipe(
        State(state): State<Arc<AppState>>,
        body: Result<Json<GenerateRecipeRequest>, JsonRejection>,
    ) -> Json<Value> {
        Self::api_response(
            "recipes",
            Self::recipes(&state, Self::request_body(body)).await,
        )
    }

    async fn recipes(
        state: &AppState,
        request: AppResult<GenerateRecipeRequest>,
    ) -> AppResult<Value> {
        let provider = Self::provider(state)?;
        let food = request?.food;
        if food.is_empty() {
            return Err(AppError::invalid_input("No food name provided"));
        }

        info!(food = %food, "Generating recipes");
        let raw = provider.generate(&prompts::generate_recipes(&food)).await?;

        // The site forwards whatever parses; recipe shape is not validated.
        normalizer::parse_completion_json(&raw)
            .map_err(|e| AppError::new(e.code, "Failed to parse recipe data"))
    }

    /// Find two healthy alternatives for a food item
    async fn find_alternatives(
        State(state): State<Arc<AppState>>,
        body: Result<Json<FindAlternativesRequest>, JsonRejection>,
    ) -> Json<Value> {
        Self::api_response(
            "alternatives",
            Self::alternatives(&state, Self::request_body(body)).await,
        )
    }

    async fn alternatives(
        state: &AppState,
        request: AppResult<FindAlternativesRequest>,
    ) -> AppResult<Value> {
        let provider = Self::provider(state)?;
        let food_item = request?.food_item;
        if food_item.is_empty() {
            return Err(AppError::invalid_input("No food item provided"));
        }

        info!(food = %food_item, "Finding alternatives");
        let raw = provider
            .generate(&prompts::find_alternatives(&food_item))
            .await?;

        let mut value = normalizer::parse_completion_json(&raw).map_err(|e| {
            AppError::new(e.code, format!("Failed to process response: {}", e.message))
        })?;
        ALTERNATIVES_SCHEMA.validate(&mut value).map_err(|e| {
            AppError::new(e.code, format!("Failed to process response: {}", e.message))
        })?;
        Ok(value)
    }

    /// Get dietary recommendations for a health condition
    async fn get_health_recommendations(
        State(state): State<Arc<AppState>>,
        body: Result<Json<HealthRecommendationsRequest>, JsonRejection>,
    ) -> Json<Value> {
        Self::api_response(
            "recommendations",
            Self::recommendations(&state, Self::request_body(body)).await,
        )
    }

    async fn recommendations(
        state: &AppState,
        request: AppResult<HealthRecommendationsRequest>,
    ) -> AppResult<Value> {
        let provider = Self::provider(state)?;
        let health_conditions = request?.health_conditions;
        if health_conditions.is_empty() {
            return Err(AppError::invalid_input("No health conditions provided"));
        }

        info!(conditions = %health_conditions, "Fetching health recommendations");
        let raw = provider
            .generate(&prompts::health_recommendations(&health_conditions))
            .await?;

        // Recommendation replies often surround the object with prose, so
        // this path alone gets the brace-recovery fallback.
        normalizer::parse_with_brace_recovery(&raw).map_err(|e| {
            AppError::new(e.code, format!("Failed to parse response: {}", e.message))
        })
    }

    /// Identify the food shown in an uploaded image
    async fn identify_food(
        State(state): State<Arc<AppState>>,
        multipart: Result<Multipart, MultipartRejection>,
    ) -> Json<Value> {
        Self::api_response("food_name", Self::identification(&state, multipart).await)
    }

    async fn identification(
        state: &AppState,
        multipart: Result<Multipart, MultipartRejection>,
    ) -> AppResult<Value> {
        let provider = Self::provider(state)?;

        let mut multipart =
            multipart.map_err(|_| AppError::invalid_input("No image file provided"))?;
        let image = Self::extract_food_image(&mut multipart).await?;

        info!(bytes = image.data.len(), mime = %image.mime_type, "Identifying food from image");
        let raw = provider
            .generate_from_image(prompts::IDENTIFY_FOOD_PROMPT, &image)
            .await?;

        let food_name = raw.trim();
        if food_name.is_empty() {
            return Err(AppError::external_service(
                "Gemini",
                "Could not identify food in the image",
            ));
        }
        Ok(Value::String(food_name.to_owned()))
    }

    /// Pull the `food_image` field out of the multipart body
    async fn extract_food_image(multipart: &mut Multipart) -> AppResult<ImagePayload> {
        loop {
            let field = multipart
                .next_field()
                .await
                .map_err(|e| AppError::invalid_input(format!("Invalid multipart body: {e}")))?;
            let Some(field) = field else {
                return Err(AppError::invalid_input("No image file provided"));
            };
            if field.name() != Some("food_image") {
                continue;
            }

            if field.file_name().map_or(true, str::is_empty) {
                return Err(AppError::invalid_input("No image selected"));
            }
            let mime_type = field
                .content_type()
                .unwrap_or(DEFAULT_IMAGE_MIME)
                .to_owned();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::invalid_input(format!("Failed to read image: {e}")))?;

            return Ok(ImagePayload::new(data, mime_type));
        }
    }
}
