// ABOUTME: Prompt builders for the AI-backed food endpoints
// ABOUTME: Each function renders the exact instruction text sent to the completion service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriLens

//! # Endpoint Prompts
//!
//! Every AI-backed endpoint sends one fixed prompt, parameterized only by
//! the user's input. The prompts pin down the JSON shape the model must
//! return; the response normalizer still treats the reply defensively.

/// Prompt for the food-identification vision request
pub const IDENTIFY_FOOD_PROMPT: &str =
    "Identify the food item in this image. Give just the name of the food, nothing else.";

/// Prompt requesting nutrition facts for a food as a JSON object
#[must_use]
pub fn nutrition_info(food_name: &str) -> String {
    format!(
        r#"Provide detailed nutritional information for {food_name}.

Return the response as a JSON object with exactly this structure:
{{
    "name": "{food_name}",
    "serving_size": "1 medium (e.g.)",
    "serving_weight": 100,
    "calories": 100,
    "protein": 2,
    "carbohydrates": 25,
    "fat": 0.5,
    "fiber": 4,
    "sugar": 20,
    "sodium": 2,
    "potassium": 200,
    "image_url": "placeholder-food.jpg",
    "benefits": [
        "Benefit 1",
        "Benefit 2",
        "Benefit 3"
    ],
    "when_to_consume": "Morning, afternoon, etc.",
    "how_to_consume": "Raw, cooked, etc.",
    "daily_recommendation": "1-2 servings per day"
}}

All nutritional values should be numbers, not strings. Include at least 3 specific health benefits.
Return ONLY the JSON object with no additional text or formatting."#
    )
}

/// Prompt requesting three recipes for a food item as a JSON array
#[must_use]
pub fn generate_recipes(food_name: &str) -> String {
    format!(
        r#"Generate 3 recipes using the food item: {food_name}.
The response should be a JSON array in the following format:

[
    {{
        "name": "Recipe Name Here",
        "additionalIngredients": ["ingredient1", "ingredient2"],
        "instructions": ["step1", "step2"]
    }},
    {{
        "name": "Second Recipe Name",
        "additionalIngredients": ["ingredient1", "ingredient2"],
        "instructions": ["step1", "step2"]
    }},
    {{
        "name": "Third Recipe Name",
        "additionalIngredients": ["ingredient1", "ingredient2"],
        "instructions": ["step1", "step2"]
    }}
]

Return ONLY the JSON array with no additional text or formatting."#
    )
}

/// Prompt requesting two healthy alternatives for a food item
#[must_use]
pub fn find_alternatives(food_item: &str) -> String {
    format!(
        r#"Generate 2 healthy alternative food items for {food_item} with accurate nutritional information.
Provide the response as a JSON array with exactly this structure, ensuring all values are numbers:

[
    {{
        "name": "Alternative Food 1",
        "nutritionalInfo": {{
            "calories": 100,
            "protein": 10,
            "carbs": 20,
            "fats": 5,
            "energy": 200
        }},
        "description": "A detailed description of why this is a healthy alternative to {food_item}, including key health benefits."
    }},
    {{
        "name": "Alternative Food 2",
        "nutritionalInfo": {{
            "calories": 120,
            "protein": 8,
            "carbs": 15,
            "fats": 6,
            "energy": 250
        }},
        "description": "A detailed description of why this is a healthy alternative to {food_item}, including key health benefits."
    }}
]

Return ONLY the JSON array with no additional text or formatting."#
    )
}

/// Prompt requesting dietary guidance for a health condition
#[must_use]
pub fn health_recommendations(health_conditions: &str) -> String {
    format!(
        r#"Provide detailed dietary recommendations for someone with the following health condition: {health_conditions}

Please format your response in JSON with the following structure:
{{
    "{health_conditions}": {{
        "foods_to_avoid": [list of specific foods to avoid],
        "recommended_foods": [list of specific foods that are beneficial],
        "description": "Detailed description of the dietary approach for this condition"
    }}
}}

Include at least 10 specific foods in each list (foods_to_avoid and recommended_foods).
The description should be comprehensive and explain why certain foods are recommended or should be avoided."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_embed_user_input() {
        assert!(nutrition_info("kiwi").contains("nutritional information for kiwi"));
        assert!(generate_recipes("tofu").contains("using the food item: tofu"));
        assert!(find_alternatives("chips").contains("alternative food items for chips"));
        assert!(health_recommendations("diabetes").contains("health condition: diabetes"));
    }

    #[test]
    fn test_nutrition_prompt_lists_every_required_field() {
        let prompt = nutrition_info("apple");
        for field in [
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
        ] {
            assert!(prompt.contains(field), "prompt missing {field}");
        }
    }
}
