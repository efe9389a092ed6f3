// ABOUTME: Response normalizer converting decorated AI completion text into schema-checked JSON
// ABOUTME: Handles fence stripping, defensive parsing, brace recovery, and numeric coercion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriLens

//! # Completion Response Normalizer
//!
//! Generative models asked for JSON routinely return *almost* JSON: the
//! payload wrapped in Markdown code fences, prefixed with prose, or carrying
//! numeric fields rendered as strings. This module converts such a text blob
//! into a strict [`serde_json::Value`] the browser client can rely on, or a
//! typed failure when no usable structure exists.
//!
//! Normalization is a pure function over its inputs and runs per request;
//! nothing is cached or retained across calls.
//!
//! ## Pipeline
//!
//! 1. **Fence stripping** - leading ```` ```json ````/```` ``` ```` marker
//!    lines and a trailing lone ```` ``` ```` marker are removed with
//!    line-anchored multiline patterns, then the text is trimmed.
//! 2. **Direct parse** - the cleaned text is parsed as JSON.
//! 3. **Brace recovery** (opt-in per caller) - on parse failure, the
//!    substring from the first `{` to the last `}` of the *original* text is
//!    parsed instead.
//! 4. **Schema validation** - required-field presence for objects, exact
//!    length and per-element required fields for arrays.
//! 5. **Numeric coercion** - declared numeric fields are converted to floats,
//!    with `0` substituted for anything unparseable.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::errors::{AppError, AppResult};

/// Line-anchored fence marker patterns, compiled once
///
/// Ordering matters: the tagged opener must be stripped before the bare one
/// so that ```` ```json ```` is not left as a dangling `json` token.
fn fence_patterns() -> Option<&'static (Regex, Regex, Regex)> {
    static PATTERNS: OnceLock<Option<(Regex, Regex, Regex)>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            Some((
                Regex::new(r"(?m)^```json\s*").ok()?,
                Regex::new(r"(?m)^```\s*").ok()?,
                Regex::new(r"(?m)```$").ok()?,
            ))
        })
        .as_ref()
}

/// Remove Markdown code-fence markers wrapping a completion payload
///
/// The `json` language tag is matched case-sensitively; markers are only
/// recognized when they start (or end) a line of their own. The result is
/// trimmed of surrounding whitespace.
#[must_use]
pub fn strip_code_fences(raw: &str) -> String {
    let Some((open_json, open_bare, close)) = fence_patterns() else {
        return raw.trim().to_owned();
    };

    let text = open_json.replace_all(raw, "");
    let text = open_bare.replace_all(&text, "");
    let text = close.replace_all(&text, "");
    text.trim().to_owned()
}

/// Strip fences and parse the completion text as JSON
///
/// # Errors
///
/// Returns [`ErrorCode::ParseError`](crate::errors::ErrorCode::ParseError)
/// when the cleaned text is not valid JSON.
pub fn parse_completion_json(raw: &str) -> AppResult<Value> {
    let cleaned = strip_code_fences(raw);
    serde_json::from_str(&cleaned).map_err(|e| {
        debug!(error = %e, "Completion text failed direct JSON parse");
        AppError::parse(e.to_string())
    })
}

/// Strip fences and parse, recovering a `{...}` substring on failure
///
/// The recovery pass scans the *original* uncleaned text for the first `{`
/// and the last `}`; the enclosed substring is parsed if both exist in
/// order. Used by the health-recommendations path, where the model tends to
/// surround the JSON object with prose.
///
/// # Errors
///
/// Returns [`ErrorCode::ParseError`](crate::errors::ErrorCode::ParseError)
/// when neither the cleaned text nor any brace-delimited substring parses.
pub fn parse_with_brace_recovery(raw: &str) -> AppResult<Value> {
    match parse_completion_json(raw) {
        Ok(value) => Ok(value),
        Err(direct_err) => {
            let Some(candidate) = braced_substring(raw) else {
                debug!("No brace-delimited substring found in completion text");
                return Err(direct_err);
            };
            serde_json::from_str(candidate).map_err(|e| {
                debug!(error = %e, "Brace-recovered substring failed JSON parse");
                AppError::parse(e.to_string())
            })
        }
    }
}

/// Substring from the first `{` to the last `}`, if both exist in order
fn braced_substring(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (start < end).then(|| &raw[start..=end])
}

/// Coerce a JSON value to a float, substituting `0` for anything unparseable
///
/// The value is first rendered as a string, trimmed, then parsed as a
/// float. Non-numeric text, null, booleans, and containers all become `0`
/// rather than failing the request; availability is deliberately traded for
/// data fidelity here, matching what the site's clients already expect.
/// Coercing an already-coerced number is a no-op.
#[must_use]
pub fn coerce_to_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Structural contract for an object-shaped completion response
///
/// `required` is checked in declared order and short-circuits on the first
/// missing field; `numeric` names the fields coerced to floats afterwards.
#[derive(Debug, Clone, Copy)]
pub struct ObjectSchema {
    /// Field names that must be present, in validation order
    pub required: &'static [&'static str],
    /// Field names coerced to floats after validation
    pub numeric: &'static [&'static str],
}

impl ObjectSchema {
    /// Validate field presence and coerce numeric fields in place
    ///
    /// # Errors
    ///
    /// Returns [`ErrorCode::SchemaError`](crate::errors::ErrorCode::SchemaError)
    /// naming the first missing required field, or when the value is not an
    /// object at all.
    pub fn validate(&self, value: &mut Value) -> AppResult<()> {
        let Some(object) = value.as_object_mut() else {
            return Err(AppError::schema("Expected a JSON object"));
        };

        for field in self.required {
            if !object.contains_key(*field) {
                return Err(AppError::schema(format!(
                    "Missing required field: {field}"
                )));
            }
        }

        for field in self.numeric {
            if let Some(existing) = object.get(*field) {
                let coerced = coerce_to_number(existing);
                object.insert((*field).to_owned(), Value::from(coerced));
            }
        }

        Ok(())
    }
}

/// Structural contract for an array-shaped completion response
///
/// Each element must carry every key in `element_required`; the
/// `numeric_map` key names a nested object whose entries are all coerced to
/// floats, whichever entries the model chose to emit.
#[derive(Debug, Clone, Copy)]
pub struct ArraySchema {
    /// Exact number of elements the response must contain
    pub expected_len: usize,
    /// Top-level keys every element must carry
    pub element_required: &'static [&'static str],
    /// Key of the nested numeric object within each element
    pub numeric_map: &'static str,
}

impl ArraySchema {
    /// Validate shape and coerce nested numeric entries in place
    ///
    /// # Errors
    ///
    /// Returns [`ErrorCode::SchemaError`](crate::errors::ErrorCode::SchemaError)
    /// when the value is not an array of exactly `expected_len` elements,
    /// when an element is missing a required key, or when the nested
    /// numeric value is not an object.
    pub fn validate(&self, value: &mut Value) -> AppResult<()> {
        let expected_len = self.expected_len;
        let Some(elements) = value.as_array_mut() else {
            return Err(AppError::schema(format!(
                "Invalid response format - expected array of {expected_len} items"
            )));
        };
        if elements.len() != expected_len {
            return Err(AppError::schema(format!(
                "Invalid response format - expected array of {expected_len} items"
            )));
        }

        for element in elements.iter_mut() {
            let Some(object) = element.as_object_mut() else {
                return Err(AppError::schema("Expected a JSON object"));
            };

            for field in self.element_required {
                if !object.contains_key(*field) {
                    return Err(AppError::schema(format!(
                        "Missing required field: {field}"
                    )));
                }
            }

            let Some(numeric) = object.get_mut(self.numeric_map).and_then(Value::as_object_mut)
            else {
                return Err(AppError::schema(format!(
                    "Expected a JSON object for field: {}",
                    self.numeric_map
                )));
            };

            let coerced: Vec<(String, f64)> = numeric
                .iter()
                .map(|(key, entry)| (key.clone(), coerce_to_number(entry)))
                .collect();
            for (key, number) in coerced {
                numeric.insert(key, Value::from(number));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use serde_json::json;

    #[test]
    fn test_strip_code_fences_json_tag() {
        let raw = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fences(raw), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_code_fences_bare() {
        let raw = "```\n[1, 2]\n```";
        assert_eq!(strip_code_fences(raw), "[1, 2]");
    }

    #[test]
    fn test_strip_code_fences_untouched_inline_backticks() {
        // Markers inside a line are not fence lines
        let raw = "{\"note\": \"use ``` sparingly\"}";
        assert_eq!(strip_code_fences(raw), raw);
    }

    #[test]
    fn test_fenced_and_unfenced_parse_identically() {
        let interior = "{\"name\": \"apple\", \"calories\": 52}";
        let fenced = format!("```json\n{interior}\n```");

        let from_fenced = parse_completion_json(&fenced).unwrap();
        let from_plain = parse_completion_json(interior).unwrap();
        assert_eq!(from_fenced, from_plain);
    }

    #[test]
    fn test_parse_failure_is_parse_error() {
        let err = parse_completion_json("I cannot determine this.").unwrap_err();
        assert_eq!(err.code, ErrorCode::ParseError);
    }

    #[test]
    fn test_brace_recovery_extracts_object() {
        let raw = "Sure! Here is the data: {\"diabetes\": {\"description\": \"low sugar\"}} Hope it helps.";
        let value = parse_with_brace_recovery(raw).unwrap();
        assert!(value.get("diabetes").is_some());
    }

    #[test]
    fn test_brace_recovery_without_braces_fails() {
        let err = parse_with_brace_recovery("I cannot determine this.").unwrap_err();
        assert_eq!(err.code, ErrorCode::ParseError);
    }

    #[test]
    fn test_coerce_to_number() {
        assert!((coerce_to_number(&json!("12.5 ")) - 12.5).abs() < f64::EPSILON);
        assert!((coerce_to_number(&json!(12)) - 12.0).abs() < f64::EPSILON);
        assert!((coerce_to_number(&json!("12")) - 12.0).abs() < f64::EPSILON);
        assert!(coerce_to_number(&json!("N/A")).abs() < f64::EPSILON);
        assert!(coerce_to_number(&json!(null)).abs() < f64::EPSILON);
        assert!(coerce_to_number(&json!({})).abs() < f64::EPSILON);
    }

    #[test]
    fn test_object_schema_names_first_missing_field() {
        const SCHEMA: ObjectSchema = ObjectSchema {
            required: &["name", "calories", "protein"],
            numeric: &["calories", "protein"],
        };
        let mut value = json!({"name": "apple"});

        let err = SCHEMA.validate(&mut value).unwrap_err();
        assert_eq!(err.code, ErrorCode::SchemaError);
        assert_eq!(err.message, "Missing required field: calories");
    }

    #[test]
    fn test_object_schema_coerces_numeric_strings() {
        const SCHEMA: ObjectSchema = ObjectSchema {
            required: &["a"],
            numeric: &["a"],
        };
        let mut value = json!({"a": "5"});

        SCHEMA.validate(&mut value).unwrap();
        assert_eq!(value, json!({"a": 5.0}));
    }

    #[test]
    fn test_object_schema_idempotent_coercion() {
        const SCHEMA: ObjectSchema = ObjectSchema {
            required: &["a"],
            numeric: &["a"],
        };
        let mut value = json!({"a": "5"});
        SCHEMA.validate(&mut value).unwrap();
        let once = value.clone();
        SCHEMA.validate(&mut value).unwrap();
        assert_eq!(value, once);
    }

    #[test]
    fn test_array_schema_rejects_wrong_length() {
        const SCHEMA: ArraySchema = ArraySchema {
            expected_len: 2,
            element_required: &["name", "nutritionalInfo", "description"],
            numeric_map: "nutritionalInfo",
        };
        let mut value = json!([
            {"name": "X", "nutritionalInfo": {"calories": "100"}, "description": "d"}
        ]);

        let err = SCHEMA.validate(&mut value).unwrap_err();
        assert_eq!(err.code, ErrorCode::SchemaError);
    }

    #[test]
    fn test_array_schema_coerces_existing_entries_only() {
        const SCHEMA: ArraySchema = ArraySchema {
            expected_len: 1,
            element_required: &["name", "nutritionalInfo", "description"],
            numeric_map: "nutritionalInfo",
        };
        let mut value = json!([
            {"name": "X", "nutritionalInfo": {"calories": "100", "protein": "n/a"}, "description": "d"}
        ]);

        SCHEMA.validate(&mut value).unwrap();
        let info = &value[0]["nutritionalInfo"];
        assert_eq!(info["calories"], json!(100.0));
        assert_eq!(info["protein"], json!(0.0));
        assert!(info.get("carbs").is_none());
    }
}
