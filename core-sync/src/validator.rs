//! Schema Validation for Resolved Payloads
//!
//! Validates a candidate payload (serialized link and category arrays)
//! against structural rules before anything is persisted. The orchestrator
//! treats any failed validation as a pre-commit abort: nothing is written to
//! either replica and a `validation_error` event fires.

use serde_json::Value;
use url::Url;

use crate::model::{MAX_CATEGORY_LEN, MAX_NAME_LEN};

/// Candidate payload to validate: the serialized form of each collection,
/// exactly as it would be persisted. Absent fields are skipped.
#[derive(Debug, Clone, Default)]
pub struct ValidationPayload {
    /// JSON string encoding an array of link objects
    pub links: Option<String>,
    /// JSON string encoding an array of category names
    pub categories: Option<String>,
}

/// Result of validating a payload.
#[derive(Debug, Clone)]
pub struct Validation {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl Validation {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Structural validator consulted before every commit.
pub trait SchemaValidator: Send + Sync {
    fn validate(&self, payload: &ValidationPayload) -> Validation;
}

/// Default validator enforcing the link/category schema:
/// - `links` must deserialize to an array of objects, each with a non-empty
///   `name` (≤100 chars), a parseable absolute `url`, and a non-empty
///   `category` (≤50 chars)
/// - `categories` must deserialize to an array of strings, each 1-50 chars
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkSchemaValidator;

impl LinkSchemaValidator {
    fn validate_links(raw: &str, errors: &mut Vec<String>) {
        let parsed: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                errors.push(format!("links is not valid JSON: {}", e));
                return;
            }
        };

        let Some(items) = parsed.as_array() else {
            errors.push("links must be an array".to_string());
            return;
        };

        for (index, item) in items.iter().enumerate() {
            let Some(object) = item.as_object() else {
                errors.push(format!("link {} is not an object", index));
                continue;
            };

            match object.get("name").and_then(Value::as_str) {
                None | Some("") => errors.push(format!("link {} has an empty name", index)),
                Some(name) if name.chars().count() > MAX_NAME_LEN => {
                    errors.push(format!("link {} name exceeds {} characters", index, MAX_NAME_LEN))
                }
                Some(_) => {}
            }

            match object.get("url").and_then(Value::as_str) {
                None | Some("") => errors.push(format!("link {} has an empty url", index)),
                Some(url) => {
                    if Url::parse(url).is_err() {
                        errors.push(format!("link {} url is not a valid absolute URL", index));
                    }
                }
            }

            match object.get("category").and_then(Value::as_str) {
                None | Some("") => errors.push(format!("link {} has an empty category", index)),
                Some(category) if category.chars().count() > MAX_CATEGORY_LEN => errors.push(
                    format!("link {} category exceeds {} characters", index, MAX_CATEGORY_LEN),
                ),
                Some(_) => {}
            }
        }
    }

    fn validate_categories(raw: &str, errors: &mut Vec<String>) {
        let parsed: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                errors.push(format!("categories is not valid JSON: {}", e));
                return;
            }
        };

        let Some(items) = parsed.as_array() else {
            errors.push("categories must be an array".to_string());
            return;
        };

        for (index, item) in items.iter().enumerate() {
            match item.as_str() {
                None => errors.push(format!("category {} is not a string", index)),
                Some("") => errors.push(format!("category {} is empty", index)),
                Some(name) if name.chars().count() > MAX_CATEGORY_LEN => errors.push(format!(
                    "category {} exceeds {} characters",
                    index, MAX_CATEGORY_LEN
                )),
                Some(_) => {}
            }
        }
    }
}

impl SchemaValidator for LinkSchemaValidator {
    fn validate(&self, payload: &ValidationPayload) -> Validation {
        let mut errors = Vec::new();

        if let Some(links) = &payload.links {
            Self::validate_links(links, &mut errors);
        }

        if let Some(categories) = &payload.categories {
            Self::validate_categories(categories, &mut errors);
        }

        Validation::from_errors(errors)
    }
}
