//! Wire request parsing.
//!
//! A list request is `{ "appCode": ..., "context": ... }` where `context` may be
//! an object, a JSON-encoded string, or absent.

use dynlist_types::{DEFAULT_PAGE_LIMIT, ListContext, ValidationError};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct ListRequest {
    pub app_code: String,
    pub context: ListContext,
}

impl ListRequest {
    pub fn new(app_code: impl Into<String>, context: ListContext) -> Self {
        Self {
            app_code: app_code.into(),
            context,
        }
    }

    /// Parses a request body.
    pub fn from_json_str(body: &str) -> Result<Self, ValidationError> {
        Self::from_json_str_with(body, DEFAULT_PAGE_LIMIT)
    }

    /// Parses a request body, filling in `default_limit` when no page size is sent.
    pub fn from_json_str_with(body: &str, default_limit: u32) -> Result<Self, ValidationError> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| ValidationError::new(format!("Invalid request JSON: {e}")))?;
        Self::from_value_with(value, default_limit)
    }

    pub fn from_value(value: Value) -> Result<Self, ValidationError> {
        Self::from_value_with(value, DEFAULT_PAGE_LIMIT)
    }

    pub fn from_value_with(value: Value, default_limit: u32) -> Result<Self, ValidationError> {
        let Value::Object(mut body) = value else {
            return Err(ValidationError::new("request body must be a JSON object"));
        };

        let app_code = match body.remove("appCode") {
            Some(Value::String(code)) if !code.is_empty() => code,
            _ => {
                return Err(ValidationError::for_field(
                    "appCode",
                    "appCode must be a non-empty string",
                ));
            }
        };

        let context = parse_context(body.remove("context"), default_limit)?;
        Ok(Self { app_code, context })
    }
}

/// Turns the raw `context` member into a [`ListContext`].
///
/// Absent, `null` and empty-string contexts yield the default context; a string
/// is parsed as JSON first.
pub fn parse_context(value: Option<Value>, default_limit: u32) -> Result<ListContext, ValidationError> {
    let object = match value {
        None | Some(Value::Null) => Map::new(),
        Some(Value::String(text)) if text.trim().is_empty() => Map::new(),
        Some(Value::String(text)) => match serde_json::from_str(&text) {
            Ok(Value::Object(object)) => object,
            Ok(_) => return Err(context_error("context must be a JSON object")),
            Err(e) => {
                return Err(context_error("Invalid context JSON")
                    .with_details(Value::String(e.to_string())));
            }
        },
        Some(Value::Object(object)) => object,
        Some(_) => return Err(context_error("context must be an object or a JSON string")),
    };

    let object = with_default_limit(object, default_limit);
    serde_json::from_value(Value::Object(object)).map_err(|e| {
        context_error("context does not match the list context schema")
            .with_details(Value::String(e.to_string()))
    })
}

fn with_default_limit(mut object: Map<String, Value>, default_limit: u32) -> Map<String, Value> {
    let pagination = object
        .entry("pagination")
        .or_insert_with(|| Value::Object(Map::new()));
    if pagination.is_null() {
        *pagination = Value::Object(Map::new());
    }
    if let Value::Object(pagination) = pagination {
        pagination
            .entry("limit")
            .or_insert_with(|| Value::from(default_limit));
    }
    object
}

fn context_error(message: &str) -> ValidationError {
    ValidationError::for_field("context", message)
}
