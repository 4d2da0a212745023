use dynlist_types::ValidationError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ListError {
    /// The request is malformed or references something it may not use
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Unknown application or entity
    #[error("Not found: {0}")]
    NotFound(String),

    /// The query could not be executed or its result could not be shaped
    #[error("Execution error: {0}")]
    Execution(String),
}

impl ListError {
    /// HTTP-style status code for the error category.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            ListError::Validation(_) => 400,
            ListError::NotFound(_) => 404,
            ListError::Execution(_) => 500,
        }
    }

    /// Stable machine-readable code for the error category.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            ListError::Validation(_) => "VALIDATION_ERROR",
            ListError::NotFound(_) => "NOT_FOUND",
            ListError::Execution(_) => "EXECUTION_ERROR",
        }
    }

    /// Client-facing body. Execution failures never expose driver messages.
    #[must_use]
    pub fn to_body(&self) -> ErrorBody {
        match self {
            ListError::Validation(err) => ErrorBody {
                error: self.code().into(),
                message: err.message.clone(),
                details: match (&err.field, &err.details) {
                    (None, None) => None,
                    (field, details) => Some(serde_json::json!({
                        "field": field,
                        "details": details,
                    })),
                },
            },
            ListError::NotFound(what) => ErrorBody {
                error: self.code().into(),
                message: what.clone(),
                details: None,
            },
            ListError::Execution(_) => ErrorBody {
                error: self.code().into(),
                message: "failed to execute list query".into(),
                details: None,
            },
        }
    }
}

/// Serializable error payload returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Result type for list operations
pub type Result<T> = std::result::Result<T, ListError>;
