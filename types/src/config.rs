//! Declarative application definitions.
//!
//! An application lists its entities (with their fields) and forms. The metadata
//! loader derives an [`EntityMetadata`](crate::EntityMetadata) from an entity
//! definition on every request.
//!
//! Definitions are read from JSON or TOML:
//!
//! ```
//! use dynlist_types::ApplicationConfig;
//!
//! let app = ApplicationConfig::from_json_str(r#"{
//!     "appId": "crm",
//!     "name": "CRM",
//!     "entities": [
//!         { "code": "Customer", "name": "Customer",
//!           "fields": [{ "code": "name", "name": "Name" }] }
//!     ]
//! }"#).unwrap();
//! assert_eq!(app.entity("Customer").unwrap().fields.len(), 1);
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A complete application definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationConfig {
    pub app_id: String,
    pub name: String,
    pub entities: Vec<EntityDefinition>,
    #[serde(default)]
    pub forms: Vec<FormDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDefinition {
    pub code: String,
    pub name: String,
    pub fields: Vec<FieldDefinition>,
    #[serde(default)]
    pub list_inline_editing: bool,
}

impl EntityDefinition {
    #[must_use]
    pub fn field(&self, code: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|field| field.code == code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub code: String,
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<FieldReferenceDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldReferenceDefinition {
    pub entity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_field: Option<String>,
}

/// Declared field type in an application definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    String,
    Number,
    Decimal,
    Date,
    Boolean,
    Grid,
    Reference,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDefinition {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub layout: Vec<FormFieldDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFieldDefinition {
    pub entity: String,
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget: Option<String>,
}

/// Errors raised while reading an application definition.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("application file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {path}: {err}", path = .0.display(), err = .1)]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse application definition: {0}")]
    Parse(String),

    #[error("invalid application definition: {0}")]
    Invalid(String),
}

impl ApplicationConfig {
    /// Parses and validates a JSON definition.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a TOML definition.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a definition from disk; `.toml` files are read as TOML, everything else as JSON.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.into())
            } else {
                ConfigError::Io(path.into(), e)
            }
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            _ => Self::from_json_str(&content),
        }
    }

    #[must_use]
    pub fn entity(&self, code: &str) -> Option<&EntityDefinition> {
        self.entities.iter().find(|entity| entity.code == code)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.app_id.trim().is_empty() {
            return Err(ConfigError::Invalid("appId must not be empty".into()));
        }
        if self.entities.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "application {} declares no entities",
                self.app_id
            )));
        }
        for entity in &self.entities {
            if entity.code.trim().is_empty() {
                return Err(ConfigError::Invalid("entity code must not be empty".into()));
            }
            if entity.fields.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "entity {} declares no fields",
                    entity.code
                )));
            }
            if let Some(field) = entity.fields.iter().find(|f| f.code.trim().is_empty()) {
                return Err(ConfigError::Invalid(format!(
                    "entity {} has a field with an empty code ({})",
                    entity.code, field.name
                )));
            }
        }
        Ok(())
    }
}
