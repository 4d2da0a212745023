//! Resolved physical mapping of one entity.

use serde::{Deserialize, Serialize};

use crate::{ListSort, Primitive};

/// Everything the query generator needs to know about one entity.
///
/// Built fresh per call by the metadata loader and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityMetadata {
    pub schema: String,
    pub base_table: String,
    pub base_alias: String,
    pub fields: Vec<EntityFieldMeta>,
    #[serde(default)]
    pub joins: Vec<EntityJoinMeta>,
    #[serde(default)]
    pub default_sort: Vec<ListSort>,
    /// Ordered tuple of fields that uniquely identify a row for keyset comparison.
    pub global_key_fields: Vec<String>,
    /// Clauses always ANDed into the query, independent of caller input.
    #[serde(default)]
    pub security_filters: Vec<SecurityFilterMeta>,
    #[serde(default)]
    pub inline_editing: bool,
}

impl EntityMetadata {
    /// Looks up a field by its logical name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&EntityFieldMeta> {
        self.fields.iter().find(|field| field.field == name)
    }

    /// Fields that appear as output columns.
    pub fn visible_fields(&self) -> impl Iterator<Item = &EntityFieldMeta> {
        self.fields.iter().filter(|field| !field.hidden)
    }
}

/// Logical-to-physical mapping of one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityFieldMeta {
    /// Logical name; also the output alias of the column.
    pub field: String,
    /// Physical column name, unquoted.
    pub column: String,
    pub table_alias: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Display label; the logical name is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub sortable: bool,
    #[serde(default)]
    pub filterable: bool,
    #[serde(default)]
    pub searchable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<FieldReference>,
    /// Present for key resolution but excluded from output columns.
    #[serde(default)]
    pub hidden: bool,
}

impl EntityFieldMeta {
    /// Label shown to the client.
    #[must_use]
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.field)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldReference {
    pub entity_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_field: Option<String>,
}

/// Display/column type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    String,
    Number,
    Boolean,
    Datetime,
    Date,
    Enum,
    Reference,
    Json,
}

impl ColumnType {
    /// Whether the physical column is text, so pattern matching needs no cast.
    #[must_use]
    pub const fn is_textual(&self) -> bool {
        matches!(self, ColumnType::String | ColumnType::Enum | ColumnType::Reference)
    }

    /// Cast applied to bound parameters compared against this column.
    #[must_use]
    pub const fn parameter_cast(&self) -> Option<&'static str> {
        match self {
            ColumnType::Number => Some("numeric"),
            ColumnType::Date => Some("date"),
            ColumnType::Datetime => Some("timestamp"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityJoinMeta {
    pub alias: String,
    pub table: String,
    /// System-controlled join condition.
    pub on: String,
    #[serde(default)]
    pub required: bool,
}

/// A clause injected by the system, never controllable by the caller.
///
/// `clause` uses `?` for each bound value; `params` supplies them in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityFilterMeta {
    pub clause: String,
    #[serde(default)]
    pub params: Vec<Primitive>,
}

impl SecurityFilterMeta {
    /// A clause that binds no values.
    pub fn fixed(clause: impl Into<String>) -> Self {
        Self {
            clause: clause.into(),
            params: Vec::new(),
        }
    }
}
