use serde::{Deserialize, Serialize};

use crate::{ColumnType, FieldReference};

/// One result row, keyed by output column alias.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// A page of rows plus everything a client needs to render and continue the list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub entity_code: String,
    pub list_code: String,
    pub columns: Vec<ListColumnMeta>,
    pub rows: Vec<ListResponseRow>,
    pub page_info: PageInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<ListSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<ListDebug>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<ListCapabilities>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponseRow {
    pub cursor: String,
    pub values: Row,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListColumnMeta {
    pub field: String,
    pub label: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default)]
    pub sortable: bool,
    #[serde(default)]
    pub filterable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<FieldReference>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSummary {
    /// Number of caller filters that made it into the query.
    pub applied_filters: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDebug {
    pub custom_query_applied: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCapabilities {
    pub inline_editing: bool,
}
