//! The caller's declarative list request.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Primitive, ValidationError};

/// Page size used when the caller does not send one.
pub const DEFAULT_PAGE_LIMIT: u32 = 50;

/// Largest page size a caller may request.
pub const MAX_PAGE_LIMIT: u32 = 500;

/// Everything a caller may say about one list query.
///
/// Created per request and never mutated during an execution.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_code: Option<String>,
    #[serde(default)]
    pub filters: Vec<ListFilter>,
    #[serde(default)]
    pub sorts: Vec<ListSort>,
    #[serde(default)]
    pub pagination: ListPagination,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<ListSearch>,
    /// Opaque client state, accepted and ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_preferences: Option<serde_json::Map<String, serde_json::Value>>,
    /// Opaque session state, accepted and ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<serde_json::Map<String, serde_json::Value>>,
}

impl ListContext {
    /// Creates an empty context with the given page size.
    #[must_use]
    pub fn with_limit(limit: u32) -> Self {
        Self {
            pagination: ListPagination {
                limit,
                ..ListPagination::default()
            },
            ..Self::default()
        }
    }

    /// The list code hooks are looked up by: the explicit `listCode`, or `<entity>List`.
    #[must_use]
    pub fn resolved_list_code(&self, entity_code: &str) -> String {
        match &self.list_code {
            Some(code) => code.clone(),
            None => format!("{entity_code}List"),
        }
    }

    /// Checks the shape constraints serde cannot express.
    ///
    /// The page limit must lie in `1..=max_limit`, filter and sort entries must
    /// name a field, and an explicit search field list must not be empty.
    pub fn validate(&self, max_limit: u32) -> Result<(), ValidationError> {
        let limit = self.pagination.limit;
        if limit == 0 || limit > max_limit {
            return Err(ValidationError::for_field(
                "pagination.limit",
                format!("limit must be between 1 and {max_limit}, got {limit}"),
            ));
        }
        if self.filters.iter().any(|filter| filter.field.is_empty()) {
            return Err(ValidationError::for_field(
                "filters",
                "filter field must not be empty",
            ));
        }
        if self.sorts.iter().any(|sort| sort.field.is_empty()) {
            return Err(ValidationError::for_field("sorts", "sort field must not be empty"));
        }
        if let Some(search) = &self.search
            && search.fields.as_ref().is_some_and(Vec::is_empty)
        {
            return Err(ValidationError::for_field(
                "search.fields",
                "search fields must not be empty when provided",
            ));
        }
        Ok(())
    }

    /// The cursor that applies to the requested direction, if any.
    #[must_use]
    pub fn active_cursor(&self) -> Option<&str> {
        match self.pagination.direction {
            PageDirection::Forward => self.pagination.after.as_deref(),
            PageDirection::Backward => self.pagination.before.as_deref(),
        }
        .filter(|cursor| !cursor.is_empty())
    }
}

/// A single caller filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilter {
    pub field: String,
    pub operator: FilterOperator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<FilterValue>,
    #[serde(default)]
    pub negate: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl ListFilter {
    /// Creates a filter without negation.
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: Option<FilterValue>) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
            negate: false,
            context: None,
        }
    }

    /// Wraps the filter in `NOT (...)`.
    #[must_use]
    pub fn negated(mut self) -> Self {
        self.negate = true;
        self
    }
}

/// The closed set of filter operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    In,
    NotIn,
    Lt,
    Lte,
    Gt,
    Gte,
    Between,
    Contains,
    StartsWith,
    EndsWith,
    IsNull,
    IsNotNull,
    Custom,
}

impl FilterOperator {
    /// Wire name of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Equals => "equals",
            FilterOperator::NotEquals => "not_equals",
            FilterOperator::In => "in",
            FilterOperator::NotIn => "not_in",
            FilterOperator::Lt => "lt",
            FilterOperator::Lte => "lte",
            FilterOperator::Gt => "gt",
            FilterOperator::Gte => "gte",
            FilterOperator::Between => "between",
            FilterOperator::Contains => "contains",
            FilterOperator::StartsWith => "starts_with",
            FilterOperator::EndsWith => "ends_with",
            FilterOperator::IsNull => "is_null",
            FilterOperator::IsNotNull => "is_not_null",
            FilterOperator::Custom => "custom",
        }
    }
}

/// A filter operand: one scalar, a list, or a keyed record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Scalar(Primitive),
    List(Vec<Primitive>),
    Record(BTreeMap<String, Primitive>),
}

impl FilterValue {
    /// Short name of the shape, used in error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            FilterValue::Scalar(_) => "scalar",
            FilterValue::List(_) => "array",
            FilterValue::Record(_) => "object",
        }
    }
}

impl From<Primitive> for FilterValue {
    fn from(value: Primitive) -> Self {
        FilterValue::Scalar(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Scalar(value.into())
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Scalar(value.into())
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Scalar(value.into())
    }
}

impl From<Vec<Primitive>> for FilterValue {
    fn from(value: Vec<Primitive>) -> Self {
        FilterValue::List(value)
    }
}

/// One entry of the requested ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSort {
    pub field: String,
    pub direction: SortDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nulls: Option<NullsOrder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl ListSort {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
            nulls: None,
            context: None,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
            nulls: None,
            context: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Placement of `NULL` values in an ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullsOrder {
    First,
    Last,
    /// The database default: last for ascending, first for descending.
    Default,
}

/// Free-text search across searchable fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSearch {
    pub term: String,
    /// Restricts the search to these fields when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<SearchMode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    Contains,
    Prefix,
    Exact,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPagination {
    #[serde(default)]
    pub direction: PageDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

impl Default for ListPagination {
    fn default() -> Self {
        Self {
            direction: PageDirection::Forward,
            after: None,
            before: None,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageDirection {
    #[default]
    Forward,
    Backward,
}
