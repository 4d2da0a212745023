//! Shared type definitions for dynlist
//!
//! This crate holds the serde-backed data model shared by every dynlist crate:
//!
//! - [`Primitive`] - the scalar values that may appear in filters, parameters and cursors
//! - [`ListContext`] and friends - the caller's declarative list request
//! - [`ListResponse`] and friends - the page returned to the caller
//! - [`EntityMetadata`] - the resolved table/column mapping of one entity
//! - [`ApplicationConfig`] - the declarative application definition the metadata is derived from

mod config;
mod context;
mod error;
mod metadata;
mod primitive;
mod response;

pub use config::{
    ApplicationConfig, ConfigError, EntityDefinition, FieldDefinition, FieldKind,
    FieldReferenceDefinition, FormDefinition, FormFieldDefinition,
};
pub use context::{
    FilterOperator, FilterValue, ListContext, ListFilter, ListPagination, ListSearch, ListSort,
    NullsOrder, PageDirection, SearchMode, SortDirection, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT,
};
pub use error::ValidationError;
pub use metadata::{
    ColumnType, EntityFieldMeta, EntityJoinMeta, EntityMetadata, FieldReference,
    SecurityFilterMeta,
};
pub use primitive::Primitive;
pub use response::{
    ListCapabilities, ListColumnMeta, ListDebug, ListResponse, ListResponseRow, ListSummary,
    PageInfo, Row,
};

/// Prelude module for commonly used types
pub mod prelude {
    pub use crate::{
        EntityMetadata, FilterOperator, ListContext, ListFilter, ListPagination, ListResponse,
        ListSort, PageDirection, Primitive, SortDirection, ValidationError,
    };
}
