//! Declarative keyset-paginated list queries.
//!
//! A caller describes a list with a [`ListContext`](dynlist_types::ListContext);
//! the engine resolves the entity's table metadata, generates a `SELECT`,
//! lets a registered transform adjust it, applies cursor pagination and
//! renders parameterized PostgreSQL.

pub mod ast;
pub mod config;
pub mod custom;
pub mod engine;
pub mod error;
pub mod generator;
pub mod metadata;
pub mod pagination;
pub mod pool;
pub mod render;
pub mod request;
pub mod sql;
mod tracing;

pub use ast::{Join, JoinKind, OrderBy, SelectColumn, SelectStatement, TableRef};
pub use config::EngineConfig;
pub use custom::{CustomQueryRegistry, QueryTransform};
pub use engine::{ListEngine, ListEngineBuilder, ListPlan, ListPlanner};
pub use error::{ErrorBody, ListError, Result};
pub use generator::GeneratedQuery;
pub use metadata::{ConfigRegistry, MetadataLoader, RegistrySnapshot};
pub use pagination::{CursorError, GlobalKey, decode_global_key, encode_global_key};
pub use pool::{Connection, ConnectionPool};
pub use render::RenderedQuery;
pub use request::ListRequest;
pub use sql::{SQL, SQLChunk, Token};

pub mod prelude {
    pub use crate::{
        ConfigRegistry, ConnectionPool, EngineConfig, ListEngine, ListError, ListRequest,
        QueryTransform, RegistrySnapshot, SQL, SelectStatement,
    };
}
