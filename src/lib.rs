//! # dynlist
//!
//! Declarative, keyset-paginated list queries over relational entities.
//!
//! A client describes the list it wants (filters, sorts, search, a page size and
//! a cursor) as a [`ListContext`]. The engine resolves the entity's table layout
//! from the application definition, generates a parameterized `SELECT`, lets a
//! registered transform adjust it, pages it with an opaque cursor and returns a
//! [`ListResponse`].
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use dynlist::prelude::*;
//!
//! let app = ApplicationConfig::from_json_str(r#"{
//!     "appId": "crm",
//!     "name": "CRM",
//!     "entities": [{
//!         "code": "Customer",
//!         "name": "Customer",
//!         "fields": [{ "code": "name", "name": "Name" }]
//!     }]
//! }"#)?;
//! let registry = ConfigRegistry::new(RegistrySnapshot::from_applications([app])?);
//! let planner = ListEngine::builder(Arc::new(registry)).build_planner();
//!
//! let mut context = ListContext::with_limit(2);
//! context.filters.push(ListFilter::new("name", FilterOperator::Contains, Some("Acme".into())));
//!
//! let plan = planner.plan("crm", "Customer", &context)?;
//! assert!(plan.query.text.contains(r#""root"."name" ILIKE $1"#));
//! assert!(plan.query.text.ends_with("LIMIT 3"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Database Support
//!
//! | Database   | Driver | Feature Flag |
//! |------------|--------|--------------|
//! | PostgreSQL | sqlx   | `postgres`   |

pub use dynlist_core::{
    ConfigRegistry, Connection, ConnectionPool, CursorError, EngineConfig, ErrorBody, GlobalKey,
    ListEngine, ListEngineBuilder, ListError, ListPlan, ListPlanner, ListRequest, QueryTransform,
    RegistrySnapshot, RenderedQuery, Result, SQL, SelectStatement, decode_global_key,
    encode_global_key,
};
pub use dynlist_types::{
    ApplicationConfig, ConfigError, EntityMetadata, FilterOperator, FilterValue, ListContext,
    ListFilter, ListResponse, ListSearch, ListSort, PageDirection, Primitive, SearchMode,
    SortDirection, ValidationError,
};

/// Lower-level building blocks: the SQL fragment type, statement AST and metadata loader.
pub mod core {
    pub use dynlist_core::*;
}

/// The serde data model shared by every dynlist crate.
pub mod types {
    pub use dynlist_types::*;
}

#[cfg(feature = "postgres")]
pub mod postgres {
    pub use dynlist_postgres::*;
}

pub mod prelude {
    pub use crate::{
        ApplicationConfig, ConfigRegistry, FilterOperator, ListContext, ListEngine, ListError,
        ListFilter, ListResponse, ListSort, PageDirection, Primitive, RegistrySnapshot,
        SortDirection,
    };

    #[cfg(feature = "postgres")]
    pub use dynlist_postgres::PgListPool;
}
