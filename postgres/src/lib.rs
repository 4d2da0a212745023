//! PostgreSQL support for dynlist
//!
//! [`PgListPool`] implements [`ConnectionPool`](dynlist_core::ConnectionPool) on top
//! of a [`sqlx::PgPool`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use dynlist_core::{ConfigRegistry, ListEngine};
//! use dynlist_postgres::PgListPool;
//! use dynlist_types::ListContext;
//!
//! # async fn run(registry: Arc<ConfigRegistry>) -> dynlist_core::Result<()> {
//! let pool = PgListPool::connect("postgres://localhost/app", 10).await?;
//! let engine = ListEngine::builder(registry).build(pool);
//! let page = engine.execute("crm", "Customer", &ListContext::default()).await?;
//! # Ok(())
//! # }
//! ```

mod pool;
mod values;

pub use pool::{PgListConnection, PgListPool};
pub use values::decode_row;
