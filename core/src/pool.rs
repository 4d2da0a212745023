//! The database seam.
//!
//! The engine needs exactly one thing from a database: borrow a connection and
//! run one parameterized statement on it. Drivers implement these two traits;
//! tests implement them in memory.

use std::future::Future;

use dynlist_types::{Primitive, Row};

use crate::error::Result;

/// A source of pooled connections.
pub trait ConnectionPool: Send + Sync {
    type Connection: Connection;

    /// Borrows a connection. Dropping it returns it to the pool.
    fn acquire(&self) -> impl Future<Output = Result<Self::Connection>> + Send;
}

/// One borrowed connection.
pub trait Connection: Send {
    /// Runs `sql` with `params` bound to `$1..$n` and returns every row,
    /// keyed by output column name.
    fn query(
        &mut self,
        sql: &str,
        params: &[Primitive],
    ) -> impl Future<Output = Result<Vec<Row>>> + Send;
}
