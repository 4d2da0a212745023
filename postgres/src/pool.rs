use dynlist_core::{Connection, ConnectionPool, ListError, Result};
use dynlist_types::{Primitive, Row};
use sqlx::pool::PoolConnection;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres};

use crate::values::{bind, decode_row};

/// A [`ConnectionPool`] over a shared [`PgPool`].
///
/// Cloning is cheap; clones share the underlying pool.
#[derive(Debug, Clone)]
pub struct PgListPool {
    pool: PgPool,
}

impl PgListPool {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool of at most `max_connections` connections to `url`.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(execution)?;
        Ok(Self { pool })
    }

    pub fn inner(&self) -> &PgPool {
        &self.pool
    }
}

impl From<PgPool> for PgListPool {
    fn from(pool: PgPool) -> Self {
        Self::new(pool)
    }
}

impl ConnectionPool for PgListPool {
    type Connection = PgListConnection;

    async fn acquire(&self) -> Result<PgListConnection> {
        let connection = self.pool.acquire().await.map_err(execution)?;
        Ok(PgListConnection { connection })
    }
}

/// A pooled connection; returned to the pool on drop.
#[derive(Debug)]
pub struct PgListConnection {
    connection: PoolConnection<Postgres>,
}

impl Connection for PgListConnection {
    async fn query(&mut self, sql: &str, params: &[Primitive]) -> Result<Vec<Row>> {
        let query = params
            .iter()
            .fold(sqlx::query(sql), |query, param| bind(query, param));

        let rows = query
            .fetch_all(&mut *self.connection)
            .await
            .map_err(execution)?;

        rows.iter()
            .map(|row| decode_row(row).map_err(execution))
            .collect()
    }
}

fn execution(err: sqlx::Error) -> ListError {
    ListError::Execution(err.to_string())
}
