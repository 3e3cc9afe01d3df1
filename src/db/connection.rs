use crate::config::DatabaseConfig;
use crate::errors::ServerError;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Schema for the tables this service reads.
pub const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

/// Handle to the property store.
///
/// Cloning is cheap; every clone shares the same pool. The handle is built
/// once at start-up and passed to whoever needs the store.
#[derive(Clone)]
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
}

impl Database {
    pub fn open(config: &DatabaseConfig) -> Result<Self, ServerError> {
        Self::open_path(
            &config.path,
            config.pool_size,
            Duration::from_millis(config.connection_timeout_ms),
            Duration::from_millis(config.busy_timeout_ms),
        )
    }

    pub fn open_path(
        path: &Path,
        pool_size: u32,
        checkout_timeout: Duration,
        busy_timeout: Duration,
    ) -> Result<Self, ServerError> {
        let manager = SqliteConnectionManager::file(path)
            .with_init(move |conn| conn.busy_timeout(busy_timeout));
        let pool = Pool::builder()
            .max_size(pool_size)
            .connection_timeout(checkout_timeout)
            .build(manager)?;
        Ok(Self { pool })
    }

    /// Checks out a pooled connection and runs `f(conn)`.
    ///
    /// The connection goes back to the pool when this returns, whether `f`
    /// succeeded or failed.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, ServerError>
    where
        F: FnOnce(&mut Connection) -> Result<T, ServerError>,
    {
        let mut conn: PooledConnection<SqliteConnectionManager> = self.pool.get()?;
        f(&mut conn)
    }

    /// Connections currently checked out.
    pub fn connections_in_use(&self) -> u32 {
        let state = self.pool.state();
        state.connections - state.idle_connections
    }
}

/// Apply a SQL schema to the database.
pub fn init_db(db: &Database, schema_sql: &str) -> Result<(), ServerError> {
    db.with_conn(|conn| {
        conn.execute_batch(schema_sql)?;
        Ok(())
    })?;

    info!("database schema applied");
    Ok(())
}
