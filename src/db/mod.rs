pub mod db_pool;
pub mod schema;

use r2d2::Pool;

use crate::config::DatabaseConfig;
use db_pool::DuckDBConnectionManager;

pub type DbPool = Pool<DuckDBConnectionManager>;

#[derive(Debug, thiserror::Error)]
pub enum PoolSetupError {
    #[error("failed to open database: {0}")]
    Open(#[from] duckdb::Error),
    #[error("failed to build connection pool: {0}")]
    Pool(#[from] r2d2::Error),
}

/// Opens the database file, builds the pool and makes sure the schema exists.
pub fn init_pool(config: &DatabaseConfig) -> Result<DbPool, PoolSetupError> {
    let manager = DuckDBConnectionManager::new(&config.connection_string)?;
    let pool = Pool::builder()
        .max_size(config.pool_size.max(1))
        .build(manager)?;

    let conn = pool.get()?;
    schema::ensure_schema(&conn)?;

    Ok(pool)
}
