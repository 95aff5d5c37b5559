pub mod postgres;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use composer_core::config::DatabaseConfig;
use composer_core::{ComposerError, ComposerResult};

/// Build the PostgreSQL connection pool from configuration.
pub async fn create_pool(config: &DatabaseConfig) -> ComposerResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
        .map_err(ComposerError::Database)
}
