//! PostgreSQL-backed implementations of the composer persistence
//! abstractions.

pub mod database;

pub use database::create_pool;
pub use database::postgres::{
    PostgresComposedNodeRepository, PostgresExternalServiceRepository, PostgresFabricRepository,
};
