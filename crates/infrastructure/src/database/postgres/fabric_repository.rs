use async_trait::async_trait;
use sqlx::{PgPool, Row};

use composer_core::models::{Endpoint, Zone};
use composer_core::traits::FabricRepository;
use composer_core::{ComposerError, ComposerResult};

/// PostgreSQL implementation of FabricRepository.
pub struct PostgresFabricRepository {
    pool: PgPool,
}

impl PostgresFabricRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_zone(row: &sqlx::postgres::PgRow) -> ComposerResult<Zone> {
        Ok(Zone {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            service_uuid: row.try_get("service_uuid")?,
        })
    }

    fn row_to_endpoint(row: &sqlx::postgres::PgRow) -> ComposerResult<Endpoint> {
        Ok(Endpoint {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            service_uuid: row.try_get("service_uuid")?,
        })
    }
}

#[async_trait]
impl FabricRepository for PostgresFabricRepository {
    async fn find_zone(&self, id: i64) -> ComposerResult<Option<Zone>> {
        let row = sqlx::query("SELECT id, name, service_uuid FROM zones WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(ComposerError::Database)?;

        row.as_ref().map(Self::row_to_zone).transpose()
    }

    async fn find_endpoint(&self, id: i64) -> ComposerResult<Option<Endpoint>> {
        let row = sqlx::query("SELECT id, name, service_uuid FROM endpoints WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(ComposerError::Database)?;

        row.as_ref().map(Self::row_to_endpoint).transpose()
    }
}
