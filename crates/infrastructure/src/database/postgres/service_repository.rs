use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::{PgPool, Row};
use tracing::debug;
use uuid::Uuid;

use composer_core::models::ExternalService;
use composer_core::traits::ExternalServiceRepository;
use composer_core::{ComposerError, ComposerResult};

/// PostgreSQL implementation of ExternalServiceRepository.
pub struct PostgresExternalServiceRepository {
    pool: PgPool,
}

impl PostgresExternalServiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_service(row: &sqlx::postgres::PgRow) -> ComposerResult<ExternalService> {
        Ok(ExternalService {
            uuid: row.try_get("uuid")?,
            name: row.try_get("name")?,
            base_url: row.try_get("base_url")?,
            service_kind: row.try_get("service_kind")?,
            reachable: row.try_get("reachable")?,
            last_seen_at: row.try_get("last_seen_at")?,
            registered_at: row.try_get("registered_at")?,
        })
    }
}

#[async_trait]
impl ExternalServiceRepository for PostgresExternalServiceRepository {
    async fn register(&self, service: &ExternalService) -> ComposerResult<()> {
        sqlx::query(
            r#"
            INSERT INTO external_services (uuid, name, base_url, service_kind, reachable, last_seen_at, registered_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (uuid) DO UPDATE SET
                name = EXCLUDED.name,
                base_url = EXCLUDED.base_url,
                service_kind = EXCLUDED.service_kind,
                reachable = EXCLUDED.reachable,
                last_seen_at = EXCLUDED.last_seen_at
            "#,
        )
        .bind(service.uuid)
        .bind(&service.name)
        .bind(&service.base_url)
        .bind(&service.service_kind)
        .bind(service.reachable)
        .bind(service.last_seen_at)
        .bind(service.registered_at)
        .execute(&self.pool)
        .await
        .map_err(ComposerError::Database)?;

        debug!("registered {}", service.entity_description());
        Ok(())
    }

    async fn find_by_uuid(&self, uuid: Uuid) -> ComposerResult<Option<ExternalService>> {
        let row = sqlx::query(
            "SELECT uuid, name, base_url, service_kind, reachable, last_seen_at, registered_at
             FROM external_services WHERE uuid = $1",
        )
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await
        .map_err(ComposerError::Database)?;

        row.as_ref().map(Self::row_to_service).transpose()
    }

    async fn list_all(&self) -> ComposerResult<Vec<ExternalService>> {
        let rows = sqlx::query(
            "SELECT uuid, name, base_url, service_kind, reachable, last_seen_at, registered_at
             FROM external_services ORDER BY registered_at",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(ComposerError::Database)?;

        rows.iter().map(Self::row_to_service).collect()
    }

    async fn record_contact(&self, uuid: Uuid, at: DateTime<Utc>) -> ComposerResult<()> {
        let result = sqlx::query(
            "UPDATE external_services SET reachable = TRUE, last_seen_at = $1 WHERE uuid = $2",
        )
        .bind(at)
        .bind(uuid)
        .execute(&self.pool)
        .await
        .map_err(ComposerError::Database)?;

        if result.rows_affected() == 0 {
            return Err(ComposerError::ServiceNotFound { uuid });
        }
        Ok(())
    }

    async fn mark_unreachable(&self, uuid: Uuid) -> ComposerResult<()> {
        let result = sqlx::query("UPDATE external_services SET reachable = FALSE WHERE uuid = $1")
            .bind(uuid)
            .execute(&self.pool)
            .await
            .map_err(ComposerError::Database)?;

        if result.rows_affected() == 0 {
            return Err(ComposerError::ServiceNotFound { uuid });
        }
        Ok(())
    }

    async fn list_unreachable_longer_than(
        &self,
        retention: Duration,
    ) -> ComposerResult<Vec<ExternalService>> {
        let cutoff = Utc::now() - retention;
        let rows = sqlx::query(
            "SELECT uuid, name, base_url, service_kind, reachable, last_seen_at, registered_at
             FROM external_services WHERE last_seen_at < $1 ORDER BY last_seen_at",
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(ComposerError::Database)?;

        rows.iter().map(Self::row_to_service).collect()
    }

    async fn remove(&self, uuid: Uuid) -> ComposerResult<()> {
        let result = sqlx::query("DELETE FROM external_services WHERE uuid = $1")
            .bind(uuid)
            .execute(&self.pool)
            .await
            .map_err(ComposerError::Database)?;

        if result.rows_affected() == 0 {
            return Err(ComposerError::ServiceNotFound { uuid });
        }

        debug!("removed external service {uuid}");
        Ok(())
    }
}
