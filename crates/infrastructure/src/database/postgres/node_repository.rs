use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::debug;

use composer_core::models::{ComposedNode, NodeState};
use composer_core::traits::ComposedNodeRepository;
use composer_core::{ComposerError, ComposerResult};

/// PostgreSQL implementation of ComposedNodeRepository.
pub struct PostgresComposedNodeRepository {
    pool: PgPool,
}

impl PostgresComposedNodeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_node(row: &sqlx::postgres::PgRow) -> ComposerResult<ComposedNode> {
        let resource_ids: Vec<i64> = row.try_get::<Vec<i64>, _>("resource_ids").unwrap_or_default();

        Ok(ComposedNode {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            state: row.try_get("state")?,
            state_detail: row.try_get("state_detail")?,
            resource_ids,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl ComposedNodeRepository for PostgresComposedNodeRepository {
    async fn create(&self, node: &ComposedNode) -> ComposerResult<ComposedNode> {
        let row = sqlx::query(
            r#"
            INSERT INTO composed_nodes (name, state, state_detail, resource_ids, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, state, state_detail, resource_ids, created_at, updated_at
            "#,
        )
        .bind(&node.name)
        .bind(node.state)
        .bind(&node.state_detail)
        .bind(&node.resource_ids)
        .bind(node.created_at)
        .bind(node.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(ComposerError::Database)?;

        let created = Self::row_to_node(&row)?;
        debug!("created {}", created.entity_description());
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> ComposerResult<Option<ComposedNode>> {
        let row = sqlx::query(
            "SELECT id, name, state, state_detail, resource_ids, created_at, updated_at
             FROM composed_nodes WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(ComposerError::Database)?;

        row.as_ref().map(Self::row_to_node).transpose()
    }

    async fn list_all(&self) -> ComposerResult<Vec<ComposedNode>> {
        let rows = sqlx::query(
            "SELECT id, name, state, state_detail, resource_ids, created_at, updated_at
             FROM composed_nodes ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(ComposerError::Database)?;

        rows.iter().map(Self::row_to_node).collect()
    }

    async fn list_by_state(&self, state: NodeState) -> ComposerResult<Vec<ComposedNode>> {
        let rows = sqlx::query(
            "SELECT id, name, state, state_detail, resource_ids, created_at, updated_at
             FROM composed_nodes WHERE state = $1 ORDER BY id",
        )
        .bind(state)
        .fetch_all(&self.pool)
        .await
        .map_err(ComposerError::Database)?;

        rows.iter().map(Self::row_to_node).collect()
    }

    async fn update_state(
        &self,
        id: i64,
        state: NodeState,
        detail: Option<&str>,
    ) -> ComposerResult<()> {
        let result = sqlx::query(
            "UPDATE composed_nodes SET state = $1, state_detail = $2, updated_at = NOW()
             WHERE id = $3",
        )
        .bind(state)
        .bind(detail)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(ComposerError::Database)?;

        if result.rows_affected() == 0 {
            return Err(ComposerError::NodeNotFound { id });
        }

        debug!("composed node {id} moved to {}", state.as_str());
        Ok(())
    }
}
