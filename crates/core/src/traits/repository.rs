//! Persistence abstractions consumed by the assembly engine and the
//! service lifecycle manager.
//!
//! Each repository is responsible for one entity family; implementations
//! must keep every operation individually atomic so a task's effect
//! commits independently of its siblings.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::errors::ComposerResult;
use crate::models::{ComposedNode, Endpoint, ExternalService, NodeState, Zone};

/// Composed node persistence.
#[async_trait]
pub trait ComposedNodeRepository: Send + Sync {
    async fn create(&self, node: &ComposedNode) -> ComposerResult<ComposedNode>;
    async fn find_by_id(&self, id: i64) -> ComposerResult<Option<ComposedNode>>;
    async fn list_all(&self) -> ComposerResult<Vec<ComposedNode>>;
    async fn list_by_state(&self, state: NodeState) -> ComposerResult<Vec<ComposedNode>>;

    /// Atomically set a node's state, optionally retaining diagnostic
    /// detail (e.g. the originating error of a failed chain).
    async fn update_state(
        &self,
        id: i64,
        state: NodeState,
        detail: Option<&str>,
    ) -> ComposerResult<()>;
}

/// Read access to fabric-level resources referenced by assembly tasks.
#[async_trait]
pub trait FabricRepository: Send + Sync {
    async fn find_zone(&self, id: i64) -> ComposerResult<Option<Zone>>;
    async fn find_endpoint(&self, id: i64) -> ComposerResult<Option<Endpoint>>;
}

/// Registry of known remote hardware-management services.
#[async_trait]
pub trait ExternalServiceRepository: Send + Sync {
    /// Insert or update a service record by UUID.
    async fn register(&self, service: &ExternalService) -> ComposerResult<()>;
    async fn find_by_uuid(&self, uuid: Uuid) -> ComposerResult<Option<ExternalService>>;
    async fn list_all(&self) -> ComposerResult<Vec<ExternalService>>;

    /// Record a successful reachability contact. Last writer wins on the
    /// timestamp.
    async fn record_contact(&self, uuid: Uuid, at: DateTime<Utc>) -> ComposerResult<()>;

    /// Flag a service as unreachable without touching `last_seen_at`.
    async fn mark_unreachable(&self, uuid: Uuid) -> ComposerResult<()>;

    /// Services whose last successful contact is older than `retention`.
    async fn list_unreachable_longer_than(
        &self,
        retention: Duration,
    ) -> ComposerResult<Vec<ExternalService>>;

    async fn remove(&self, uuid: Uuid) -> ComposerResult<()>;
}
