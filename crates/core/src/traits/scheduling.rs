use async_trait::async_trait;
use uuid::Uuid;

/// Identity-keyed scheduling of per-service discovery polling.
///
/// Both operations are idempotent: scheduling an already-scheduled UUID
/// keeps the existing job, cancelling an absent or already-cancelled UUID
/// is a no-op. Once cancelled, no further poll for that UUID may fire.
#[async_trait]
pub trait DiscoveryScheduling: Send + Sync {
    async fn schedule(&self, service_uuid: Uuid);
    async fn cancel(&self, service_uuid: Uuid);
}
