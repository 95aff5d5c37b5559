use async_trait::async_trait;

use crate::errors::ActionError;
use crate::models::{Endpoint, Zone};

/// Remote hardware-management invocations against fabric resources.
///
/// Implementations talk to the owning management service; the wire
/// protocol is outside this crate's concern. Failures come back as
/// [`ActionError`] and are wrapped by the invoking assembly task.
#[async_trait]
pub trait FabricActions: Send + Sync {
    /// Attach `endpoint` into `zone` on the owning service.
    async fn attach_endpoint(&self, zone: &Zone, endpoint: &Endpoint) -> Result<(), ActionError>;
}
