use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use composer_core::traits::{FabricActions, FabricRepository};
use composer_core::{ComposerError, ComposerResult};

use crate::task::AssemblyTask;

/// Attaches a storage endpoint into a fabric zone on the owning
/// management service.
pub struct EndpointAttachTask {
    zone_id: Option<i64>,
    endpoint_id: Option<i64>,
    node_id: Option<i64>,
    fabric: Arc<dyn FabricRepository>,
    actions: Arc<dyn FabricActions>,
}

impl EndpointAttachTask {
    pub fn new(fabric: Arc<dyn FabricRepository>, actions: Arc<dyn FabricActions>) -> Self {
        Self {
            zone_id: None,
            endpoint_id: None,
            node_id: None,
            fabric,
            actions,
        }
    }

    pub fn with_zone(mut self, zone_id: i64) -> Self {
        self.zone_id = Some(zone_id);
        self
    }

    pub fn with_endpoint(mut self, endpoint_id: i64) -> Self {
        self.endpoint_id = Some(endpoint_id);
        self
    }

    fn required_zone_id(&self) -> ComposerResult<i64> {
        self.zone_id.ok_or_else(|| {
            ComposerError::Precondition(
                "endpoint attach invoked without a bound zone id".to_string(),
            )
        })
    }

    fn required_endpoint_id(&self) -> ComposerResult<i64> {
        self.endpoint_id.ok_or_else(|| {
            ComposerError::Precondition(
                "endpoint attach invoked without a bound endpoint id".to_string(),
            )
        })
    }
}

#[async_trait]
impl AssemblyTask for EndpointAttachTask {
    fn name(&self) -> &str {
        "endpoint-attach"
    }

    fn bind_node(&mut self, node_id: i64) {
        self.node_id = Some(node_id);
    }

    async fn owning_service(&self) -> ComposerResult<Option<Uuid>> {
        let zone_id = self.required_zone_id()?;
        let zone = self
            .fabric
            .find_zone(zone_id)
            .await?
            .ok_or(ComposerError::ZoneNotFound { id: zone_id })?;
        Ok(Some(zone.service_uuid))
    }

    async fn run(&self) -> ComposerResult<()> {
        let zone_id = self.required_zone_id()?;
        let endpoint_id = self.required_endpoint_id()?;

        let zone = self
            .fabric
            .find_zone(zone_id)
            .await?
            .ok_or(ComposerError::ZoneNotFound { id: zone_id })?;
        let endpoint = self
            .fabric
            .find_endpoint(endpoint_id)
            .await?
            .ok_or(ComposerError::EndpointNotFound { id: endpoint_id })?;

        self.actions
            .attach_endpoint(&zone, &endpoint)
            .await
            .map_err(|source| ComposerError::ActionFailed {
                task: self.name().to_string(),
                source: source.for_service(zone.service_uuid),
            })
    }
}
