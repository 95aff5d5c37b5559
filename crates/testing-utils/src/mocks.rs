//! In-memory mock implementations of the repository and service traits.
//!
//! Unit tests run against these instead of a live database or remote
//! management services.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use composer_assembly::AssemblyTask;
use composer_core::models::{ComposedNode, Endpoint, ExternalService, NodeState, Zone};
use composer_core::traits::{
    ComposedNodeRepository, DiscoveryScheduling, ExternalServiceRepository, FabricActions,
    FabricRepository,
};
use composer_core::{ActionError, ComposerError, ComposerResult};

/// Mock implementation of ComposedNodeRepository for testing.
#[derive(Clone)]
pub struct MockComposedNodeRepository {
    nodes: Arc<Mutex<HashMap<i64, ComposedNode>>>,
    next_id: Arc<Mutex<i64>>,
}

impl Default for MockComposedNodeRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MockComposedNodeRepository {
    pub fn new() -> Self {
        Self {
            nodes: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(Mutex::new(1)),
        }
    }

    pub fn with_nodes(nodes: Vec<ComposedNode>) -> Self {
        let repo = Self::new();
        {
            let mut map = repo.nodes.lock().unwrap();
            let mut next_id = repo.next_id.lock().unwrap();
            for node in nodes {
                if node.id >= *next_id {
                    *next_id = node.id + 1;
                }
                map.insert(node.id, node);
            }
        }
        repo
    }

    pub fn count(&self) -> usize {
        self.nodes.lock().unwrap().len()
    }
}

#[async_trait]
impl ComposedNodeRepository for MockComposedNodeRepository {
    async fn create(&self, node: &ComposedNode) -> ComposerResult<ComposedNode> {
        let mut nodes = self.nodes.lock().unwrap();
        let mut next_id = self.next_id.lock().unwrap();

        let mut new_node = node.clone();
        new_node.id = *next_id;
        *next_id += 1;

        nodes.insert(new_node.id, new_node.clone());
        Ok(new_node)
    }

    async fn find_by_id(&self, id: i64) -> ComposerResult<Option<ComposedNode>> {
        let nodes = self.nodes.lock().unwrap();
        Ok(nodes.get(&id).cloned())
    }

    async fn list_all(&self) -> ComposerResult<Vec<ComposedNode>> {
        let nodes = self.nodes.lock().unwrap();
        Ok(nodes.values().cloned().collect())
    }

    async fn list_by_state(&self, state: NodeState) -> ComposerResult<Vec<ComposedNode>> {
        let nodes = self.nodes.lock().unwrap();
        Ok(nodes
            .values()
            .filter(|n| n.state == state)
            .cloned()
            .collect())
    }

    async fn update_state(
        &self,
        id: i64,
        state: NodeState,
        detail: Option<&str>,
    ) -> ComposerResult<()> {
        let mut nodes = self.nodes.lock().unwrap();
        let node = nodes
            .get_mut(&id)
            .ok_or(ComposerError::NodeNotFound { id })?;
        node.state = state;
        node.state_detail = detail.map(|d| d.to_string());
        node.updated_at = Utc::now();
        Ok(())
    }
}

/// Mock implementation of FabricRepository for testing.
#[derive(Clone, Default)]
pub struct MockFabricRepository {
    zones: Arc<Mutex<HashMap<i64, Zone>>>,
    endpoints: Arc<Mutex<HashMap<i64, Endpoint>>>,
}

impl MockFabricRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_zone(&self, zone: Zone) {
        self.zones.lock().unwrap().insert(zone.id, zone);
    }

    pub fn insert_endpoint(&self, endpoint: Endpoint) {
        self.endpoints.lock().unwrap().insert(endpoint.id, endpoint);
    }
}

#[async_trait]
impl FabricRepository for MockFabricRepository {
    async fn find_zone(&self, id: i64) -> ComposerResult<Option<Zone>> {
        Ok(self.zones.lock().unwrap().get(&id).cloned())
    }

    async fn find_endpoint(&self, id: i64) -> ComposerResult<Option<Endpoint>> {
        Ok(self.endpoints.lock().unwrap().get(&id).cloned())
    }
}

/// Mock implementation of ExternalServiceRepository for testing.
///
/// `fail_remove_for` injects a removal failure for specific UUIDs so
/// tests can verify that one bad record does not block a sweep.
#[derive(Clone, Default)]
pub struct MockExternalServiceRepository {
    services: Arc<Mutex<HashMap<Uuid, ExternalService>>>,
    failing_removals: Arc<Mutex<HashSet<Uuid>>>,
}

impl MockExternalServiceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_services(services: Vec<ExternalService>) -> Self {
        let repo = Self::new();
        {
            let mut map = repo.services.lock().unwrap();
            for service in services {
                map.insert(service.uuid, service);
            }
        }
        repo
    }

    pub fn fail_remove_for(&self, uuid: Uuid) {
        self.failing_removals.lock().unwrap().insert(uuid);
    }

    pub fn count(&self) -> usize {
        self.services.lock().unwrap().len()
    }

    pub fn contains(&self, uuid: Uuid) -> bool {
        self.services.lock().unwrap().contains_key(&uuid)
    }
}

#[async_trait]
impl ExternalServiceRepository for MockExternalServiceRepository {
    async fn register(&self, service: &ExternalService) -> ComposerResult<()> {
        self.services
            .lock()
            .unwrap()
            .insert(service.uuid, service.clone());
        Ok(())
    }

    async fn find_by_uuid(&self, uuid: Uuid) -> ComposerResult<Option<ExternalService>> {
        Ok(self.services.lock().unwrap().get(&uuid).cloned())
    }

    async fn list_all(&self) -> ComposerResult<Vec<ExternalService>> {
        Ok(self.services.lock().unwrap().values().cloned().collect())
    }

    async fn record_contact(&self, uuid: Uuid, at: DateTime<Utc>) -> ComposerResult<()> {
        let mut services = self.services.lock().unwrap();
        let service = services
            .get_mut(&uuid)
            .ok_or(ComposerError::ServiceNotFound { uuid })?;
        service.record_contact(at);
        Ok(())
    }

    async fn mark_unreachable(&self, uuid: Uuid) -> ComposerResult<()> {
        let mut services = self.services.lock().unwrap();
        let service = services
            .get_mut(&uuid)
            .ok_or(ComposerError::ServiceNotFound { uuid })?;
        service.mark_unreachable();
        Ok(())
    }

    async fn list_unreachable_longer_than(
        &self,
        retention: Duration,
    ) -> ComposerResult<Vec<ExternalService>> {
        let now = Utc::now();
        let services = self.services.lock().unwrap();
        Ok(services
            .values()
            .filter(|s| s.is_stale(retention, now))
            .cloned()
            .collect())
    }

    async fn remove(&self, uuid: Uuid) -> ComposerResult<()> {
        if self.failing_removals.lock().unwrap().contains(&uuid) {
            return Err(ComposerError::DatabaseOperation(format!(
                "simulated removal failure for {uuid}"
            )));
        }
        let mut services = self.services.lock().unwrap();
        services
            .remove(&uuid)
            .ok_or(ComposerError::ServiceNotFound { uuid })?;
        Ok(())
    }
}

/// Mock implementation of FabricActions for testing.
#[derive(Clone, Default)]
pub struct MockFabricActions {
    attached: Arc<Mutex<Vec<(i64, i64)>>>,
    failing_zones: Arc<Mutex<HashSet<i64>>>,
}

impl MockFabricActions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make attach calls against `zone_id` fail with a remote error.
    pub fn fail_for_zone(&self, zone_id: i64) {
        self.failing_zones.lock().unwrap().insert(zone_id);
    }

    pub fn attached_pairs(&self) -> Vec<(i64, i64)> {
        self.attached.lock().unwrap().clone()
    }
}

#[async_trait]
impl FabricActions for MockFabricActions {
    async fn attach_endpoint(&self, zone: &Zone, endpoint: &Endpoint) -> Result<(), ActionError> {
        if self.failing_zones.lock().unwrap().contains(&zone.id) {
            return Err(
                ActionError::new("attach-endpoint", "zone update rejected by service")
                    .for_service(zone.service_uuid),
            );
        }
        self.attached.lock().unwrap().push((zone.id, endpoint.id));
        Ok(())
    }
}

/// Mock implementation of DiscoveryScheduling that records calls.
#[derive(Clone, Default)]
pub struct MockDiscoveryScheduling {
    scheduled: Arc<Mutex<Vec<Uuid>>>,
    cancelled: Arc<Mutex<Vec<Uuid>>>,
}

impl MockDiscoveryScheduling {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scheduled_uuids(&self) -> Vec<Uuid> {
        self.scheduled.lock().unwrap().clone()
    }

    pub fn cancelled_uuids(&self) -> Vec<Uuid> {
        self.cancelled.lock().unwrap().clone()
    }
}

#[async_trait]
impl DiscoveryScheduling for MockDiscoveryScheduling {
    async fn schedule(&self, service_uuid: Uuid) {
        self.scheduled.lock().unwrap().push(service_uuid);
    }

    async fn cancel(&self, service_uuid: Uuid) {
        self.cancelled.lock().unwrap().push(service_uuid);
    }
}

/// Scripted assembly task for chain tests: records its execution into a
/// shared log, remembers the node id it was bound with, and can be
/// configured to fail with a remote-style error.
pub struct ScriptedTask {
    name: String,
    fail_message: Option<String>,
    owning_service: Option<Uuid>,
    bound_node: Arc<Mutex<Option<i64>>>,
    execution_log: Arc<Mutex<Vec<String>>>,
}

impl ScriptedTask {
    pub fn succeeding(name: &str, execution_log: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name: name.to_string(),
            fail_message: None,
            owning_service: None,
            bound_node: Arc::new(Mutex::new(None)),
            execution_log,
        }
    }

    pub fn failing(name: &str, message: &str, execution_log: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name: name.to_string(),
            fail_message: Some(message.to_string()),
            owning_service: None,
            bound_node: Arc::new(Mutex::new(None)),
            execution_log,
        }
    }

    pub fn owned_by(mut self, service_uuid: Uuid) -> Self {
        self.owning_service = Some(service_uuid);
        self
    }

    /// Handle to observe the node id this task was bound with.
    pub fn bound_node_handle(&self) -> Arc<Mutex<Option<i64>>> {
        self.bound_node.clone()
    }
}

#[async_trait]
impl AssemblyTask for ScriptedTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn bind_node(&mut self, node_id: i64) {
        *self.bound_node.lock().unwrap() = Some(node_id);
    }

    async fn owning_service(&self) -> ComposerResult<Option<Uuid>> {
        Ok(self.owning_service)
    }

    async fn run(&self) -> ComposerResult<()> {
        self.execution_log.lock().unwrap().push(self.name.clone());
        match &self.fail_message {
            Some(message) => Err(ComposerError::ActionFailed {
                task: self.name.clone(),
                source: ActionError::new(self.name.clone(), message.clone()),
            }),
            None => Ok(()),
        }
    }
}
