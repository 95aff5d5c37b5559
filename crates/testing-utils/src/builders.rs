//! Test data builders with sensible defaults.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use composer_core::models::{ComposedNode, Endpoint, ExternalService, NodeState, Zone};

/// Builder for creating test ComposedNode entities.
pub struct ComposedNodeBuilder {
    node: ComposedNode,
}

impl ComposedNodeBuilder {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            node: ComposedNode {
                id: 1,
                name: "test-node".to_string(),
                state: NodeState::Allocated,
                state_detail: None,
                resource_ids: vec![],
                created_at: now,
                updated_at: now,
            },
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.node.id = id;
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.node.name = name.to_string();
        self
    }

    pub fn with_state(mut self, state: NodeState) -> Self {
        self.node.state = state;
        self
    }

    pub fn with_state_detail(mut self, detail: &str) -> Self {
        self.node.state_detail = Some(detail.to_string());
        self
    }

    pub fn with_resource_ids(mut self, resource_ids: Vec<i64>) -> Self {
        self.node.resource_ids = resource_ids;
        self
    }

    pub fn build(self) -> ComposedNode {
        self.node
    }
}

impl Default for ComposedNodeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating test ExternalService entities.
pub struct ExternalServiceBuilder {
    service: ExternalService,
}

impl ExternalServiceBuilder {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            service: ExternalService {
                uuid: Uuid::new_v4(),
                name: "test-service".to_string(),
                base_url: "https://10.0.0.1:8443".to_string(),
                service_kind: "psme".to_string(),
                reachable: true,
                last_seen_at: now,
                registered_at: now,
            },
        }
    }

    pub fn with_uuid(mut self, uuid: Uuid) -> Self {
        self.service.uuid = uuid;
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.service.name = name.to_string();
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.service.base_url = base_url.to_string();
        self
    }

    pub fn with_reachable(mut self, reachable: bool) -> Self {
        self.service.reachable = reachable;
        self
    }

    pub fn with_last_seen_at(mut self, last_seen_at: DateTime<Utc>) -> Self {
        self.service.last_seen_at = last_seen_at;
        self
    }

    pub fn build(self) -> ExternalService {
        self.service
    }
}

impl Default for ExternalServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating test Zone entities.
pub struct ZoneBuilder {
    zone: Zone,
}

impl ZoneBuilder {
    pub fn new() -> Self {
        Self {
            zone: Zone {
                id: 1,
                name: "test-zone".to_string(),
                service_uuid: Uuid::new_v4(),
            },
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.zone.id = id;
        self
    }

    pub fn with_service_uuid(mut self, service_uuid: Uuid) -> Self {
        self.zone.service_uuid = service_uuid;
        self
    }

    pub fn build(self) -> Zone {
        self.zone
    }
}

impl Default for ZoneBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating test Endpoint entities.
pub struct EndpointBuilder {
    endpoint: Endpoint,
}

impl EndpointBuilder {
    pub fn new() -> Self {
        Self {
            endpoint: Endpoint {
                id: 1,
                name: "test-endpoint".to_string(),
                service_uuid: Uuid::new_v4(),
            },
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.endpoint.id = id;
        self
    }

    pub fn with_service_uuid(mut self, service_uuid: Uuid) -> Self {
        self.endpoint.service_uuid = service_uuid;
        self
    }

    pub fn build(self) -> Endpoint {
        self.endpoint
    }
}

impl Default for EndpointBuilder {
    fn default() -> Self {
        Self::new()
    }
}
