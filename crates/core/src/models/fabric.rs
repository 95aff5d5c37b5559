use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A fabric switch zone, e.g. a PCIe switch partition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub id: i64,
    pub name: String,
    /// The management service that owns this zone.
    pub service_uuid: Uuid,
}

impl Zone {
    pub fn entity_description(&self) -> String {
        format!("zone '{}' (id: {})", self.name, self.id)
    }
}

/// A fabric-addressable resource endpoint, e.g. an NVMe drive behind a
/// PCIe switch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoint {
    pub id: i64,
    pub name: String,
    pub service_uuid: Uuid,
}

impl Endpoint {
    pub fn entity_description(&self) -> String {
        format!("endpoint '{}' (id: {})", self.name, self.id)
    }
}
