use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A remote hardware-management service discovered on the rack network.
///
/// `last_seen_at` is the timestamp of the last successful reachability
/// contact; the eviction sweep removes records whose contact age exceeds
/// the configured retention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalService {
    pub uuid: Uuid,
    pub name: String,
    pub base_url: String,
    pub service_kind: String, // "psme", "rss", etc.
    pub reachable: bool,
    pub last_seen_at: DateTime<Utc>,
    pub registered_at: DateTime<Utc>,
}

impl ExternalService {
    pub fn new(uuid: Uuid, name: String, base_url: String, service_kind: String) -> Self {
        let now = Utc::now();
        Self {
            uuid,
            name,
            base_url,
            service_kind,
            reachable: true,
            last_seen_at: now,
            registered_at: now,
        }
    }

    /// Age of the last successful contact.
    pub fn contact_age(&self, now: DateTime<Utc>) -> Duration {
        now - self.last_seen_at
    }

    /// Whether this record has gone without successful contact longer
    /// than `retention`.
    pub fn is_stale(&self, retention: Duration, now: DateTime<Utc>) -> bool {
        self.contact_age(now) > retention
    }

    pub fn record_contact(&mut self, at: DateTime<Utc>) {
        self.last_seen_at = at;
        self.reachable = true;
    }

    pub fn mark_unreachable(&mut self) {
        self.reachable = false;
    }

    pub fn entity_description(&self) -> String {
        format!(
            "external service '{}' ({}, uuid: {})",
            self.name, self.service_kind, self.uuid
        )
    }
}
