//! Per-service reachability polling, keyed by service UUID.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use composer_core::traits::{DiscoveryScheduling, ExternalServiceRepository};
use composer_core::{ConfigHolder, ServiceLifecycleConfig};

use crate::probe::ReachabilityProbe;

/// Schedules and cancels the periodic reachability poll of each known
/// remote management service.
///
/// At most one polling job exists per UUID. Cancellation aborts the job
/// so no pending or future poll for that identity fires again; cancelling
/// an absent identity is a no-op. The poll interval is re-read from the
/// refreshable config on every cycle.
pub struct DiscoveryScheduler {
    services: Arc<dyn ExternalServiceRepository>,
    probe: Arc<dyn ReachabilityProbe>,
    config: Arc<ConfigHolder<ServiceLifecycleConfig>>,
    jobs: Mutex<HashMap<Uuid, JoinHandle<()>>>,
}

impl DiscoveryScheduler {
    pub fn new(
        services: Arc<dyn ExternalServiceRepository>,
        probe: Arc<dyn ReachabilityProbe>,
        config: Arc<ConfigHolder<ServiceLifecycleConfig>>,
    ) -> Self {
        Self {
            services,
            probe,
            config,
            jobs: Mutex::new(HashMap::new()),
        }
    }

    /// Number of live polling jobs.
    pub fn job_count(&self) -> usize {
        self.jobs
            .lock()
            .unwrap()
            .values()
            .filter(|h| !h.is_finished())
            .count()
    }

    /// Cancel every polling job, e.g. on shutdown.
    pub fn shutdown(&self) {
        let mut jobs = self.jobs.lock().unwrap();
        let count = jobs.len();
        for (_, handle) in jobs.drain() {
            handle.abort();
        }
        info!("discovery scheduler shut down, cancelled {count} polling jobs");
    }

    fn spawn_poll_job(&self, service_uuid: Uuid) -> JoinHandle<()> {
        let services = self.services.clone();
        let probe = self.probe.clone();
        let config = self.config.clone();

        tokio::spawn(async move {
            loop {
                let service = match services.find_by_uuid(service_uuid).await {
                    Ok(Some(service)) => service,
                    Ok(None) => {
                        debug!(
                            service_uuid = %service_uuid,
                            "service record gone, stopping reachability poll"
                        );
                        break;
                    }
                    Err(e) => {
                        error!(
                            service_uuid = %service_uuid,
                            "failed to load service for polling: {e}"
                        );
                        tokio::time::sleep(Duration::from_secs(
                            config.get().poll_interval_seconds,
                        ))
                        .await;
                        continue;
                    }
                };

                if probe.probe(&service).await {
                    if let Err(e) = services.record_contact(service_uuid, Utc::now()).await {
                        error!(
                            service_uuid = %service_uuid,
                            "failed to record service contact: {e}"
                        );
                    }
                } else {
                    warn!(
                        "{} did not answer reachability poll",
                        service.entity_description()
                    );
                    if let Err(e) = services.mark_unreachable(service_uuid).await {
                        error!(
                            service_uuid = %service_uuid,
                            "failed to mark service unreachable: {e}"
                        );
                    }
                }

                // Interval re-read each cycle so reconfiguration applies
                // without rescheduling.
                tokio::time::sleep(Duration::from_secs(config.get().poll_interval_seconds)).await;
            }
        })
    }
}

#[async_trait]
impl DiscoveryScheduling for DiscoveryScheduler {
    async fn schedule(&self, service_uuid: Uuid) {
        let mut jobs = self.jobs.lock().unwrap();

        if let Some(existing) = jobs.get(&service_uuid) {
            if !existing.is_finished() {
                debug!(
                    service_uuid = %service_uuid,
                    "polling already scheduled, keeping existing job"
                );
                return;
            }
        }

        info!(service_uuid = %service_uuid, "scheduling reachability polling");
        let handle = self.spawn_poll_job(service_uuid);
        jobs.insert(service_uuid, handle);
    }

    async fn cancel(&self, service_uuid: Uuid) {
        let mut jobs = self.jobs.lock().unwrap();
        match jobs.remove(&service_uuid) {
            Some(handle) => {
                handle.abort();
                info!(service_uuid = %service_uuid, "cancelled reachability polling");
            }
            None => {
                // Absent or already cancelled: a no-op, not an error.
                debug!(
                    service_uuid = %service_uuid,
                    "cancel requested for unscheduled service"
                );
            }
        }
    }
}
