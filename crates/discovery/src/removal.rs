//! Periodic eviction of services that have gone unreachable for longer
//! than the configured retention.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use composer_core::traits::{DiscoveryScheduling, ExternalServiceRepository};
use composer_core::{ComposerResult, ConfigHolder, ServiceLifecycleConfig};

/// Outcome of one sweep pass.
#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    pub evicted: usize,
    pub failed: usize,
}

/// Evicts stale service records and cancels their discovery polling.
///
/// Retention is re-read from the refreshable config on every run. Each
/// service's eviction is its own unit of work: a failure is logged and
/// the sweep moves on, leaving the record to be retried on the next run
/// rather than blocking eviction of the others.
pub struct ServiceRemovalSweep {
    scheduler: Arc<dyn DiscoveryScheduling>,
    services: Arc<dyn ExternalServiceRepository>,
    config: Arc<ConfigHolder<ServiceLifecycleConfig>>,
}

impl ServiceRemovalSweep {
    pub fn new(
        scheduler: Arc<dyn DiscoveryScheduling>,
        services: Arc<dyn ExternalServiceRepository>,
        config: Arc<ConfigHolder<ServiceLifecycleConfig>>,
    ) -> Self {
        Self {
            scheduler,
            services,
            config,
        }
    }

    pub async fn run_once(&self) -> ComposerResult<SweepReport> {
        debug!("checking whether unreachable services should be evicted");

        let retention = self.config.get().retention();
        let stale = self
            .services
            .list_unreachable_longer_than(retention)
            .await?;

        let mut report = SweepReport::default();
        for service in stale {
            info!(
                "{} is unreachable longer than {}s - will be evicted",
                service.entity_description(),
                retention.num_seconds()
            );

            self.scheduler.cancel(service.uuid).await;

            match self.services.remove(service.uuid).await {
                Ok(()) => report.evicted += 1,
                Err(e) => {
                    error!(
                        service_uuid = %service.uuid,
                        "failed to evict service, will retry on next sweep: {e}"
                    );
                    report.failed += 1;
                }
            }
        }

        if report.evicted > 0 || report.failed > 0 {
            info!(
                evicted = report.evicted,
                failed = report.failed,
                "service removal sweep finished"
            );
        }
        Ok(report)
    }
}

/// Periodic driver for [`ServiceRemovalSweep`].
///
/// Ticks run sequentially inside one spawned task, so a sweep never
/// overlaps the previous one. The interval is re-read from config on
/// every cycle.
pub struct ServiceRemovalJob {
    sweep: Arc<ServiceRemovalSweep>,
    config: Arc<ConfigHolder<ServiceLifecycleConfig>>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    job_handle: Option<JoinHandle<()>>,
}

impl ServiceRemovalJob {
    pub fn new(
        sweep: Arc<ServiceRemovalSweep>,
        config: Arc<ConfigHolder<ServiceLifecycleConfig>>,
    ) -> Self {
        Self {
            sweep,
            config,
            shutdown_tx: None,
            job_handle: None,
        }
    }

    pub fn start(&mut self) {
        if self.job_handle.is_some() {
            warn!("service removal job already started");
            return;
        }

        info!("starting service removal sweep job");
        let (shutdown_tx, mut shutdown_rx) = tokio::sync::oneshot::channel();
        self.shutdown_tx = Some(shutdown_tx);

        let sweep = self.sweep.clone();
        let config = self.config.clone();

        let handle = tokio::spawn(async move {
            loop {
                let interval = Duration::from_secs(config.get().sweep_interval_seconds);
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {
                        if let Err(e) = sweep.run_once().await {
                            error!("service removal sweep failed: {e}");
                        }
                    }
                    _ = &mut shutdown_rx => {
                        info!("service removal job shutdown requested");
                        break;
                    }
                }
            }
        });

        self.job_handle = Some(handle);
    }

    pub async fn stop(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        if let Some(handle) = self.job_handle.take() {
            if let Err(e) = handle.await {
                warn!("error waiting for service removal job to stop: {e}");
            }
        }
        info!("service removal job stopped");
    }
}
