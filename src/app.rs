use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use composer_assembly::ComposedNodeSanitizer;
use composer_core::traits::{ComposedNodeRepository, DiscoveryScheduling, ExternalServiceRepository};
use composer_core::{AppConfig, ConfigHolder, ServiceLifecycleConfig};
use composer_discovery::{
    DiscoveryScheduler, HttpReachabilityProbe, ServiceRemovalJob, ServiceRemovalSweep,
};
use composer_infrastructure::{
    create_pool, PostgresComposedNodeRepository, PostgresExternalServiceRepository,
};

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Wires repositories and services and drives the process lifecycle.
pub struct Application {
    nodes: Arc<dyn ComposedNodeRepository>,
    services: Arc<dyn ExternalServiceRepository>,
    scheduler: Arc<DiscoveryScheduler>,
    removal_job: ServiceRemovalJob,
}

impl Application {
    pub async fn new(config: AppConfig) -> Result<Self> {
        let pool = create_pool(&config.database)
            .await
            .context("failed to connect to database")?;

        let nodes: Arc<dyn ComposedNodeRepository> =
            Arc::new(PostgresComposedNodeRepository::new(pool.clone()));
        let services: Arc<dyn ExternalServiceRepository> =
            Arc::new(PostgresExternalServiceRepository::new(pool.clone()));

        let lifecycle_config: Arc<ConfigHolder<ServiceLifecycleConfig>> =
            Arc::new(ConfigHolder::new(config.service_lifecycle.clone()));

        let probe = Arc::new(
            HttpReachabilityProbe::new(PROBE_TIMEOUT)
                .context("failed to build reachability probe")?,
        );
        let scheduler = Arc::new(DiscoveryScheduler::new(
            services.clone(),
            probe,
            lifecycle_config.clone(),
        ));

        let sweep = Arc::new(ServiceRemovalSweep::new(
            scheduler.clone() as Arc<dyn DiscoveryScheduling>,
            services.clone(),
            lifecycle_config.clone(),
        ));
        let removal_job = ServiceRemovalJob::new(sweep, lifecycle_config);

        Ok(Self {
            nodes,
            services,
            scheduler,
            removal_job,
        })
    }

    /// Run until a shutdown signal arrives.
    pub async fn run(mut self) -> Result<()> {
        // Recovery must complete before any new assembly work is
        // accepted: chains interrupted by the previous shutdown can never
        // be resumed.
        let sanitizer = ComposedNodeSanitizer::new(self.nodes.clone());
        sanitizer
            .sanitize_interrupted_nodes()
            .await
            .context("startup sanitization failed")?;

        // Resume reachability polling for every known service.
        let known = self
            .services
            .list_all()
            .await
            .context("failed to list external services")?;
        for service in &known {
            self.scheduler.schedule(service.uuid).await;
        }
        info!("polling {} known external services", known.len());

        self.removal_job.start();
        info!("composer is ready");

        tokio::signal::ctrl_c()
            .await
            .context("failed to listen for shutdown signal")?;
        info!("shutdown signal received");

        self.removal_job.stop().await;
        self.scheduler.shutdown();
        Ok(())
    }
}
