use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use composer_core::{ConfigHolder, ServiceLifecycleConfig};
use composer_discovery::ServiceRemovalSweep;
use composer_testing_utils::{
    ExternalServiceBuilder, MockDiscoveryScheduling, MockExternalServiceRepository,
};

fn lifecycle_config(retention_seconds: i64) -> Arc<ConfigHolder<ServiceLifecycleConfig>> {
    Arc::new(ConfigHolder::new(ServiceLifecycleConfig {
        service_retention_seconds: retention_seconds,
        ..ServiceLifecycleConfig::default()
    }))
}

#[tokio::test]
async fn test_stale_service_evicted_and_polling_cancelled() {
    let now = Utc::now();
    let stale_uuid = Uuid::new_v4();
    let fresh_uuid = Uuid::new_v4();

    let services = Arc::new(MockExternalServiceRepository::with_services(vec![
        ExternalServiceBuilder::new()
            .with_uuid(stale_uuid)
            .with_name("s1")
            .with_reachable(false)
            .with_last_seen_at(now - Duration::minutes(10))
            .build(),
        ExternalServiceBuilder::new()
            .with_uuid(fresh_uuid)
            .with_name("s2")
            .with_last_seen_at(now - Duration::minutes(2))
            .build(),
    ]));
    let scheduling = Arc::new(MockDiscoveryScheduling::new());

    // Retention of 5 minutes: s1 (10 minutes old) is stale, s2 is not.
    let sweep = ServiceRemovalSweep::new(
        scheduling.clone(),
        services.clone(),
        lifecycle_config(300),
    );
    let report = sweep.run_once().await.unwrap();

    assert_eq!(report.evicted, 1);
    assert_eq!(report.failed, 0);
    assert!(!services.contains(stale_uuid));
    assert!(services.contains(fresh_uuid));
    assert_eq!(scheduling.cancelled_uuids(), vec![stale_uuid]);
}

#[tokio::test]
async fn test_failed_eviction_does_not_block_others() {
    let now = Utc::now();
    let uuids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();

    let services = Arc::new(MockExternalServiceRepository::with_services(
        uuids
            .iter()
            .map(|uuid| {
                ExternalServiceBuilder::new()
                    .with_uuid(*uuid)
                    .with_last_seen_at(now - Duration::minutes(30))
                    .build()
            })
            .collect(),
    ));
    services.fail_remove_for(uuids[1]);
    let scheduling = Arc::new(MockDiscoveryScheduling::new());

    let sweep = ServiceRemovalSweep::new(
        scheduling.clone(),
        services.clone(),
        lifecycle_config(300),
    );
    let report = sweep.run_once().await.unwrap();

    assert_eq!(report.evicted, 2);
    assert_eq!(report.failed, 1);
    assert!(!services.contains(uuids[0]));
    assert!(services.contains(uuids[1])); // retried on the next run
    assert!(!services.contains(uuids[2]));
    // polling was cancelled for every stale service, including the one
    // whose removal failed
    assert_eq!(scheduling.cancelled_uuids().len(), 3);
}

#[tokio::test]
async fn test_retention_re_read_on_every_run() {
    let now = Utc::now();
    let uuid = Uuid::new_v4();
    let services = Arc::new(MockExternalServiceRepository::with_services(vec![
        ExternalServiceBuilder::new()
            .with_uuid(uuid)
            .with_last_seen_at(now - Duration::minutes(10))
            .build(),
    ]));
    let scheduling = Arc::new(MockDiscoveryScheduling::new());
    let config = lifecycle_config(900); // 15 minutes: nothing is stale

    let sweep = ServiceRemovalSweep::new(scheduling.clone(), services.clone(), config.clone());
    let report = sweep.run_once().await.unwrap();
    assert_eq!(report.evicted, 0);
    assert!(services.contains(uuid));

    // Tighten retention at runtime; the next run picks it up.
    config.replace(ServiceLifecycleConfig {
        service_retention_seconds: 300,
        ..ServiceLifecycleConfig::default()
    });
    let report = sweep.run_once().await.unwrap();
    assert_eq!(report.evicted, 1);
    assert!(!services.contains(uuid));
}

#[tokio::test]
async fn test_empty_registry_sweeps_clean() {
    let services = Arc::new(MockExternalServiceRepository::new());
    let scheduling = Arc::new(MockDiscoveryScheduling::new());

    let sweep = ServiceRemovalSweep::new(scheduling.clone(), services, lifecycle_config(300));
    let report = sweep.run_once().await.unwrap();

    assert_eq!(report.evicted, 0);
    assert_eq!(report.failed, 0);
    assert!(scheduling.cancelled_uuids().is_empty());
}
