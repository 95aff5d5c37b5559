use std::sync::Arc;

use uuid::Uuid;

use composer_assembly::tasks::EndpointAttachTask;
use composer_assembly::AssemblyTask;
use composer_core::ComposerError;
use composer_testing_utils::{
    EndpointBuilder, MockFabricActions, MockFabricRepository, ZoneBuilder,
};

#[tokio::test]
async fn test_attach_invokes_remote_action() {
    let fabric = Arc::new(MockFabricRepository::new());
    let actions = Arc::new(MockFabricActions::new());
    fabric.insert_zone(ZoneBuilder::new().with_id(10).build());
    fabric.insert_endpoint(EndpointBuilder::new().with_id(20).build());

    let mut task = EndpointAttachTask::new(fabric, actions.clone())
        .with_zone(10)
        .with_endpoint(20);
    task.bind_node(1);

    task.run().await.unwrap();
    assert_eq!(actions.attached_pairs(), vec![(10, 20)]);
}

#[tokio::test]
async fn test_unbound_identities_fail_before_any_work() {
    let fabric = Arc::new(MockFabricRepository::new());
    let actions = Arc::new(MockFabricActions::new());
    fabric.insert_zone(ZoneBuilder::new().with_id(10).build());

    // endpoint id never bound
    let task = EndpointAttachTask::new(fabric, actions.clone()).with_zone(10);

    let result = task.run().await;
    assert!(matches!(result, Err(ComposerError::Precondition(_))));
    assert!(actions.attached_pairs().is_empty());
}

#[tokio::test]
async fn test_remote_failure_is_wrapped_with_attribution() {
    let service_uuid = Uuid::new_v4();
    let fabric = Arc::new(MockFabricRepository::new());
    let actions = Arc::new(MockFabricActions::new());
    fabric.insert_zone(
        ZoneBuilder::new()
            .with_id(10)
            .with_service_uuid(service_uuid)
            .build(),
    );
    fabric.insert_endpoint(EndpointBuilder::new().with_id(20).build());
    actions.fail_for_zone(10);

    let task = EndpointAttachTask::new(fabric, actions)
        .with_zone(10)
        .with_endpoint(20);

    match task.run().await {
        Err(ComposerError::ActionFailed { task, source }) => {
            assert_eq!(task, "endpoint-attach");
            assert_eq!(source.service_uuid, Some(service_uuid));
        }
        other => panic!("expected ActionFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_zone_record() {
    let fabric = Arc::new(MockFabricRepository::new());
    let actions = Arc::new(MockFabricActions::new());
    fabric.insert_endpoint(EndpointBuilder::new().with_id(20).build());

    let task = EndpointAttachTask::new(fabric, actions)
        .with_zone(99)
        .with_endpoint(20);

    let result = task.run().await;
    assert!(matches!(result, Err(ComposerError::ZoneNotFound { id: 99 })));
}

#[tokio::test]
async fn test_owning_service_resolvable_before_run() {
    let service_uuid = Uuid::new_v4();
    let fabric = Arc::new(MockFabricRepository::new());
    let actions = Arc::new(MockFabricActions::new());
    fabric.insert_zone(
        ZoneBuilder::new()
            .with_id(10)
            .with_service_uuid(service_uuid)
            .build(),
    );

    let task = EndpointAttachTask::new(fabric.clone(), actions.clone()).with_zone(10);
    assert_eq!(task.owning_service().await.unwrap(), Some(service_uuid));

    // Unbound zone: loud precondition failure, not a panic.
    let unbound = EndpointAttachTask::new(fabric, actions);
    assert!(matches!(
        unbound.owning_service().await,
        Err(ComposerError::Precondition(_))
    ));
}
