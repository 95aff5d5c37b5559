use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use composer_assembly::{
    AssemblyTask, ChainFailureHandler, DirectRunner, TaskChainBuilder, TaskRunner,
};
use composer_core::{ComposerError, ComposerResult};
use composer_testing_utils::ScriptedTask;

struct CapturingHandler {
    seen: Arc<Mutex<Option<String>>>,
}

#[async_trait]
impl ChainFailureHandler for CapturingHandler {
    async fn on_failure(&self, error: ComposerError) {
        *self.seen.lock().unwrap() = Some(error.to_string());
    }
}

struct CountingRunner {
    invocations: AtomicUsize,
}

#[async_trait]
impl TaskRunner for CountingRunner {
    async fn run_task(&self, task: &dyn AssemblyTask) -> ComposerResult<()> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        task.run().await
    }
}

#[tokio::test]
async fn test_tasks_execute_in_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let tasks: Vec<Box<dyn AssemblyTask>> = vec![
        Box::new(ScriptedTask::succeeding("task-a", log.clone())),
        Box::new(ScriptedTask::succeeding("task-b", log.clone())),
        Box::new(ScriptedTask::succeeding("task-c", log.clone())),
    ];

    let result = TaskChainBuilder::prepare_chain(tasks)
        .for_composed_node(1)
        .execute(&DirectRunner)
        .await;

    assert!(result.is_ok());
    assert_eq!(*log.lock().unwrap(), vec!["task-a", "task-b", "task-c"]);
}

#[tokio::test]
async fn test_failure_stops_chain_and_propagates_without_handler() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let tasks: Vec<Box<dyn AssemblyTask>> = vec![
        Box::new(ScriptedTask::succeeding("task-a", log.clone())),
        Box::new(ScriptedTask::failing("task-b", "zone update failed", log.clone())),
        Box::new(ScriptedTask::succeeding("task-c", log.clone())),
    ];

    let result = TaskChainBuilder::prepare_chain(tasks)
        .for_composed_node(1)
        .execute(&DirectRunner)
        .await;

    assert!(matches!(
        result,
        Err(ComposerError::ActionFailed { ref task, .. }) if task == "task-b"
    ));
    // task-c never executed
    assert_eq!(*log.lock().unwrap(), vec!["task-a", "task-b"]);
}

#[tokio::test]
async fn test_failure_goes_to_installed_handler() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::new(Mutex::new(None));
    let tasks: Vec<Box<dyn AssemblyTask>> = vec![
        Box::new(ScriptedTask::succeeding("task-a", log.clone())),
        Box::new(ScriptedTask::failing("task-b", "zone update failed", log.clone())),
        Box::new(ScriptedTask::succeeding("task-c", log.clone())),
    ];

    let result = TaskChainBuilder::prepare_chain(tasks)
        .for_composed_node(1)
        .use_failure_handler(Arc::new(CapturingHandler { seen: seen.clone() }))
        .execute(&DirectRunner)
        .await;

    // With a handler installed the error does not surface to the caller.
    assert!(result.is_ok());
    let captured = seen.lock().unwrap().clone();
    assert!(captured.unwrap().contains("task-b"));
    assert_eq!(*log.lock().unwrap(), vec!["task-a", "task-b"]);
}

#[tokio::test]
async fn test_empty_chain_executes_trivially() {
    let seen = Arc::new(Mutex::new(None));

    let result = TaskChainBuilder::prepare_chain(vec![])
        .for_composed_node(1)
        .use_failure_handler(Arc::new(CapturingHandler { seen: seen.clone() }))
        .execute(&DirectRunner)
        .await;

    assert!(result.is_ok());
    assert!(seen.lock().unwrap().is_none());
}

#[tokio::test]
async fn test_node_id_bound_to_every_task_before_execution() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let task_a = ScriptedTask::succeeding("task-a", log.clone());
    let task_b = ScriptedTask::succeeding("task-b", log.clone());
    let task_c = ScriptedTask::succeeding("task-c", log.clone());
    let handles = vec![
        task_a.bound_node_handle(),
        task_b.bound_node_handle(),
        task_c.bound_node_handle(),
    ];

    let chain = TaskChainBuilder::prepare_chain(vec![
        Box::new(task_a),
        Box::new(task_b),
        Box::new(task_c),
    ])
    .for_composed_node(42);

    // Binding happened once, before any task ran.
    for handle in &handles {
        assert_eq!(*handle.lock().unwrap(), Some(42));
    }

    chain.execute(&DirectRunner).await.unwrap();
    assert_eq!(log.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_runner_invoked_once_per_task() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let runner = CountingRunner {
        invocations: AtomicUsize::new(0),
    };
    let tasks: Vec<Box<dyn AssemblyTask>> = vec![
        Box::new(ScriptedTask::succeeding("task-a", log.clone())),
        Box::new(ScriptedTask::succeeding("task-b", log.clone())),
    ];

    TaskChainBuilder::prepare_chain(tasks)
        .for_composed_node(1)
        .execute(&runner)
        .await
        .unwrap();

    assert_eq!(runner.invocations.load(Ordering::SeqCst), 2);
}
