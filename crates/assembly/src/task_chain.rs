//! Staged construction and fail-fast execution of assembly chains.
//!
//! The builder is a three-stage protocol enforced by the type system:
//! supply the ordered tasks, bind the target composed node, then
//! (optionally install a failure handler and) execute. Stages cannot be
//! skipped or reordered.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error};

use composer_core::{ComposerError, ComposerResult};

use crate::task::{AssemblyTask, TaskRunner};

/// Receives the single failure of a chain instead of the `execute`
/// caller. Typically records the error against the composed node.
#[async_trait]
pub trait ChainFailureHandler: Send + Sync {
    async fn on_failure(&self, error: ComposerError);
}

/// Entry stage of the chain protocol.
pub struct TaskChainBuilder;

impl TaskChainBuilder {
    /// Stage one: supply the tasks in execution order. An empty sequence
    /// is allowed and executes trivially.
    pub fn prepare_chain(tasks: Vec<Box<dyn AssemblyTask>>) -> NodeBinding {
        NodeBinding { tasks }
    }
}

/// Stage two: the chain knows its tasks but not its target node yet.
pub struct NodeBinding {
    tasks: Vec<Box<dyn AssemblyTask>>,
}

impl NodeBinding {
    /// Bind `node_id` to every task. Binding happens here, once, so no
    /// task can ever run unbound.
    pub fn for_composed_node(mut self, node_id: i64) -> TaskChain {
        for task in &mut self.tasks {
            task.bind_node(node_id);
        }
        TaskChain {
            node_id,
            tasks: self.tasks,
            failure_handler: None,
        }
    }
}

/// Stage three: an executable chain bound to one composed node.
pub struct TaskChain {
    node_id: i64,
    tasks: Vec<Box<dyn AssemblyTask>>,
    failure_handler: Option<Arc<dyn ChainFailureHandler>>,
}

impl TaskChain {
    pub fn use_failure_handler(mut self, handler: Arc<dyn ChainFailureHandler>) -> Self {
        self.failure_handler = Some(handler);
        self
    }

    /// Run the tasks strictly in order through `runner`, stopping at the
    /// first failure. The failed task's error goes to the installed
    /// handler (and `execute` returns Ok), or is propagated when no
    /// handler was installed. Already-executed tasks are not rolled
    /// back; their effects stay committed.
    pub async fn execute(self, runner: &dyn TaskRunner) -> ComposerResult<()> {
        let total = self.tasks.len();
        for (index, task) in self.tasks.iter().enumerate() {
            debug!(
                node_id = self.node_id,
                task = task.name(),
                step = index + 1,
                total,
                "executing assembly chain step"
            );

            if let Err(err) = runner.run_task(task.as_ref()).await {
                let owning_service = task.owning_service().await.ok().flatten();
                error!(
                    node_id = self.node_id,
                    task = task.name(),
                    step = index + 1,
                    total,
                    owning_service = ?owning_service,
                    "assembly chain aborted: {err}"
                );

                match &self.failure_handler {
                    Some(handler) => {
                        handler.on_failure(err).await;
                        return Ok(());
                    }
                    None => return Err(err),
                }
            }
        }
        Ok(())
    }
}
