use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use composer_core::ComposerResult;

/// A single idempotent-intent unit of hardware configuration.
///
/// A task instance belongs to exactly one chain and runs exactly once.
/// `run` must fail loudly on any precondition violation; a task whose
/// required identities are unbound returns `Precondition` immediately and
/// performs no partial work.
#[async_trait]
pub trait AssemblyTask: Send + Sync {
    /// Short name used in logs and failure attribution.
    fn name(&self) -> &str;

    /// Bind the composed node this task operates on. The chain builder
    /// calls this once for every task before any of them execute.
    fn bind_node(&mut self, node_id: i64);

    /// UUID of the management service this task's work is issued against,
    /// or `None` for purely local steps. Read-only; safe to call whether
    /// or not the task has run.
    async fn owning_service(&self) -> ComposerResult<Option<Uuid>>;

    /// Perform exactly one hardware-configuration step. The effect is
    /// committed durably before the chain moves on.
    async fn run(&self) -> ComposerResult<()>;
}

/// Caller-supplied execution seam: the chain hands each task to the
/// runner instead of invoking it directly, so callers can instrument
/// every step uniformly.
#[async_trait]
pub trait TaskRunner: Send + Sync {
    async fn run_task(&self, task: &dyn AssemblyTask) -> ComposerResult<()>;
}

/// Runner that invokes the task with no instrumentation.
pub struct DirectRunner;

#[async_trait]
impl TaskRunner for DirectRunner {
    async fn run_task(&self, task: &dyn AssemblyTask) -> ComposerResult<()> {
        task.run().await
    }
}

/// Runner that logs each task's elapsed execution time.
pub struct TimedRunner;

#[async_trait]
impl TaskRunner for TimedRunner {
    async fn run_task(&self, task: &dyn AssemblyTask) -> ComposerResult<()> {
        debug!(task = task.name(), "running assembly task");
        let started = Instant::now();
        let result = task.run().await;
        info!(
            task = task.name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            success = result.is_ok(),
            "assembly task finished"
        );
        result
    }
}
