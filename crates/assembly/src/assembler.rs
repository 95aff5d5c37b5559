//! Orchestrates one assembly chain per composed node.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use composer_core::errors::error_chain;
use composer_core::models::NodeState;
use composer_core::traits::ComposedNodeRepository;
use composer_core::{ComposerError, ComposerResult};

use crate::task::{AssemblyTask, TaskRunner};
use crate::task_chain::{ChainFailureHandler, TaskChainBuilder};

/// Executes assembly chains against composed nodes.
///
/// Moving the node Allocated -> Assembling is the entry ticket for a
/// chain: a second chain issued against the same node observes Assembling
/// and is rejected, so at most one chain mutates a node at a time.
pub struct NodeAssembler {
    nodes: Arc<dyn ComposedNodeRepository>,
    runner: Arc<dyn TaskRunner>,
}

impl NodeAssembler {
    pub fn new(nodes: Arc<dyn ComposedNodeRepository>, runner: Arc<dyn TaskRunner>) -> Self {
        Self { nodes, runner }
    }

    /// Run `tasks` as the assembly chain for node `node_id`.
    ///
    /// Chain failures do not surface as an `Err` here: they are recorded
    /// on the node (state Failed, originating error retained) by the
    /// installed failure handler. `Err` means the chain never started.
    pub async fn assemble(
        &self,
        node_id: i64,
        tasks: Vec<Box<dyn AssemblyTask>>,
    ) -> ComposerResult<()> {
        let node = self
            .nodes
            .find_by_id(node_id)
            .await?
            .ok_or(ComposerError::NodeNotFound { id: node_id })?;

        if node.state == NodeState::Assembling {
            return Err(ComposerError::AssemblyInProgress { id: node_id });
        }
        if !node.can_start_assembly() {
            return Err(ComposerError::InvalidStateTransition {
                id: node_id,
                from: node.state,
                to: NodeState::Assembling,
            });
        }

        self.nodes
            .update_state(node_id, NodeState::Assembling, None)
            .await?;
        info!(
            node_id,
            tasks = tasks.len(),
            "starting assembly chain for {}",
            node.entity_description()
        );

        let handler = Arc::new(NodeFailureHandler {
            node_id,
            nodes: self.nodes.clone(),
        });

        TaskChainBuilder::prepare_chain(tasks)
            .for_composed_node(node_id)
            .use_failure_handler(handler)
            .execute(self.runner.as_ref())
            .await
    }
}

/// Marks the node Failed and retains the originating error for
/// diagnostics. The already-applied prefix of the chain stays committed;
/// recovering from it is a caller decision (a new chain) or, after a
/// crash, the sanitizer's.
struct NodeFailureHandler {
    node_id: i64,
    nodes: Arc<dyn ComposedNodeRepository>,
}

#[async_trait]
impl ChainFailureHandler for NodeFailureHandler {
    async fn on_failure(&self, error: ComposerError) {
        let detail = error_chain(&error);
        error!(node_id = self.node_id, "assembly failed: {detail}");

        if let Err(e) = self
            .nodes
            .update_state(self.node_id, NodeState::Failed, Some(&detail))
            .await
        {
            error!(
                node_id = self.node_id,
                "failed to record assembly failure: {e}"
            );
        }
    }
}
