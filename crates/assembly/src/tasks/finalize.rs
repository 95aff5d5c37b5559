use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use composer_core::models::NodeState;
use composer_core::traits::ComposedNodeRepository;
use composer_core::{ComposerError, ComposerResult};

use crate::task::AssemblyTask;

/// Last step of every assembly chain: flips the node from Assembling to
/// Assembled, so a node only surfaces Assembled after every hardware
/// step before it committed.
pub struct FinalizeAssemblyTask {
    node_id: Option<i64>,
    nodes: Arc<dyn ComposedNodeRepository>,
}

impl FinalizeAssemblyTask {
    pub fn new(nodes: Arc<dyn ComposedNodeRepository>) -> Self {
        Self {
            node_id: None,
            nodes,
        }
    }
}

#[async_trait]
impl AssemblyTask for FinalizeAssemblyTask {
    fn name(&self) -> &str {
        "finalize-assembly"
    }

    fn bind_node(&mut self, node_id: i64) {
        self.node_id = Some(node_id);
    }

    async fn owning_service(&self) -> ComposerResult<Option<Uuid>> {
        // Local state transition, no remote service involved.
        Ok(None)
    }

    async fn run(&self) -> ComposerResult<()> {
        let node_id = self.node_id.ok_or_else(|| {
            ComposerError::Precondition(
                "finalize invoked without a bound composed node id".to_string(),
            )
        })?;

        let node = self
            .nodes
            .find_by_id(node_id)
            .await?
            .ok_or(ComposerError::NodeNotFound { id: node_id })?;

        if node.state != NodeState::Assembling {
            return Err(ComposerError::InvalidStateTransition {
                id: node_id,
                from: node.state,
                to: NodeState::Assembled,
            });
        }

        self.nodes
            .update_state(node_id, NodeState::Assembled, None)
            .await
    }
}
