use std::sync::Arc;

use tracing::{error, info, warn};

use composer_core::models::NodeState;
use composer_core::traits::ComposedNodeRepository;
use composer_core::ComposerResult;

/// Startup recovery pass over persisted composed nodes.
///
/// In-memory chain state (current task, runner, handler) does not survive
/// a restart, and the set of already-applied hardware changes cannot be
/// known with certainty, so an interrupted chain is never resumed: every
/// node found Assembling is forced to Failed. Runs once during bootstrap,
/// before any new assembly request is accepted.
pub struct ComposedNodeSanitizer {
    nodes: Arc<dyn ComposedNodeRepository>,
}

impl ComposedNodeSanitizer {
    pub fn new(nodes: Arc<dyn ComposedNodeRepository>) -> Self {
        Self { nodes }
    }

    /// Returns the number of nodes forced to Failed. Idempotent: a second
    /// run finds nothing left in Assembling. Terminal nodes are untouched.
    pub async fn sanitize_interrupted_nodes(&self) -> ComposerResult<usize> {
        info!("failing all composed nodes that were not assembled before restart");

        let interrupted = self.nodes.list_by_state(NodeState::Assembling).await?;
        let mut sanitized = 0usize;

        for node in interrupted {
            warn!(
                node_id = node.id,
                "{} was interrupted mid-assembly, forcing to Failed",
                node.entity_description()
            );

            match self
                .nodes
                .update_state(
                    node.id,
                    NodeState::Failed,
                    Some("assembly interrupted by restart"),
                )
                .await
            {
                Ok(()) => sanitized += 1,
                Err(e) => {
                    // Leave the node for the next restart rather than
                    // aborting the whole pass.
                    error!(node_id = node.id, "failed to sanitize node: {e}");
                }
            }
        }

        info!("sanitized {sanitized} interrupted composed nodes");
        Ok(sanitized)
    }
}
