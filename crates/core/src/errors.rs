use thiserror::Error;
use uuid::Uuid;

use crate::models::NodeState;

/// Error reported by a remote hardware-management invocation.
///
/// Carries the action name and, when resolvable, the service the action
/// was issued against so failures can be attributed during diagnostics.
#[derive(Debug, Error)]
#[error("remote action '{action}' failed: {message}")]
pub struct ActionError {
    pub action: String,
    pub service_uuid: Option<Uuid>,
    pub message: String,
}

impl ActionError {
    pub fn new(action: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            service_uuid: None,
            message: message.into(),
        }
    }

    pub fn for_service(mut self, service_uuid: Uuid) -> Self {
        self.service_uuid = Some(service_uuid);
        self
    }
}

/// Unified error type for the composer system.
#[derive(Debug, Error)]
pub enum ComposerError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("database operation error: {0}")]
    DatabaseOperation(String),

    #[error("composed node not found: {id}")]
    NodeNotFound { id: i64 },

    #[error("zone not found: {id}")]
    ZoneNotFound { id: i64 },

    #[error("endpoint not found: {id}")]
    EndpointNotFound { id: i64 },

    #[error("external service not found: {uuid}")]
    ServiceNotFound { uuid: Uuid },

    #[error("precondition violated: {0}")]
    Precondition(String),

    #[error("assembly task '{task}' failed")]
    ActionFailed {
        task: String,
        #[source]
        source: ActionError,
    },

    #[error("invalid state transition for node {id}: {from:?} -> {to:?}")]
    InvalidStateTransition {
        id: i64,
        from: NodeState,
        to: NodeState,
    },

    #[error("assembly already in progress for node {id}")]
    AssemblyInProgress { id: i64 },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Unified Result type.
pub type ComposerResult<T> = std::result::Result<T, ComposerError>;

/// Render an error together with its source chain, for diagnostics that
/// must retain the original cause (e.g. the failure detail persisted on a
/// composed node).
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_chain_includes_cause() {
        let err = ComposerError::ActionFailed {
            task: "endpoint-attach".to_string(),
            source: ActionError::new("attach-endpoint", "zone update rejected"),
        };
        let rendered = error_chain(&err);
        assert!(rendered.contains("endpoint-attach"));
        assert!(rendered.contains("zone update rejected"));
    }
}
