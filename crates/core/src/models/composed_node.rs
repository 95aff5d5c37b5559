use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Assembly state of a composed node.
///
/// Allocated nodes have an accepted allocation plan but no hardware
/// configuration applied yet. Assembling marks a node with a task chain
/// actively mutating it. Assembled and Failed are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum NodeState {
    #[serde(rename = "ALLOCATED")]
    Allocated,
    #[serde(rename = "ASSEMBLING")]
    Assembling,
    #[serde(rename = "ASSEMBLED")]
    Assembled,
    #[serde(rename = "FAILED")]
    Failed,
}

impl NodeState {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeState::Allocated => "ALLOCATED",
            NodeState::Assembling => "ASSEMBLING",
            NodeState::Assembled => "ASSEMBLED",
            NodeState::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, NodeState::Assembled | NodeState::Failed)
    }
}

impl sqlx::Type<sqlx::Postgres> for NodeState {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        sqlx::postgres::PgTypeInfo::with_name("VARCHAR")
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for NodeState {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        match s {
            "ALLOCATED" => Ok(NodeState::Allocated),
            "ASSEMBLING" => Ok(NodeState::Assembling),
            "ASSEMBLED" => Ok(NodeState::Assembled),
            "FAILED" => Ok(NodeState::Failed),
            _ => Err(format!("Invalid node state: {s}").into()),
        }
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Postgres> for NodeState {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode(self.as_str(), buf)
    }
}

/// A logical compute unit composed from pooled, disaggregated hardware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposedNode {
    pub id: i64,
    pub name: String,
    pub state: NodeState,
    /// Diagnostic context retained when assembly fails.
    pub state_detail: Option<String>,
    /// Fabric resources bound to this node by the allocation plan.
    pub resource_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ComposedNode {
    pub fn new(name: String, resource_ids: Vec<i64>) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // assigned by the database
            name,
            state: NodeState::Allocated,
            state_detail: None,
            resource_ids,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_assembled(&self) -> bool {
        matches!(self.state, NodeState::Assembled)
    }

    /// Whether a new assembly chain may start against this node.
    pub fn can_start_assembly(&self) -> bool {
        matches!(self.state, NodeState::Allocated)
    }

    pub fn entity_description(&self) -> String {
        format!(
            "composed node '{}' (id: {}, state: {})",
            self.name,
            self.id,
            self.state.as_str()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_node_is_allocated() {
        let node = ComposedNode::new("node-1".to_string(), vec![1, 2]);
        assert_eq!(node.state, NodeState::Allocated);
        assert!(node.can_start_assembly());
        assert!(!node.is_assembled());
        assert!(node.state_detail.is_none());
    }

    #[test]
    fn test_terminal_states() {
        assert!(NodeState::Assembled.is_terminal());
        assert!(NodeState::Failed.is_terminal());
        assert!(!NodeState::Allocated.is_terminal());
        assert!(!NodeState::Assembling.is_terminal());
    }
}
