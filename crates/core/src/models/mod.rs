mod composed_node;
mod external_service;
mod fabric;

pub use composed_node::{ComposedNode, NodeState};
pub use external_service::ExternalService;
pub use fabric::{Endpoint, Zone};
