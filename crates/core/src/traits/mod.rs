mod actions;
mod repository;
mod scheduling;

pub use actions::FabricActions;
pub use repository::{ComposedNodeRepository, ExternalServiceRepository, FabricRepository};
pub use scheduling::DiscoveryScheduling;
