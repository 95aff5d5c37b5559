//! External service lifecycle management: per-service reachability
//! polling and time-based eviction of services that stay unreachable
//! past the configured retention.

pub mod probe;
pub mod removal;
pub mod scheduler;

pub use probe::{HttpReachabilityProbe, ReachabilityProbe};
pub use removal::{ServiceRemovalJob, ServiceRemovalSweep, SweepReport};
pub use scheduler::DiscoveryScheduler;
