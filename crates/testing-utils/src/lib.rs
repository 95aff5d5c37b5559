//! Shared testing utilities for the composer workspace: in-memory mock
//! implementations of the repository/service traits and test data
//! builders. Add as a dev-dependency from the other crates.

pub mod builders;
pub mod mocks;

pub use builders::*;
pub use mocks::*;
