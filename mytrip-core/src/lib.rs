//! Core types, list synchronization, and service wiring for the mytrip tour browser.

/// Bundles of ports that make up a tour data backend.
pub mod backend;
/// Korean-aware collation keys used for name ordering.
pub mod collation;
/// Domain models and identifiers shared by all providers.
pub mod model;
/// Traits describing the provider interfaces.
pub mod ports;
/// High-level service facade used by clients.
pub mod service;
/// Paginated fetch and selection orchestration.
pub mod session;
/// Sorting, merging, and selection helpers over tour lists.
pub mod sort;
#[cfg(test)]
mod testing;

pub use backend::*;
pub use model::*;
pub use ports::*;
pub use service::*;
pub use session::*;
pub use sort::*;
