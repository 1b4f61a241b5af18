//! Bundle of ports implementing one tour data backend.

use std::sync::Arc;

use crate::ports::{TourDetailPort, TourListPort};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Metadata describing a backend.
pub struct BackendMeta {
    /// Short identifier used in logs.
    pub id: String,
    /// Human-friendly name.
    pub name: String,
}

/// Collection of ports served by a single tour data provider.
pub struct TourBackend {
    /// Static metadata describing the backend.
    pub meta: BackendMeta,
    /// Implementation for paginated listing and keyword search.
    pub list_port: Arc<dyn TourListPort>,
    /// Implementation for detail lookups.
    pub detail_port: Arc<dyn TourDetailPort>,
}

impl TourBackend {
    /// Shared handle to the list port, for handing to the session runner.
    #[must_use]
    pub fn list_port(&self) -> Arc<dyn TourListPort> {
        Arc::clone(&self.list_port)
    }
}
