//! Application state for the web layer.

use std::sync::Arc;

use crate::cityair::CityAirClient;
use crate::clock::SystemClock;
use crate::lookup::LookupOrchestrator;
use crate::store::FileCacheStore;

/// The lookup as wired for production.
pub type Lookup = LookupOrchestrator<CityAirClient, FileCacheStore, SystemClock>;

/// Shared application state.
///
/// Generic over the lookup so routes can be exercised with mock
/// collaborators.
pub struct AppState<L = Lookup> {
    /// Nearest-station lookup
    pub lookup: Arc<L>,
}

impl<L> AppState<L> {
    /// Create a new app state.
    pub fn new(lookup: L) -> Self {
        Self {
            lookup: Arc::new(lookup),
        }
    }
}

impl<L> Clone for AppState<L> {
    fn clone(&self) -> Self {
        Self {
            lookup: Arc::clone(&self.lookup),
        }
    }
}
