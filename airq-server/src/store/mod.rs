//! Persistent storage for the station and measurement caches.
//!
//! Reads never fail: a missing or unreadable cache is reported as empty so
//! the lookup falls through to a provider fetch. Only writes can return an
//! error, and the caller decides whether that matters.

mod error;
mod file;
mod memory;

use chrono::{DateTime, Utc};

use crate::domain::{MeasurementMap, Station};

pub use error::CacheError;
pub use file::{FileCacheConfig, FileCacheStore};
pub use memory::MemoryCacheStore;

/// The cached station list and when it was fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct StationCacheRecord {
    pub stations: Vec<Station>,

    /// `None` if the stored record had no usable timestamp.
    pub fetched_at: Option<DateTime<Utc>>,
}

impl StationCacheRecord {
    pub fn new(stations: Vec<Station>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            stations,
            fetched_at: Some(fetched_at),
        }
    }
}

/// Storage for both caches.
///
/// The station record is replaced wholesale. The measurement map is written
/// as a whole too, so callers merge their entry into a freshly read map
/// before writing it back.
pub trait CacheStore {
    /// The current station record, or `None` if absent or unreadable.
    fn read_station_record(&self) -> Option<StationCacheRecord>;

    /// Replace the station record.
    fn write_station_record(&self, record: &StationCacheRecord) -> Result<(), CacheError>;

    /// All cached measurements; empty if absent or unreadable.
    fn read_measurement_map(&self) -> MeasurementMap;

    /// Replace the measurement map.
    fn write_measurement_map(&self, map: &MeasurementMap) -> Result<(), CacheError>;
}
