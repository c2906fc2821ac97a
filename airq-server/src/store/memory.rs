//! In-memory cache store.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::error::CacheError;
use super::{CacheStore, StationCacheRecord};
use crate::domain::MeasurementMap;

/// Cache store held entirely in memory.
///
/// Counts writes so tests can assert on refresh behaviour.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    stations: Mutex<Option<StationCacheRecord>>,
    measurements: Mutex<MeasurementMap>,
    station_writes: AtomicUsize,
    measurement_writes: AtomicUsize,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the station record.
    pub fn with_station_record(self, record: StationCacheRecord) -> Self {
        *self.stations.lock().unwrap_or_else(|e| e.into_inner()) = Some(record);
        self
    }

    /// Seed the measurement map.
    pub fn with_measurements(self, map: MeasurementMap) -> Self {
        *self.measurements.lock().unwrap_or_else(|e| e.into_inner()) = map;
        self
    }

    pub fn station_writes(&self) -> usize {
        self.station_writes.load(Ordering::SeqCst)
    }

    pub fn measurement_writes(&self) -> usize {
        self.measurement_writes.load(Ordering::SeqCst)
    }
}

impl CacheStore for MemoryCacheStore {
    fn read_station_record(&self) -> Option<StationCacheRecord> {
        self.stations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn write_station_record(&self, record: &StationCacheRecord) -> Result<(), CacheError> {
        *self.stations.lock().unwrap_or_else(|e| e.into_inner()) = Some(record.clone());
        self.station_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn read_measurement_map(&self) -> MeasurementMap {
        self.measurements
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn write_measurement_map(&self, map: &MeasurementMap) -> Result<(), CacheError> {
        *self.measurements.lock().unwrap_or_else(|e| e.into_inner()) = map.clone();
        self.measurement_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
