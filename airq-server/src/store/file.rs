//! File-backed cache store.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::DateTime;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::warn;

use super::error::CacheError;
use super::{CacheStore, StationCacheRecord};
use crate::domain::{MeasurementMap, Station};

const STATION_FILE: &str = "station.json";
const MEASUREMENT_FILE: &str = "measurement.json";

/// On-disk layout of the station cache.
#[derive(Debug, Serialize, Deserialize)]
struct StationFile {
    stations: Vec<Station>,
    /// Unix timestamp (seconds) when the list was fetched.
    #[serde(default)]
    timestamp: Option<i64>,
}

/// Configuration for the file cache.
#[derive(Debug, Clone)]
pub struct FileCacheConfig {
    /// Directory holding both cache files.
    pub dir: PathBuf,
}

impl FileCacheConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn station_path(&self) -> PathBuf {
        self.dir.join(STATION_FILE)
    }

    pub fn measurement_path(&self) -> PathBuf {
        self.dir.join(MEASUREMENT_FILE)
    }
}

impl Default for FileCacheConfig {
    fn default() -> Self {
        Self::new(".cache")
    }
}

/// Cache store backed by two JSON files.
///
/// Writes go through a temporary file in the same directory and are renamed
/// into place, so a reader sees either the old or the new contents.
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    config: FileCacheConfig,
}

impl FileCacheStore {
    pub fn new(config: FileCacheConfig) -> Self {
        Self { config }
    }

    /// Get the cache directory.
    pub fn dir(&self) -> &Path {
        &self.config.dir
    }
}

impl CacheStore for FileCacheStore {
    fn read_station_record(&self) -> Option<StationCacheRecord> {
        let file: StationFile = read_json(&self.config.station_path())?;
        Some(StationCacheRecord {
            stations: file.stations,
            fetched_at: file
                .timestamp
                .and_then(|secs| DateTime::from_timestamp(secs, 0)),
        })
    }

    fn write_station_record(&self, record: &StationCacheRecord) -> Result<(), CacheError> {
        let file = StationFile {
            stations: record.stations.clone(),
            timestamp: record.fetched_at.map(|t| t.timestamp()),
        };
        write_json(&self.config.dir, &self.config.station_path(), &file)
    }

    fn read_measurement_map(&self) -> MeasurementMap {
        read_json(&self.config.measurement_path()).unwrap_or_default()
    }

    fn write_measurement_map(&self, map: &MeasurementMap) -> Result<(), CacheError> {
        write_json(&self.config.dir, &self.config.measurement_path(), map)
    }
}

/// Read and parse a JSON file, treating every failure as "nothing cached".
fn read_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "unreadable cache file, ignoring");
            return None;
        }
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return None;
    }

    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "corrupt cache file, ignoring");
            None
        }
    }
}

/// Atomically replace `path` with the JSON encoding of `value`.
fn write_json<T: Serialize>(dir: &Path, path: &Path, value: &T) -> Result<(), CacheError> {
    std::fs::create_dir_all(dir).map_err(|e| CacheError::io(dir, e))?;

    let json = serde_json::to_vec(value)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| CacheError::io(dir, e))?;
    tmp.write_all(&json).map_err(|e| CacheError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| CacheError::io(path, e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Measurement, StationId};
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    fn store_in(dir: &Path) -> FileCacheStore {
        FileCacheStore::new(FileCacheConfig::new(dir))
    }

    #[test]
    fn missing_files_read_as_empty() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        assert!(store.read_station_record().is_none());
        assert!(store.read_measurement_map().is_empty());
    }

    #[test]
    fn missing_directory_reads_as_empty() {
        let store = store_in(Path::new("/nonexistent/airq/cache"));
        assert!(store.read_station_record().is_none());
        assert!(store.read_measurement_map().is_empty());
    }

    #[test]
    fn station_record_round_trip() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        let fetched_at = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();

        let record = StationCacheRecord::new(
            vec![
                Station::new(1, Some(54.5), Some(83.25), true),
                Station::new(2, None, None, false),
            ],
            fetched_at,
        );
        store.write_station_record(&record).unwrap();

        assert_eq!(store.read_station_record(), Some(record));
    }

    #[test]
    fn station_file_layout() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        let fetched_at = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();

        store
            .write_station_record(&StationCacheRecord::new(vec![], fetched_at))
            .unwrap();

        let raw = std::fs::read_to_string(dir.path().join("station.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["timestamp"], fetched_at.timestamp());
        assert!(value["stations"].as_array().unwrap().is_empty());
    }

    #[test]
    fn station_record_without_timestamp() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("station.json"),
            r#"{"stations": [{"id": 1, "isOnline": true}]}"#,
        )
        .unwrap();

        let record = store_in(dir.path()).read_station_record().unwrap();
        assert_eq!(record.stations.len(), 1);
        assert!(record.fetched_at.is_none());
    }

    #[test]
    fn malformed_station_does_not_discard_the_file() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("station.json"),
            r#"{"stations": [
                {"id": 1, "isOnline": true, "latitude": "n/a", "longitude": 1.0},
                {"id": 2, "isOnline": true, "latitude": 0.0, "longitude": 0.0}
            ], "timestamp": 1710504000}"#,
        )
        .unwrap();

        let record = store_in(dir.path()).read_station_record().unwrap();
        assert_eq!(record.stations.len(), 2);
        assert!(record.fetched_at.is_some());
    }

    #[test]
    fn corrupt_files_read_as_empty() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("station.json"), "{not json").unwrap();
        std::fs::write(dir.path().join("measurement.json"), "[1, 2").unwrap();

        let store = store_in(dir.path());
        assert!(store.read_station_record().is_none());
        assert!(store.read_measurement_map().is_empty());
    }

    #[test]
    fn empty_files_read_as_empty() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("station.json"), "").unwrap();
        std::fs::write(dir.path().join("measurement.json"), "\n").unwrap();

        let store = store_in(dir.path());
        assert!(store.read_station_record().is_none());
        assert!(store.read_measurement_map().is_empty());
    }

    #[test]
    fn measurement_map_round_trip() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        let date = Utc.with_ymd_and_hms(2024, 3, 15, 11, 55, 0).unwrap();

        let mut map = MeasurementMap::new();
        map.insert(StationId(1), Measurement::at(date).with_reading("PM25", "7 mg/m3"));
        map.insert(StationId(2), Measurement::at(date));
        store.write_measurement_map(&map).unwrap();

        assert_eq!(store.read_measurement_map(), map);

        let raw = std::fs::read_to_string(dir.path().join("measurement.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["1"]["PM25"], "7 mg/m3");
    }

    #[test]
    fn creates_cache_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("nested").join("cache");
        let store = store_in(&nested);

        store.write_measurement_map(&MeasurementMap::new()).unwrap();
        assert!(nested.join("measurement.json").exists());
    }

    #[test]
    fn write_replaces_previous_contents() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        let date = Utc.with_ymd_and_hms(2024, 3, 15, 11, 55, 0).unwrap();

        let mut map = MeasurementMap::new();
        map.insert(StationId(1), Measurement::at(date));
        store.write_measurement_map(&map).unwrap();

        map.clear();
        map.insert(StationId(2), Measurement::at(date));
        store.write_measurement_map(&map).unwrap();

        let read = store.read_measurement_map();
        assert_eq!(read.len(), 1);
        assert!(read.contains_key(&StationId(2)));
    }
}
