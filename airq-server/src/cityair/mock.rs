//! Mock provider for testing without API access.
//!
//! Serves a fixed station list and fixed measurements, counting every call
//! so tests can assert how often the upstream would have been hit.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::error::UpstreamError;
use crate::domain::{Measurement, Station, StationId};
use crate::lookup::AirQualityProvider;

/// In-memory stand-in for the CityAir API.
#[derive(Debug, Default)]
pub struct MockProvider {
    stations: Vec<Station>,
    measurements: HashMap<StationId, Measurement>,
    /// Artificial latency applied to every call.
    delay: Option<Duration>,
    /// Every call fails with this status if set.
    fail_status: Option<u16>,
    station_calls: AtomicUsize,
    measurement_calls: AtomicUsize,
    /// `now` passed to the most recent measurement call.
    last_now: Mutex<Option<DateTime<Utc>>>,
}

impl MockProvider {
    pub fn new(stations: Vec<Station>) -> Self {
        Self {
            stations,
            ..Self::default()
        }
    }

    /// Serve `measurement` for station `id`.
    pub fn with_measurement(mut self, id: i64, measurement: Measurement) -> Self {
        self.measurements.insert(StationId(id), measurement);
        self
    }

    /// Delay every response by `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fail every call with the given HTTP status.
    pub fn failing(mut self, status: u16) -> Self {
        self.fail_status = Some(status);
        self
    }

    /// Number of `fetch_stations` calls so far.
    pub fn station_calls(&self) -> usize {
        self.station_calls.load(Ordering::SeqCst)
    }

    /// Number of `fetch_latest_measurement` calls so far.
    pub fn measurement_calls(&self) -> usize {
        self.measurement_calls.load(Ordering::SeqCst)
    }

    /// The time the last measurement was requested as of.
    pub fn last_measurement_now(&self) -> Option<DateTime<Utc>> {
        *self.last_now.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn respond(&self) -> Result<(), UpstreamError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.fail_status {
            Some(status) => Err(UpstreamError::Api {
                status,
                message: "mock failure".to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl AirQualityProvider for MockProvider {
    async fn fetch_stations(&self) -> Result<Vec<Station>, UpstreamError> {
        self.station_calls.fetch_add(1, Ordering::SeqCst);
        self.respond().await?;
        Ok(self.stations.clone())
    }

    async fn fetch_latest_measurement(
        &self,
        id: StationId,
        now: DateTime<Utc>,
    ) -> Result<Measurement, UpstreamError> {
        self.measurement_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_now.lock().unwrap_or_else(|e| e.into_inner()) = Some(now);
        self.respond().await?;
        self.measurements
            .get(&id)
            .cloned()
            .ok_or_else(|| UpstreamError::Api {
                status: 404,
                message: format!("No mock measurement for station {id}"),
            })
    }
}
