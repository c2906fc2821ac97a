//! Nearest-station measurement lookup.
//!
//! Answers "what is the air like here?" for a coordinate: find the closest
//! online station, then return its latest measurement. Both the station
//! list and each station's measurement are cached with their own freshness
//! windows, and the provider is only called when a cache is stale.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::cityair::UpstreamError;
use crate::clock::Clock;
use crate::domain::{
    AllStationsOffline, GeoPoint, InvalidCoordinate, Measurement, Station, StationId,
};
use crate::freshness::{Freshness, FreshnessPolicy};
use crate::nearest::nearest;
use crate::store::{CacheStore, StationCacheRecord};


/// Default bound on a single provider call.
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors surfaced to the caller of a lookup.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// The reference point is not a valid coordinate
    #[error(transparent)]
    InvalidCoordinate(#[from] InvalidCoordinate),

    /// No station can serve the request
    #[error(transparent)]
    AllStationsOffline(#[from] AllStationsOffline),

    /// The provider could not be reached or answered badly
    #[error("upstream fetch failed: {0}")]
    Upstream(#[from] UpstreamError),
}

/// Source of station and measurement data.
///
/// This abstraction allows the lookup to be tested with mock data.
pub trait AirQualityProvider {
    /// Fetch the full station list.
    fn fetch_stations(&self) -> impl Future<Output = Result<Vec<Station>, UpstreamError>> + Send;

    /// Fetch the most recent measurement for one station, as of `now`.
    fn fetch_latest_measurement(
        &self,
        id: StationId,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Measurement, UpstreamError>> + Send;
}

/// Configuration for the lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupConfig {
    pub freshness: FreshnessPolicy,

    /// Maximum time to wait for any one provider call.
    pub upstream_timeout: Duration,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            freshness: FreshnessPolicy::default(),
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
        }
    }
}

/// Resolves coordinates to the nearest station's latest measurement.
pub struct LookupOrchestrator<P, S, C> {
    provider: P,
    store: S,
    clock: C,
    config: LookupConfig,
}

impl<P, S, C> LookupOrchestrator<P, S, C>
where
    P: AirQualityProvider,
    S: CacheStore,
    C: Clock,
{
    pub fn new(provider: P, store: S, clock: C, config: LookupConfig) -> Self {
        Self {
            provider,
            store,
            clock,
            config,
        }
    }

    /// Latest measurement from the online station closest to the point.
    ///
    /// Bounds are expected to have been checked by the caller, but the point
    /// is validated again here.
    pub async fn resolve_nearest_measurement(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Measurement, LookupError> {
        let reference = GeoPoint::new(latitude, longitude)?;
        let now = self.clock.now();

        let stations = self.stations(now).await?;

        let found = nearest(&stations, reference)?;
        let station_id = found.station.id;
        debug!(
            station = %station_id,
            distance_km = found.distance_km,
            reference = %reference,
            "resolved nearest station"
        );

        self.measurement(station_id, now).await
    }

    /// Cached station list if fresh, otherwise a freshly fetched one.
    async fn stations(&self, now: DateTime<Utc>) -> Result<Vec<Station>, LookupError> {
        let cached = self
            .store
            .read_station_record()
            .map(|record| (record.stations, record.fetched_at));

        match self.config.freshness.classify_stations(cached, now) {
            Freshness::Fresh(stations) => {
                debug!(count = stations.len(), "station cache fresh");
                return Ok(stations);
            }
            Freshness::Stale => info!("station cache stale, refreshing"),
            Freshness::Absent => info!("no station cache, fetching"),
        }

        let stations = self.bounded(self.provider.fetch_stations()).await?;

        let record = StationCacheRecord::new(stations, now);
        if let Err(e) = self.store.write_station_record(&record) {
            warn!(error = %e, "failed to write station cache");
        }

        Ok(record.stations)
    }

    /// Cached measurement for `id` if fresh, otherwise a freshly fetched one.
    async fn measurement(
        &self,
        id: StationId,
        now: DateTime<Utc>,
    ) -> Result<Measurement, LookupError> {
        let cached = self.store.read_measurement_map().remove(&id);

        match self.config.freshness.classify_measurement(cached, now) {
            Freshness::Fresh(measurement) => {
                debug!(station = %id, "measurement cache fresh");
                return Ok(measurement);
            }
            Freshness::Stale => info!(station = %id, "measurement cache stale, refreshing"),
            Freshness::Absent => info!(station = %id, "no cached measurement, fetching"),
        }

        let measurement = self
            .bounded(self.provider.fetch_latest_measurement(id, now))
            .await?;

        // Re-read so entries written by concurrent requests since the first
        // read are kept.
        let mut map = self.store.read_measurement_map();
        map.insert(id, measurement.clone());
        if let Err(e) = self.store.write_measurement_map(&map) {
            warn!(station = %id, error = %e, "failed to write measurement cache");
        }

        Ok(measurement)
    }

    async fn bounded<T>(
        &self,
        fetch: impl Future<Output = Result<T, UpstreamError>>,
    ) -> Result<T, UpstreamError> {
        let limit = self.config.upstream_timeout;
        tokio::time::timeout(limit, fetch)
            .await
            .map_err(|_| UpstreamError::Timeout(limit))?
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &LookupConfig {
        &self.config
    }
}
