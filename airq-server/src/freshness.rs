//! Cache freshness policy.
//!
//! Station lists and measurements have separate windows and different
//! boundary rules: a station list exactly one window old is still fresh,
//! a measurement exactly one window old is stale. All checks take `now`
//! explicitly; nothing here reads the wall clock.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::domain::Measurement;

/// Default station list window: 10 minutes.
pub const DEFAULT_STATION_WINDOW: Duration = Duration::from_secs(10 * 60);

/// Default measurement window: 5 minutes.
pub const DEFAULT_MEASUREMENT_WINDOW: Duration = Duration::from_secs(5 * 60);

/// Outcome of checking a cache entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Freshness<T> {
    /// Present and within its window.
    Fresh(T),
    /// Present but too old, or missing its timestamp.
    Stale,
    /// Nothing cached.
    Absent,
}

impl<T> Freshness<T> {
    /// The cached value, if it may be reused.
    pub fn into_fresh(self) -> Option<T> {
        match self {
            Freshness::Fresh(value) => Some(value),
            Freshness::Stale | Freshness::Absent => None,
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, Freshness::Fresh(_))
    }
}

/// Freshness windows for both caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessPolicy {
    /// Maximum age of the station list (inclusive).
    pub station_window: Duration,

    /// Maximum age of a measurement (exclusive).
    pub measurement_window: Duration,
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self {
            station_window: DEFAULT_STATION_WINDOW,
            measurement_window: DEFAULT_MEASUREMENT_WINDOW,
        }
    }
}

impl FreshnessPolicy {
    pub fn new(station_window: Duration, measurement_window: Duration) -> Self {
        Self {
            station_window,
            measurement_window,
        }
    }

    /// Whether a station list recorded at `recorded_at` may be reused.
    pub fn station_cache_fresh(&self, recorded_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        let Some(recorded_at) = recorded_at else {
            return false;
        };
        age_secs(recorded_at, now) <= window_secs(self.station_window)
    }

    /// Whether a cached measurement may be reused.
    pub fn measurement_cache_fresh(&self, measurement: &Measurement, now: DateTime<Utc>) -> bool {
        age_secs(measurement.date, now) < window_secs(self.measurement_window)
    }

    /// Classify a cached station list given its timestamp.
    pub fn classify_stations<T>(
        &self,
        cached: Option<(T, Option<DateTime<Utc>>)>,
        now: DateTime<Utc>,
    ) -> Freshness<T> {
        match cached {
            None => Freshness::Absent,
            Some((value, recorded_at)) if self.station_cache_fresh(recorded_at, now) => {
                Freshness::Fresh(value)
            }
            Some(_) => Freshness::Stale,
        }
    }

    /// Classify a cached measurement entry.
    pub fn classify_measurement(
        &self,
        cached: Option<Measurement>,
        now: DateTime<Utc>,
    ) -> Freshness<Measurement> {
        match cached {
            None => Freshness::Absent,
            Some(m) if self.measurement_cache_fresh(&m, now) => Freshness::Fresh(m),
            Some(_) => Freshness::Stale,
        }
    }
}

/// Whole seconds elapsed from `then` to `now`; negative if `then` is ahead.
fn age_secs(then: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - then).num_seconds()
}

fn window_secs(window: Duration) -> i64 {
    i64::try_from(window.as_secs()).unwrap_or(i64::MAX)
}
