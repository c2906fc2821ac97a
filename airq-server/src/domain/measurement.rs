//! Station measurements.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::station::StationId;

/// Latest averaged readings for one station.
///
/// Only `date` matters to the lookup logic; the readings are passed
/// through to the caller as the provider produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    /// When the measurement interval was recorded (UTC).
    pub date: DateTime<Utc>,

    /// CityAir air quality index, if the provider reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cityair_aqi: Option<f64>,

    /// Pollutant readings and any other provider fields.
    #[serde(flatten)]
    pub readings: BTreeMap<String, Value>,
}

impl Measurement {
    /// A measurement with no readings, for tests and fixtures.
    pub fn at(date: DateTime<Utc>) -> Self {
        Self {
            date,
            cityair_aqi: None,
            readings: BTreeMap::new(),
        }
    }

    /// Builder-style helper to attach a reading.
    pub fn with_reading(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.readings.insert(field.into(), value.into());
        self
    }
}

/// Cached measurements keyed by station.
pub type MeasurementMap = BTreeMap<StationId, Measurement>;
