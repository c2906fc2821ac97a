//! CityAir wire types and conversion to domain types.
//!
//! The API nests coordinates under `geo` and wraps the AQI in an object;
//! both are flattened here so the rest of the crate sees plain fields.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::error::UpstreamError;
use crate::domain::{Measurement, Station};

/// Length of one averaging interval, in seconds.
const INTERVAL_SECS: i64 = 5 * 60;

/// One entry from `GET /harvester/v2/Posts`.
#[derive(Debug, Deserialize)]
pub struct PostDto {
    #[serde(default)]
    pub geo: Option<Map<String, Value>>,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Response of `GET /harvester/v2/Posts/measurements`.
#[derive(Debug, Deserialize)]
pub struct MeasurementsResponse {
    #[serde(default)]
    pub meta: MeasurementsMeta,
    pub data: Vec<Map<String, Value>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MeasurementsMeta {
    /// Field name -> unit label (e.g. `"PM25": "mg/m3"`).
    #[serde(default)]
    pub units: Map<String, Value>,
}

/// Convert a post into a station, lifting the `geo` fields to the top level.
pub fn convert_post(post: PostDto) -> Result<Station, UpstreamError> {
    let PostDto { geo, mut fields } = post;

    if let Some(geo) = geo {
        fields.extend(geo);
    }

    serde_json::from_value(Value::Object(fields))
        .map_err(|e| UpstreamError::payload(format!("invalid post: {e}")))
}

/// Convert a list of posts, failing on the first malformed entry.
pub fn convert_posts(posts: Vec<PostDto>) -> Result<Vec<Station>, UpstreamError> {
    posts.into_iter().map(convert_post).collect()
}

/// Take the most recent interval from a measurements response.
///
/// The `aqi` object is replaced by its `cityairAqi.value`, and every field
/// that has a unit in `meta.units` is rendered as `"<value> <unit>"`.
pub fn convert_measurements(response: MeasurementsResponse) -> Result<Measurement, UpstreamError> {
    let MeasurementsResponse { meta, mut data } = response;

    let mut latest = data
        .pop()
        .ok_or_else(|| UpstreamError::payload("no measurements in response"))?;

    let date = match latest.remove("date") {
        Some(Value::String(s)) => parse_provider_date(&s)?,
        Some(other) => return Err(UpstreamError::payload(format!("bad date: {other}"))),
        None => return Err(UpstreamError::payload("measurement has no date")),
    };

    let cityair_aqi = latest
        .remove("aqi")
        .and_then(|aqi| aqi.pointer("/cityairAqi/value").and_then(Value::as_f64));

    let readings = latest
        .into_iter()
        .map(|(field, value)| {
            let value = match meta.units.get(&field).and_then(Value::as_str) {
                Some(unit) => with_unit(value, unit),
                None => value,
            };
            (field, value)
        })
        .collect();

    Ok(Measurement {
        date,
        cityair_aqi,
        readings,
    })
}

fn with_unit(value: Value, unit: &str) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::String(s) => Value::String(format!("{s} {unit}")),
        other => Value::String(format!("{other} {unit}")),
    }
}

/// Parse a timestamp as CityAir sends it.
///
/// Accepts RFC 3339 (`2024-03-15T10:05:00Z`) and offset-less ISO 8601,
/// which is taken to be UTC.
pub fn parse_provider_date(s: &str) -> Result<DateTime<Utc>, UpstreamError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| UpstreamError::payload(format!("bad date {s:?}: {e}")))
}

/// Lower bound for the measurements query: the start of the previous
/// complete interval before `now`.
pub fn measurement_window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let secs = now.timestamp();
    let floored = secs - secs.rem_euclid(INTERVAL_SECS);
    DateTime::from_timestamp(floored - INTERVAL_SECS, 0).unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coordinate, StationId};
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn post_geo_is_flattened() {
        let post: PostDto = serde_json::from_value(json!({
            "id": 42,
            "name": "Lenina 1",
            "isOnline": true,
            "geo": { "latitude": 55.5, "longitude": 37.25, "gmtOffsetSeconds": 10800 }
        }))
        .unwrap();

        let station = convert_post(post).unwrap();
        assert_eq!(station.id, StationId(42));
        assert!(station.is_online);
        assert_eq!(station.latitude, Some(Coordinate::Degrees(55.5)));
        assert_eq!(station.longitude, Some(Coordinate::Degrees(37.25)));
        assert_eq!(station.extra["gmtOffsetSeconds"], 10800);
        assert_eq!(station.extra["name"], "Lenina 1");
        assert!(!station.extra.contains_key("geo"));
    }

    #[test]
    fn post_without_geo() {
        let post: PostDto = serde_json::from_value(json!({ "id": 1, "isOnline": false })).unwrap();
        let station = convert_post(post).unwrap();
        assert!(station.latitude.is_none());
        assert!(!station.is_online);
    }

    #[test]
    fn malformed_coordinate_does_not_fail_the_list() {
        let posts: Vec<PostDto> = serde_json::from_value(json!([
            { "id": 1, "isOnline": true, "geo": { "latitude": "n/a", "longitude": 1.0 } },
            { "id": 2, "isOnline": true, "geo": { "latitude": 0.0, "longitude": 0.0 } }
        ]))
        .unwrap();

        let stations = convert_posts(posts).unwrap();
        assert_eq!(stations.len(), 2);
        assert!(stations[0].position().unwrap().is_err());
        assert!(stations[1].position().unwrap().is_ok());
    }

    #[test]
    fn post_without_id_is_rejected() {
        let post: PostDto = serde_json::from_value(json!({ "isOnline": true })).unwrap();
        assert!(matches!(
            convert_post(post),
            Err(UpstreamError::Payload { .. })
        ));
    }

    fn sample_response() -> MeasurementsResponse {
        serde_json::from_value(json!({
            "meta": { "units": { "PM25": "mg/m3", "T": "C" } },
            "data": [
                {
                    "date": "2024-03-15T09:55:00Z",
                    "PM25": 0.011,
                    "aqi": { "cityairAqi": { "value": 1 } }
                },
                {
                    "date": "2024-03-15T10:00:00Z",
                    "PM25": 0.012,
                    "T": -3,
                    "H": 81,
                    "aqi": { "cityairAqi": { "value": 2, "details": {} } }
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn latest_measurement_is_used() {
        let m = convert_measurements(sample_response()).unwrap();

        assert_eq!(m.date, Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap());
        assert_eq!(m.cityair_aqi, Some(2.0));
        assert_eq!(m.readings["PM25"], "0.012 mg/m3");
        assert_eq!(m.readings["T"], "-3 C");
        assert_eq!(m.readings["H"], 81);
        assert!(!m.readings.contains_key("aqi"));
        assert!(!m.readings.contains_key("date"));
    }

    #[test]
    fn empty_data_is_rejected() {
        let response: MeasurementsResponse =
            serde_json::from_value(json!({ "meta": { "units": {} }, "data": [] })).unwrap();
        assert!(matches!(
            convert_measurements(response),
            Err(UpstreamError::Payload { .. })
        ));
    }

    #[test]
    fn missing_date_is_rejected() {
        let response: MeasurementsResponse =
            serde_json::from_value(json!({ "data": [{ "PM25": 1 }] })).unwrap();
        assert!(matches!(
            convert_measurements(response),
            Err(UpstreamError::Payload { .. })
        ));
    }

    #[test]
    fn missing_aqi_is_none() {
        let response: MeasurementsResponse =
            serde_json::from_value(json!({ "data": [{ "date": "2024-03-15T10:00:00Z" }] }))
                .unwrap();
        let m = convert_measurements(response).unwrap();
        assert!(m.cityair_aqi.is_none());
    }

    #[test]
    fn date_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
        assert_eq!(parse_provider_date("2024-03-15T10:00:00Z").unwrap(), expected);
        assert_eq!(parse_provider_date("2024-03-15T13:00:00+03:00").unwrap(), expected);
        assert_eq!(parse_provider_date("2024-03-15T10:00:00").unwrap(), expected);
        assert_eq!(parse_provider_date("2024-03-15T10:00:00.000").unwrap(), expected);
        assert!(parse_provider_date("yesterday").is_err());
    }

    #[test]
    fn window_start_is_previous_interval() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 10, 7, 42).unwrap();
        assert_eq!(
            measurement_window_start(now),
            Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap()
        );

        let on_boundary = Utc.with_ymd_and_hms(2024, 3, 15, 10, 5, 0).unwrap();
        assert_eq!(
            measurement_window_start(on_boundary),
            Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap()
        );
    }
}
