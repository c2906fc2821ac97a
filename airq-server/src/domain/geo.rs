//! Geographic points and great-circle distance.

use std::fmt;

/// Mean Earth radius used by the haversine formula, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Error returned for a malformed point or an impossible distance.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid coordinate: {reason}")]
pub struct InvalidCoordinate {
    reason: String,
}

impl InvalidCoordinate {
    pub(crate) fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Human-readable reason for the rejection.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// A validated latitude/longitude pair in degrees.
///
/// Latitude is within [-90, 90] and longitude within [-180, 180]; both are
/// finite. Any `GeoPoint` value satisfies this by construction.
///
/// # Examples
///
/// ```
/// use airq_server::domain::GeoPoint;
///
/// let london = GeoPoint::new(51.5074, -0.1278).unwrap();
/// assert_eq!(london.latitude(), 51.5074);
///
/// assert!(GeoPoint::new(91.0, 0.0).is_err());
/// assert!(GeoPoint::new(0.0, f64::NAN).is_err());
/// ```
#[derive(Clone, Copy, PartialEq)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Build a point, rejecting non-finite or out-of-range values.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinate> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(InvalidCoordinate::new(format!(
                "({latitude}, {longitude}) is not a finite point"
            )));
        }

        if !(-90.0..=90.0).contains(&latitude) {
            return Err(InvalidCoordinate::new(format!(
                "latitude {latitude} outside [-90, 90]"
            )));
        }

        if !(-180.0..=180.0).contains(&longitude) {
            return Err(InvalidCoordinate::new(format!(
                "longitude {longitude} outside [-180, 180]"
            )));
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Debug for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GeoPoint({}, {})", self.latitude, self.longitude)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

/// Great-circle distance between two points in kilometres (haversine).
///
/// Identical points give exactly `0.0`. A negative or NaN result can only
/// come from corrupted input and is reported as [`InvalidCoordinate`].
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> Result<f64, InvalidCoordinate> {
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let hav = (dlat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos()
            * b.latitude.to_radians().cos()
            * (dlon / 2.0).sin().powi(2);

    let distance = 2.0 * EARTH_RADIUS_KM * hav.sqrt().asin();

    // NaN fails this comparison too
    if !(distance >= 0.0) {
        return Err(InvalidCoordinate::new(format!(
            "distance between {a} and {b} evaluated to {distance}"
        )));
    }

    Ok(distance)
}
