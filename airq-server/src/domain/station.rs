//! Monitoring station types.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::geo::{GeoPoint, InvalidCoordinate};

/// Provider-assigned station identifier.
///
/// Serializes as a bare integer, which also makes it usable as a JSON map
/// key (written as `"42"`).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(pub i64);

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({})", self.0)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One coordinate as the provider sent it.
///
/// Anything that is not a JSON number is kept verbatim in `Malformed` and
/// only rejected when a position is computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coordinate {
    Degrees(f64),
    Malformed(Value),
}

impl Coordinate {
    /// The value in degrees, or an error naming the malformed value.
    pub fn degrees(&self) -> Result<f64, InvalidCoordinate> {
        match self {
            Coordinate::Degrees(d) => Ok(*d),
            Coordinate::Malformed(v) => Err(InvalidCoordinate::new(format!("{v} is not a number"))),
        }
    }
}

impl From<f64> for Coordinate {
    fn from(degrees: f64) -> Self {
        Coordinate::Degrees(degrees)
    }
}

/// A fixed-location air-quality sensor ("post" in CityAir terms).
///
/// Coordinates are optional because the provider lists stations that have
/// not been placed yet. Every other provider field is kept verbatim in
/// `extra` so it survives a round trip through the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub id: StationId,

    #[serde(default)]
    pub latitude: Option<Coordinate>,

    #[serde(default)]
    pub longitude: Option<Coordinate>,

    #[serde(default)]
    pub is_online: bool,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Station {
    /// Create a station with no passthrough fields.
    pub fn new(id: i64, latitude: Option<f64>, longitude: Option<f64>, is_online: bool) -> Self {
        Self {
            id: StationId(id),
            latitude: latitude.map(Coordinate::from),
            longitude: longitude.map(Coordinate::from),
            is_online,
            extra: Map::new(),
        }
    }

    /// Online and with both coordinates present.
    pub fn is_usable(&self) -> bool {
        self.is_online && self.latitude.is_some() && self.longitude.is_some()
    }

    /// The station's position, if it has both coordinates.
    pub fn position(&self) -> Option<Result<GeoPoint, InvalidCoordinate>> {
        match (&self.latitude, &self.longitude) {
            (Some(lat), Some(lon)) => Some(
                lat.degrees()
                    .and_then(|lat| lon.degrees().and_then(|lon| GeoPoint::new(lat, lon))),
            ),
            _ => None,
        }
    }
}
