//! Nearest-station resolution.

use tracing::debug;

use crate::domain::{AllStationsOffline, GeoPoint, Station, distance_km};

/// Larger than any distance between two points on Earth.
const DISTANCE_SENTINEL_KM: f64 = 100_000.0;

/// The station closest to a reference point.
#[derive(Debug, Clone, PartialEq)]
pub struct NearestStation<'a> {
    pub station: &'a Station,
    pub distance_km: f64,
}

/// Find the closest online station with valid coordinates.
///
/// Offline stations and stations missing a coordinate are ignored, as are
/// stations whose coordinates are out of range. Ties go to the station that
/// appears first in `stations`.
pub fn nearest(
    stations: &[Station],
    reference: GeoPoint,
) -> Result<NearestStation<'_>, AllStationsOffline> {
    let candidates: Vec<&Station> = stations.iter().filter(|s| s.is_usable()).collect();

    if candidates.is_empty() {
        return Err(AllStationsOffline);
    }

    let mut best: Option<NearestStation<'_>> = None;
    let mut min_distance = DISTANCE_SENTINEL_KM;

    for station in candidates {
        let distance = match station.position() {
            Some(Ok(position)) => distance_km(reference, position),
            Some(Err(e)) => Err(e),
            None => continue,
        };

        let distance = match distance {
            Ok(d) => d,
            Err(e) => {
                debug!(station = %station.id, error = %e, "skipping station");
                continue;
            }
        };

        if distance < min_distance {
            min_distance = distance;
            best = Some(NearestStation {
                station,
                distance_km: distance,
            });
        }
    }

    best.ok_or(AllStationsOffline)
}
