//! Domain types for the air-quality lookup.
//!
//! Points are validated at construction, so code that receives a
//! `GeoPoint` can trust its range. Stations and measurements mirror the
//! provider's data and are never mutated once built.

mod error;
mod geo;
mod measurement;
mod station;

pub use error::AllStationsOffline;
pub use geo::{EARTH_RADIUS_KM, GeoPoint, InvalidCoordinate, distance_km};
pub use measurement::{Measurement, MeasurementMap};
pub use station::{Coordinate, Station, StationId};
