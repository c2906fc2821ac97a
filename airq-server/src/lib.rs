//! Air-quality lookup server.
//!
//! Answers "what is the air like here?" by finding the nearest online
//! CityAir monitoring station to a coordinate and returning its latest
//! measurement, caching both the station list and the measurements so the
//! upstream API is only called when the cached data has gone stale.

pub mod cityair;
pub mod clock;
pub mod config;
pub mod domain;
pub mod freshness;
pub mod lookup;
pub mod nearest;
pub mod store;
pub mod web;
