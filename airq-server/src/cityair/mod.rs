//! CityAir API client.
//!
//! CityAir (cityscreen.io) publishes its monitoring stations as "posts".
//! The harvester API exposes the post list and five-minute averaged
//! measurements per post, both behind a bearer token.

mod client;
mod error;
mod mock;
mod types;

pub use client::{CityAirClient, CityAirConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
pub use error::UpstreamError;
pub use mock::MockProvider;
pub use types::{
    MeasurementsMeta, MeasurementsResponse, PostDto, convert_measurements, convert_post,
    measurement_window_start, parse_provider_date,
};
