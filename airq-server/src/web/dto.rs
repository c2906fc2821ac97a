//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

/// Query for the nearest-station lookup.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct NearestRequest {
    /// Latitude in degrees, -90 to 90
    pub latitude: f64,

    /// Longitude in degrees, -180 to 180
    pub longitude: f64,
}

impl NearestRequest {
    /// Check the coordinate bounds, returning a message for the client.
    pub fn validate(&self) -> Result<(), String> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(format!("latitude must be between -90 and 90, got {}", self.latitude));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(format!(
                "longitude must be between -180 and 180, got {}",
                self.longitude
            ));
        }
        Ok(())
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
