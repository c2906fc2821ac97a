//! CityAir HTTP client.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::error::UpstreamError;
use super::types::{
    MeasurementsResponse, PostDto, convert_measurements, convert_posts, measurement_window_start,
};
use crate::domain::{Measurement, Station, StationId};
use crate::lookup::AirQualityProvider;

/// Default base URL for the CityAir API.
pub const DEFAULT_BASE_URL: &str = "https://api.cityscreen.io";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const POSTS_PATH: &str = "harvester/v2/Posts";
const MEASUREMENTS_PATH: &str = "harvester/v2/Posts/measurements";

/// Configuration for the CityAir client.
#[derive(Debug, Clone)]
pub struct CityAirConfig {
    /// Bearer token for the API
    pub token: String,
    /// Base URL for the API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl CityAirConfig {
    /// Create a new config with the given token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Client for the CityAir harvester API.
#[derive(Debug, Clone)]
pub struct CityAirClient {
    http: reqwest::Client,
    base_url: String,
}

impl CityAirClient {
    /// Create a new CityAir client.
    pub fn new(config: CityAirConfig) -> Result<Self, UpstreamError> {
        let mut headers = HeaderMap::new();

        let auth = HeaderValue::from_str(&format!("Bearer {}", config.token)).map_err(|_| {
            UpstreamError::Api {
                status: 0,
                message: "Invalid token format".to_string(),
            }
        })?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch every station visible to the token.
    pub async fn fetch_posts(&self) -> Result<Vec<Station>, UpstreamError> {
        let posts: Vec<PostDto> = self.get_json(POSTS_PATH, &[]).await?;
        debug!(count = posts.len(), "fetched posts");
        convert_posts(posts)
    }

    /// Fetch the latest five-minute average for one station.
    pub async fn fetch_measurement(
        &self,
        id: StationId,
        now: DateTime<Utc>,
    ) -> Result<Measurement, UpstreamError> {
        let since = measurement_window_start(now);

        let response: MeasurementsResponse = self
            .get_json(
                MEASUREMENTS_PATH,
                &[
                    ("ids", id.to_string()),
                    ("interval", "5m".to_string()),
                    ("date__gt", since.format("%Y-%m-%dT%H:%M:%S").to_string()),
                    ("limit", "2".to_string()),
                    ("measure_scheme", "c_mmhg_mg".to_string()),
                ],
            )
            .await?;

        convert_measurements(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, UpstreamError> {
        let url = format!("{}/{}", self.base_url, path);

        let response = self.http.get(&url).query(query).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(UpstreamError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        let value: Value = serde_json::from_str(&body).map_err(|e| UpstreamError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })?;

        if is_empty_payload(&value) {
            return Err(UpstreamError::Empty);
        }

        serde_json::from_value(value).map_err(|e| UpstreamError::payload(e.to_string()))
    }
}

fn is_empty_payload(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        _ => false,
    }
}

impl AirQualityProvider for CityAirClient {
    async fn fetch_stations(&self) -> Result<Vec<Station>, UpstreamError> {
        self.fetch_posts().await
    }

    async fn fetch_latest_measurement(
        &self,
        id: StationId,
        now: DateTime<Utc>,
    ) -> Result<Measurement, UpstreamError> {
        self.fetch_measurement(id, now).await
    }
}
