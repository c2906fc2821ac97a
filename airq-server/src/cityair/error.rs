//! CityAir client error types.

use std::time::Duration;

/// Errors from fetching data from the CityAir API.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// HTTP request failed (network error, client-side timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Token rejected
    #[error("unauthorized: check TOKEN")]
    Unauthorized,

    /// API returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body was not valid JSON
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Response was JSON but not the expected shape
    #[error("unexpected payload: {message}")]
    Payload { message: String },

    /// Response carried no data
    #[error("empty response from provider")]
    Empty,

    /// Provider did not answer in time
    #[error("provider did not answer within {0:?}")]
    Timeout(Duration),
}

impl UpstreamError {
    pub(crate) fn payload(message: impl Into<String>) -> Self {
        UpstreamError::Payload {
            message: message.into(),
        }
    }
}
