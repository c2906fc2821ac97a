//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::get,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, warn};

use crate::clock::Clock;
use crate::domain::Measurement;
use crate::lookup::{AirQualityProvider, LookupError, LookupOrchestrator};
use crate::store::CacheStore;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router<P, S, C>(state: AppState<LookupOrchestrator<P, S, C>>) -> Router
where
    P: AirQualityProvider + Send + Sync + 'static,
    S: CacheStore + Send + Sync + 'static,
    C: Clock + Send + Sync + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET]);

    Router::new()
        .route("/health", get(health))
        .route("/nearest", get(nearest_measurement::<P, S, C>))
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Latest measurement from the station nearest to the given point.
async fn nearest_measurement<P, S, C>(
    State(state): State<AppState<LookupOrchestrator<P, S, C>>>,
    Query(req): Query<NearestRequest>,
) -> Result<Json<Measurement>, AppError>
where
    P: AirQualityProvider + Send + Sync + 'static,
    S: CacheStore + Send + Sync + 'static,
    C: Clock + Send + Sync + 'static,
{
    req.validate()
        .map_err(|message| AppError::BadRequest { message })?;

    let measurement = state
        .lookup
        .resolve_nearest_measurement(req.latitude, req.longitude)
        .await?;

    Ok(Json(measurement))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Unavailable { message: String },
}

impl From<LookupError> for AppError {
    fn from(e: LookupError) -> Self {
        let message = e.to_string();
        match e {
            LookupError::InvalidCoordinate(_) => AppError::BadRequest { message },
            LookupError::AllStationsOffline(_) => AppError::NotFound { message },
            LookupError::Upstream(_) => AppError::Unavailable { message },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Unavailable { message } => (StatusCode::SERVICE_UNAVAILABLE, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
