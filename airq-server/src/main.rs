use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use airq_server::cityair::CityAirClient;
use airq_server::clock::SystemClock;
use airq_server::config::AppConfig;
use airq_server::lookup::LookupOrchestrator;
use airq_server::store::FileCacheStore;
use airq_server::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    // Create CityAir client
    let client = CityAirClient::new(config.cityair()).expect("Failed to create CityAir client");

    // File-backed caches shared by all requests
    let store = FileCacheStore::new(config.cache());
    info!(dir = %store.dir().display(), "using cache directory");

    let lookup = LookupOrchestrator::new(client, store, SystemClock, config.lookup());
    let app = create_router(AppState::new(lookup));

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .expect("Failed to bind listen address");
    info!("Air quality server listening on http://{}", config.bind);
    info!("  GET  /health                           - Health check");
    info!("  GET  /nearest?latitude=..&longitude=.. - Nearest station measurement");

    axum::serve(listener, app).await.expect("Server error");
}
