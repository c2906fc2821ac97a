//! Web layer for the air-quality lookup.
//!
//! Exposes the nearest-station measurement over HTTP.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::{AppState, Lookup};
