//! HTTP API for the flight-search and airport-ranking dashboard.
//!
//! Endpoints:
//! - `GET /health`: service and repository health
//! - `GET /v1/airports/options`: grouped dropdown options
//! - `GET /v1/flights/search`: itinerary search
//! - `GET /v1/airports/compare`: two-period airport ranking

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::{ApiError, AppError};
pub use router::create_router;
pub use state::AppState;
