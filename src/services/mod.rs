//! Service layer: the analytics pipeline between the repository and the
//! HTTP handlers.
//!
//! Each service function takes an explicit repository handle and returns a
//! [`ServiceResult`]. The pipeline stages are:
//!
//! - [`itinerary`]: turn raw segment chains into display-ready itineraries
//! - [`kpi`]: aggregate itineraries and traffic counts into per-airport
//!   indicator rows
//! - [`weighting`]: normalize indicators and fold them into a composite
//!   rating
//! - [`compare`]: run the full pipeline for two adjacent periods
//! - [`airports`]: dropdown options for the search forms

pub mod airports;
pub mod compare;
pub mod itinerary;
pub mod kpi;
pub mod weighting;

use crate::db::repository::RepositoryError;

pub use airports::{airport_options, destination_options};
pub use compare::{compare_airports, CompareRequest};
pub use itinerary::{build_itineraries, filter_by_max_duration};
pub use kpi::aggregate_kpis;
pub use weighting::compute_weighted;

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors surfaced by the service layer.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Caller passed parameters that fail validation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The underlying repository failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The window produced too few rows for a meaningful result.
    #[error("Not enough data: {0}")]
    NotEnoughData(String),
}
