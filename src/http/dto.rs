//! Request and response DTOs for the HTTP API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::{AirportOption, Itinerary, WeightedKpiRow};

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}

/// Which dropdown the options are for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionsKind {
    #[default]
    Origin,
    Destination,
}

/// Query parameters for `GET /v1/airports/options`.
#[derive(Debug, Default, Deserialize)]
pub struct OptionsQuery {
    #[serde(default)]
    pub kind: OptionsKind,
}

/// Response for `GET /v1/airports/options`.
#[derive(Debug, Serialize, Deserialize)]
pub struct OptionsResponse {
    pub options: Vec<AirportOption>,
    pub total: usize,
}

/// Query parameters for `GET /v1/flights/search`.
///
/// `from` and `to` are selector keys (`air#ZRH`, `cou#CH`, ...); the search
/// covers the single calendar day in `date`.
#[derive(Debug, Deserialize)]
pub struct FlightSearchQuery {
    pub from: String,
    pub to: String,
    pub date: NaiveDate,
    #[serde(default = "default_max_layover_hours")]
    pub max_layover_hours: f64,
    #[serde(default = "default_max_stops")]
    pub max_stops: u8,
    /// "best_per_route" (default) or "all"
    #[serde(default)]
    pub mode: Option<String>,
    /// "fastest" (default), "departure", "arrival" or "stops"
    #[serde(default)]
    pub sort: Option<String>,
}

/// Response for `GET /v1/flights/search`.
#[derive(Debug, Serialize, Deserialize)]
pub struct FlightSearchResponse {
    pub itineraries: Vec<Itinerary>,
    pub total: usize,
}

/// Query parameters for `GET /v1/airports/compare`.
#[derive(Debug, Deserialize)]
pub struct CompareQuery {
    pub from: String,
    pub to: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default = "default_max_layover_hours")]
    pub max_layover_hours: f64,
    #[serde(default = "default_max_stops")]
    pub max_stops: u8,
    #[serde(default = "default_max_flight_duration_hours")]
    pub max_flight_duration_hours: f64,
    #[serde(default = "default_period_days")]
    pub period_days: i64,
    /// "NA" (default) or "kpi1" .. "kpi8"
    #[serde(default)]
    pub preference: Option<String>,
}

/// Response for `GET /v1/airports/compare`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CompareResponse {
    pub preference: String,
    pub current: Vec<WeightedKpiRow>,
    pub previous: Vec<WeightedKpiRow>,
}

fn default_max_layover_hours() -> f64 {
    4.0
}

fn default_max_stops() -> u8 {
    2
}

fn default_max_flight_duration_hours() -> f64 {
    48.0
}

fn default_period_days() -> i64 {
    7
}
