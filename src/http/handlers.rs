//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for business logic.

use axum::{
    extract::{Query, State},
    Json,
};

use super::dto::{
    CompareQuery, CompareResponse, FlightSearchQuery, FlightSearchResponse, HealthResponse,
    OptionsKind, OptionsQuery, OptionsResponse,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::{DedupMode, ItinerarySearch, Preference, SortKey, TimeWindow};
use crate::models::AirportSelector;
use crate::services;
use crate::services::compare::CompareRequest;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// GET /health
///
/// Health check endpoint to verify the service is running and the
/// repository is reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

/// GET /v1/airports/options
///
/// Grouped dropdown options for the origin selector, or flat
/// single-airport options for the destination selector.
pub async fn airport_options(
    State(state): State<AppState>,
    Query(query): Query<OptionsQuery>,
) -> HandlerResult<OptionsResponse> {
    let options = match query.kind {
        OptionsKind::Origin => services::airport_options(state.repository.as_ref()).await?,
        OptionsKind::Destination => {
            services::destination_options(state.repository.as_ref()).await?
        }
    };

    let total = options.len();
    Ok(Json(OptionsResponse { options, total }))
}

/// GET /v1/flights/search
///
/// Itinerary search for one departure day. A selector matching no airports
/// yields an empty result, not an error.
pub async fn search_flights(
    State(state): State<AppState>,
    Query(query): Query<FlightSearchQuery>,
) -> HandlerResult<FlightSearchResponse> {
    let origin_selector = parse_selector(&query.from)?;
    let destination_selector = parse_selector(&query.to)?;

    let mode = match query.mode.as_deref() {
        None | Some("best_per_route") | Some("best") => DedupMode::BestPerRoute,
        Some("all") => DedupMode::All,
        Some(other) => {
            return Err(AppError::BadRequest(format!("Unknown dedup mode: {}", other)));
        }
    };
    let sort = match query.sort.as_deref() {
        None => SortKey::default(),
        Some(raw) => raw.parse::<SortKey>().map_err(AppError::BadRequest)?,
    };

    let repository = state.repository.as_ref();
    let origins = repository.resolve_airport_idents(&origin_selector).await?;
    let destinations = repository
        .resolve_airport_idents(&destination_selector)
        .await?;
    if origins.is_empty() || destinations.is_empty() {
        return Ok(Json(FlightSearchResponse {
            itineraries: Vec::new(),
            total: 0,
        }));
    }

    let window = TimeWindow::from_dates(query.date, query.date)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid search date: {}", query.date)))?;
    let search = ItinerarySearch {
        origins,
        destinations,
        window,
        max_layover_hours: query.max_layover_hours,
        max_stops: query.max_stops,
        mode,
    };

    let itineraries = services::build_itineraries(repository, &search, sort).await?;
    let total = itineraries.len();
    Ok(Json(FlightSearchResponse { itineraries, total }))
}

/// GET /v1/airports/compare
///
/// Ranked airport tables for the selected period and the period shifted
/// back by `period_days`.
pub async fn compare_airports(
    State(state): State<AppState>,
    Query(query): Query<CompareQuery>,
) -> HandlerResult<CompareResponse> {
    let window = TimeWindow::from_dates(query.start_date, query.end_date).ok_or_else(|| {
        AppError::BadRequest("end_date must not precede start_date".to_string())
    })?;

    let preference = match query.preference.as_deref() {
        None => Preference::default(),
        Some(raw) => raw.parse::<Preference>().map_err(AppError::BadRequest)?,
    };

    let request = CompareRequest {
        origin: parse_selector(&query.from)?,
        destination: parse_selector(&query.to)?,
        window,
        max_layover_hours: query.max_layover_hours,
        max_stops: query.max_stops,
        max_flight_duration_hours: query.max_flight_duration_hours,
        period_days: query.period_days,
        preference,
    };

    let data = services::compare_airports(state.repository.as_ref(), &request).await?;
    Ok(Json(CompareResponse {
        preference: data.preference.to_string(),
        current: data.current,
        previous: data.previous,
    }))
}

fn parse_selector(raw: &str) -> Result<AirportSelector, AppError> {
    raw.parse::<AirportSelector>().map_err(AppError::BadRequest)
}
