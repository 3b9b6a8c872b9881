//! Two-period airport comparison.
//!
//! Runs the full pipeline (itineraries -> KPI rows -> weighted ranking)
//! for the selected window and again for the window shifted back by the
//! comparison period, then aligns the two result sets so every airport
//! appears in both with zeros filling the side it is missing from.

use std::collections::{BTreeSet, HashMap};

use crate::api::{
    CompareData, DedupMode, ItinerarySearch, Preference, SortKey, TimeWindow, WeightedKpiRow,
};
use crate::db::repository::FullRepository;
use crate::models::AirportSelector;
use crate::services::itinerary::{build_itineraries, filter_by_max_duration};
use crate::services::kpi::aggregate_kpis;
use crate::services::weighting::compute_weighted;
use crate::services::{ServiceError, ServiceResult};

/// Parameters for one comparison run.
#[derive(Debug, Clone)]
pub struct CompareRequest {
    pub origin: AirportSelector,
    pub destination: AirportSelector,
    pub window: TimeWindow,
    /// Layover ceiling in hours, passed through to the itinerary builder
    pub max_layover_hours: f64,
    /// Maximum number of connections: 0, 1 or 2
    pub max_stops: u8,
    /// Total itinerary duration ceiling in hours
    pub max_flight_duration_hours: f64,
    /// How far back the comparison period sits, in days
    pub period_days: i64,
    pub preference: Preference,
}

impl CompareRequest {
    fn validate(&self) -> Result<(), String> {
        if self.max_flight_duration_hours <= 0.0 {
            return Err("Flight duration ceiling must be positive".to_string());
        }
        if self.period_days <= 0 {
            return Err("Comparison period must be positive".to_string());
        }
        Ok(())
    }
}

/// Build the ranked airport tables for the selected and previous period.
///
/// The current period must produce at least two ranked airports; a thin
/// previous period degrades to all-zero rows instead of failing the whole
/// comparison.
pub async fn compare_airports(
    repository: &dyn FullRepository,
    request: &CompareRequest,
) -> ServiceResult<CompareData> {
    request.validate().map_err(ServiceError::InvalidInput)?;

    let origins = repository.resolve_airport_idents(&request.origin).await?;
    if origins.is_empty() {
        return Err(ServiceError::NotEnoughData(format!(
            "Origin selector {} matched no airports",
            request.origin
        )));
    }
    let destinations = repository
        .resolve_airport_idents(&request.destination)
        .await?;
    if destinations.is_empty() {
        return Err(ServiceError::NotEnoughData(format!(
            "Destination selector {} matched no airports",
            request.destination
        )));
    }

    let current = rank_period(repository, request, &origins, &destinations, request.window).await?;

    let previous_window = request.window.shifted_back(request.period_days);
    let previous = match rank_period(repository, request, &origins, &destinations, previous_window)
        .await
    {
        Ok(rows) => rows,
        Err(ServiceError::NotEnoughData(_)) => Vec::new(),
        Err(e) => return Err(e),
    };

    // Union of idents across both periods, zero-filling the missing side
    let idents: BTreeSet<String> = current
        .iter()
        .chain(previous.iter())
        .map(|row| row.airport.clone())
        .collect();
    let ident_list: Vec<String> = idents.iter().cloned().collect();
    let details = repository.resolve_airports(&ident_list).await?;
    let display: HashMap<&str, (&str, &str)> = details
        .iter()
        .map(|airport| {
            let code = airport.iata_code.as_deref().unwrap_or(&airport.ident);
            (airport.ident.as_str(), (code, airport.name.as_str()))
        })
        .collect();

    let display_for = |ident: &str| -> (String, String) {
        display
            .get(ident)
            .map(|(code, name)| (code.to_string(), name.to_string()))
            .unwrap_or_else(|| (ident.to_string(), ident.to_string()))
    };

    let align = |rows: Vec<WeightedKpiRow>| -> HashMap<String, WeightedKpiRow> {
        rows.into_iter().map(|row| (row.airport.clone(), row)).collect()
    };
    let mut current_by_ident = align(current);
    let mut previous_by_ident = align(previous);

    let mut current_rows = Vec::with_capacity(idents.len());
    let mut previous_rows = Vec::with_capacity(idents.len());
    for ident in &idents {
        let (code, name) = display_for(ident);
        let mut current_row = current_by_ident
            .remove(ident)
            .unwrap_or_else(|| WeightedKpiRow::zeroed(ident.clone(), ident.clone()));
        current_row.airport = code.clone();
        current_row.airport_name = name.clone();
        current_rows.push(current_row);

        let mut previous_row = previous_by_ident
            .remove(ident)
            .unwrap_or_else(|| WeightedKpiRow::zeroed(ident.clone(), ident.clone()));
        previous_row.airport = code;
        previous_row.airport_name = name;
        previous_rows.push(previous_row);
    }

    // Rank by the current period; the previous table follows the same order
    let mut order: Vec<usize> = (0..current_rows.len()).collect();
    order.sort_by(|&a, &b| {
        current_rows[b]
            .rating
            .partial_cmp(&current_rows[a].rating)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let current_sorted: Vec<WeightedKpiRow> =
        order.iter().map(|&i| current_rows[i].clone()).collect();
    let previous_sorted: Vec<WeightedKpiRow> =
        order.iter().map(|&i| previous_rows[i].clone()).collect();

    Ok(CompareData {
        preference: request.preference,
        current: current_sorted,
        previous: previous_sorted,
    })
}

async fn rank_period(
    repository: &dyn FullRepository,
    request: &CompareRequest,
    origins: &[String],
    destinations: &[String],
    window: TimeWindow,
) -> ServiceResult<Vec<WeightedKpiRow>> {
    let search = ItinerarySearch {
        origins: origins.to_vec(),
        destinations: destinations.to_vec(),
        window,
        max_layover_hours: request.max_layover_hours,
        max_stops: request.max_stops,
        mode: DedupMode::BestPerRoute,
    };

    let itineraries = build_itineraries(repository, &search, SortKey::Fastest).await?;
    let duration_ceiling_s = (request.max_flight_duration_hours * 3600.0).round() as i64;
    let itineraries = filter_by_max_duration(itineraries, duration_ceiling_s);

    let traffic = repository.query_traffic(origins, window).await?;
    let rows = aggregate_kpis(&itineraries, &traffic);
    compute_weighted(&rows, request.preference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;
    use crate::models::{AirportRef, AirportType, FlightSegment};
    use chrono::{TimeZone, Utc};

    fn segment(callsign: &str, origin: &str, dest: &str, day: u32, dep_h: u32, arr_h: u32) -> FlightSegment {
        FlightSegment {
            callsign: callsign.to_string(),
            origin: origin.to_string(),
            destination: dest.to_string(),
            first_seen: Utc.with_ymd_and_hms(2024, 1, day, dep_h, 0, 0).unwrap(),
            last_seen: Utc.with_ymd_and_hms(2024, 1, day, arr_h, 0, 0).unwrap(),
        }
    }

    fn airport(ident: &str, iata: &str, name: &str, country: &str) -> AirportRef {
        AirportRef {
            ident: ident.to_string(),
            iata_code: Some(iata.to_string()),
            name: name.to_string(),
            airport_type: AirportType::LargeAirport,
            latitude_deg: 0.0,
            longitude_deg: 0.0,
            continent: "NA".to_string(),
            iso_country: country.to_string(),
            iso_region: format!("{}-01", country),
            municipality: None,
            scheduled_service: true,
        }
    }

    fn seeded_repo() -> LocalRepository {
        let repo = LocalRepository::new();
        repo.insert_airport(airport("KJFK", "JFK", "John F Kennedy Intl", "US"));
        repo.insert_airport(airport("KBOS", "BOS", "Boston Logan Intl", "US"));
        repo.insert_airport(airport("EGLL", "LHR", "London Heathrow", "GB"));

        // Current period (Jan 8): both origins reach EGLL
        repo.insert_segments(vec![
            segment("AAL100", "KJFK", "EGLL", 8, 8, 15),
            segment("AAL101", "KJFK", "EGLL", 8, 10, 17),
            segment("DAL200", "KBOS", "EGLL", 8, 9, 17),
        ]);
        // Previous period (Jan 1): only KJFK flies
        repo.insert_segment(segment("AAL100", "KJFK", "EGLL", 1, 8, 15));
        repo
    }

    fn request() -> CompareRequest {
        CompareRequest {
            origin: AirportSelector::Country("US".to_string()),
            destination: AirportSelector::Airport("LHR".to_string()),
            window: TimeWindow::new(
                Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 1, 8, 23, 59, 59).unwrap(),
            )
            .unwrap(),
            max_layover_hours: 4.0,
            max_stops: 1,
            max_flight_duration_hours: 24.0,
            period_days: 7,
            preference: Preference::Na,
        }
    }

    #[tokio::test]
    async fn test_compare_aligns_and_ranks() {
        let repo = seeded_repo();
        let data = compare_airports(&repo, &request()).await.unwrap();

        assert_eq!(data.current.len(), 2);
        assert_eq!(data.previous.len(), 2);
        // JFK has more traffic and routes, so it ranks first
        assert_eq!(data.current[0].airport, "JFK");
        assert_eq!(data.current[0].airport_name, "John F Kennedy Intl");
        assert!(data.current[0].rating >= data.current[1].rating);
        // Previous table follows the current ordering
        assert_eq!(data.previous[0].airport, "JFK");
        assert_eq!(data.previous[1].airport, "BOS");
    }

    #[tokio::test]
    async fn test_thin_previous_period_zero_fills() {
        let repo = seeded_repo();
        let data = compare_airports(&repo, &request()).await.unwrap();

        // Jan 1 had a single origin, below the ranking minimum, so the
        // previous table is all zeros
        assert!(data.previous.iter().all(|row| row.rating == 0.0));
    }

    #[tokio::test]
    async fn test_current_period_too_thin_is_an_error() {
        let repo = LocalRepository::new();
        repo.insert_airport(airport("KJFK", "JFK", "John F Kennedy Intl", "US"));
        repo.insert_airport(airport("EGLL", "LHR", "London Heathrow", "GB"));
        repo.insert_segment(segment("AAL100", "KJFK", "EGLL", 8, 8, 15));

        let result = compare_airports(&repo, &request()).await;
        assert!(matches!(result, Err(ServiceError::NotEnoughData(_))));
    }

    #[tokio::test]
    async fn test_empty_selector_is_rejected() {
        let repo = seeded_repo();
        let mut req = request();
        req.origin = AirportSelector::Country("FR".to_string());
        let result = compare_airports(&repo, &req).await;
        assert!(matches!(result, Err(ServiceError::NotEnoughData(_))));
    }

    #[tokio::test]
    async fn test_duration_ceiling_drops_routes() {
        let repo = seeded_repo();
        let mut req = request();
        // Everything takes at least 7 hours, so a 2 hour ceiling drops all
        // itineraries and ranking has nothing to work with
        req.max_flight_duration_hours = 2.0;
        let result = compare_airports(&repo, &req).await;
        assert!(matches!(result, Err(ServiceError::NotEnoughData(_))));
    }
}
