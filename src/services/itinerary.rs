//! Itinerary construction.
//!
//! Turns segment chains fetched by the repository into display-ready
//! [`Itinerary`] values: derives per-leg airline attribution and duration
//! strings, layover durations, total duration and stop counts, then
//! optionally collapses duplicate routings and sorts.

use std::collections::HashSet;
use std::cmp::Ordering;

use crate::api::{DedupMode, FlightLeg, Itinerary, ItinerarySearch, SortKey};
use crate::db::repository::FullRepository;
use crate::models::time::{format_duration, format_hhmm};
use crate::models::{FlightSegment, SegmentChain};
use crate::services::{ServiceError, ServiceResult};

/// Build itineraries for a validated search.
///
/// Queries the repository once per join depth up to `max_stops`, derives
/// display fields, deduplicates per the search mode and sorts by `sort`.
/// An empty result is a normal value, not an error.
pub async fn build_itineraries(
    repository: &dyn FullRepository,
    search: &ItinerarySearch,
    sort: SortKey,
) -> ServiceResult<Vec<Itinerary>> {
    search.validate().map_err(ServiceError::InvalidInput)?;

    let mut chains: Vec<SegmentChain> = Vec::new();
    for depth in 0..=search.max_stops {
        chains.extend(
            repository
                .query_segment_chains(
                    &search.origins,
                    &search.destinations,
                    search.window,
                    depth,
                    search.max_layover_hours,
                )
                .await?,
        );
    }

    let mut itineraries: Vec<Itinerary> = chains.into_iter().map(derive_itinerary).collect();

    if search.mode == DedupMode::BestPerRoute {
        itineraries = dedup_best_per_route(itineraries);
    }

    sort_itineraries(&mut itineraries, sort);
    Ok(itineraries)
}

/// Drop itineraries whose total duration exceeds the ceiling, in seconds.
pub fn filter_by_max_duration(itineraries: Vec<Itinerary>, max_duration_s: i64) -> Vec<Itinerary> {
    itineraries
        .into_iter()
        .filter(|itinerary| itinerary.total_duration_s <= max_duration_s)
        .collect()
}

fn derive_leg(segment: &FlightSegment) -> FlightLeg {
    let airline_code = segment.airline_code();
    let duration_s = segment.duration_seconds();
    FlightLeg {
        airline_name: format!("{} Airline", airline_code),
        airline_code,
        origin: segment.origin.clone(),
        destination: segment.destination.clone(),
        departure: segment.first_seen,
        departure_str: format_hhmm(segment.first_seen),
        arrival: segment.last_seen,
        arrival_str: format_hhmm(segment.last_seen),
        duration_s,
        duration_str: format_duration(duration_s),
    }
}

fn derive_itinerary(chain: SegmentChain) -> Itinerary {
    let last_arrival = chain.last().last_seen;
    let total_duration_s = (last_arrival - chain.first.first_seen).num_seconds();

    let layover_1_s = chain
        .second
        .as_ref()
        .map(|second| (second.first_seen - chain.first.last_seen).num_seconds());
    let layover_2_s = match (&chain.second, &chain.third) {
        (Some(second), Some(third)) => {
            Some((third.first_seen - second.last_seen).num_seconds())
        }
        _ => None,
    };

    let stop_count = chain.second.is_some() as u8 + chain.third.is_some() as u8;
    let stop_count_str = match stop_count {
        0 => "Nonstop".to_string(),
        1 => "1 stop".to_string(),
        n => format!("{} stops", n),
    };

    Itinerary {
        leg1: derive_leg(&chain.first),
        leg2: chain.second.as_ref().map(derive_leg),
        leg3: chain.third.as_ref().map(derive_leg),
        stop_count,
        stop_count_str,
        total_duration_s,
        total_duration_str: format_duration(total_duration_s),
        layover_duration_1_s: layover_1_s,
        layover_duration_1_str: layover_1_s.map(format_duration),
        layover_duration_2_s: layover_2_s,
        layover_duration_2_str: layover_2_s.map(format_duration),
        arrival_time: last_arrival,
    }
}

/// Keep the fastest itinerary per distinct routing. Sorting first makes
/// "keep first occurrence" equivalent to "keep fastest".
fn dedup_best_per_route(mut itineraries: Vec<Itinerary>) -> Vec<Itinerary> {
    itineraries.sort_by_key(|itinerary| itinerary.total_duration_s);
    let mut seen = HashSet::new();
    itineraries.retain(|itinerary| seen.insert(itinerary.route_key()));
    itineraries
}

fn sort_itineraries(itineraries: &mut [Itinerary], sort: SortKey) {
    itineraries.sort_by(|a, b| {
        let primary = match sort {
            SortKey::Fastest => Ordering::Equal,
            SortKey::Departure => a.leg1.departure.cmp(&b.leg1.departure),
            SortKey::Arrival => a.arrival_time.cmp(&b.arrival_time),
            SortKey::Stops => a.stop_count.cmp(&b.stop_count),
        };
        primary.then(a.total_duration_s.cmp(&b.total_duration_s))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TimeWindow;
    use crate::db::repositories::LocalRepository;
    use chrono::{TimeZone, Utc};

    fn segment(callsign: &str, origin: &str, dest: &str, dep: (u32, u32), arr: (u32, u32)) -> FlightSegment {
        FlightSegment {
            callsign: callsign.to_string(),
            origin: origin.to_string(),
            destination: dest.to_string(),
            first_seen: Utc.with_ymd_and_hms(2024, 1, 1, dep.0, dep.1, 0).unwrap(),
            last_seen: Utc.with_ymd_and_hms(2024, 1, 1, arr.0, arr.1, 0).unwrap(),
        }
    }

    fn search(max_stops: u8, mode: DedupMode) -> ItinerarySearch {
        ItinerarySearch {
            origins: vec!["KJFK".to_string()],
            destinations: vec!["EGLL".to_string()],
            window: TimeWindow::new(
                Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 1, 1, 23, 59, 59).unwrap(),
            )
            .unwrap(),
            max_layover_hours: 4.0,
            max_stops,
            mode,
        }
    }

    #[test]
    fn test_derive_nonstop_fields() {
        let itinerary = derive_itinerary(SegmentChain::nonstop(segment(
            "AAL100", "KJFK", "EGLL", (8, 0), (15, 30),
        )));
        assert_eq!(itinerary.stop_count, 0);
        assert_eq!(itinerary.stop_count_str, "Nonstop");
        assert_eq!(itinerary.leg1.airline_code, "AAL");
        assert_eq!(itinerary.leg1.airline_name, "AAL Airline");
        assert_eq!(itinerary.leg1.departure_str, "08:00");
        assert_eq!(itinerary.leg1.arrival_str, "15:30");
        assert_eq!(itinerary.total_duration_s, 7 * 3600 + 30 * 60);
        assert_eq!(itinerary.total_duration_str, "7 hr 30 min");
        assert!(itinerary.layover_duration_1_s.is_none());
        assert!(itinerary.leg2.is_none());
    }

    #[test]
    fn test_derive_one_stop_layover() {
        let itinerary = derive_itinerary(SegmentChain::one_stop(
            segment("AAL100", "KJFK", "KORD", (8, 0), (10, 0)),
            segment("UAL200", "KORD", "EGLL", (11, 30), (19, 0)),
        ));
        assert_eq!(itinerary.stop_count, 1);
        assert_eq!(itinerary.stop_count_str, "1 stop");
        assert_eq!(itinerary.layover_duration_1_s, Some(90 * 60));
        assert_eq!(itinerary.layover_duration_1_str.as_deref(), Some("1 hr 30 min"));
        assert!(itinerary.layover_duration_2_s.is_none());
        // 08:00 departure to 19:00 arrival
        assert_eq!(itinerary.total_duration_s, 11 * 3600);
        assert_eq!(itinerary.final_destination(), "EGLL");
    }

    #[tokio::test]
    async fn test_dedup_keeps_fastest_per_route() {
        let repo = LocalRepository::new();
        // Two nonstop flights on the same route, different durations
        repo.insert_segment(segment("AAL100", "KJFK", "EGLL", (8, 0), (16, 0)));
        repo.insert_segment(segment("BAW200", "KJFK", "EGLL", (9, 0), (15, 30)));

        let results = build_itineraries(&repo, &search(0, DedupMode::BestPerRoute), SortKey::Fastest)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].leg1.airline_code, "BAW");

        let all = build_itineraries(&repo, &search(0, DedupMode::All), SortKey::Fastest)
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_one_stop_and_nonstop_are_distinct_routes() {
        let repo = LocalRepository::new();
        repo.insert_segment(segment("AAL100", "KJFK", "EGLL", (8, 0), (16, 0)));
        repo.insert_segment(segment("AAL300", "KJFK", "KORD", (7, 0), (9, 0)));
        repo.insert_segment(segment("UAL400", "KORD", "EGLL", (10, 30), (18, 0)));

        let results = build_itineraries(&repo, &search(1, DedupMode::BestPerRoute), SortKey::Fastest)
            .await
            .unwrap();
        // Different intermediate stops, so both survive dedup
        assert_eq!(results.len(), 2);
        // Fastest first
        assert!(results[0].total_duration_s <= results[1].total_duration_s);
    }

    #[tokio::test]
    async fn test_sort_by_departure() {
        let repo = LocalRepository::new();
        repo.insert_segment(segment("AAL100", "KJFK", "EGLL", (12, 0), (19, 0)));
        repo.insert_segment(segment("BAW200", "KJFK", "EGLL", (8, 0), (17, 0)));

        let results = build_itineraries(&repo, &search(0, DedupMode::All), SortKey::Departure)
            .await
            .unwrap();
        assert_eq!(results[0].leg1.airline_code, "BAW");
        assert_eq!(results[1].leg1.airline_code, "AAL");
    }

    #[tokio::test]
    async fn test_invalid_search_rejected_before_query() {
        let repo = LocalRepository::new();
        let mut bad = search(0, DedupMode::All);
        bad.origins.clear();
        let result = build_itineraries(&repo, &bad, SortKey::Fastest).await;
        assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
    }

    #[test]
    fn test_filter_by_max_duration() {
        let fast = derive_itinerary(SegmentChain::nonstop(segment(
            "AAL100", "KJFK", "EGLL", (8, 0), (14, 0),
        )));
        let slow = derive_itinerary(SegmentChain::nonstop(segment(
            "BAW200", "KJFK", "EGLL", (8, 0), (18, 0),
        )));
        let kept = filter_by_max_duration(vec![fast, slow], 8 * 3600);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].leg1.airline_code, "AAL");
    }
}
