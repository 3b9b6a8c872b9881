//! Per-airport KPI aggregation.
//!
//! Combines two sources keyed by origin airport ident:
//!
//! - traffic aggregates (kpi1-kpi3): total departures, distinct airlines,
//!   distinct destinations inside the window, independent of any destination
//!   filter
//! - itinerary aggregates (kpi4-kpi8): route count, distinct first-leg
//!   airlines, mean total duration, mean stop count, mean first-layover
//!   duration, over the deduplicated itineraries reaching the requested
//!   destinations
//!
//! Airports with traffic but no qualifying itineraries are dropped; they
//! have nothing to rank on the destination-specific indicators.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::api::{Itinerary, KpiRow, TrafficSummary};

/// Aggregate itineraries and traffic counts into one row per origin
/// airport, sorted by airport ident.
pub fn aggregate_kpis(itineraries: &[Itinerary], traffic: &[TrafficSummary]) -> Vec<KpiRow> {
    let traffic_by_airport: HashMap<&str, &TrafficSummary> = traffic
        .iter()
        .map(|summary| (summary.airport.as_str(), summary))
        .collect();

    struct Accumulator {
        route_count: i64,
        airlines: HashSet<String>,
        total_duration_sum: i64,
        stop_count_sum: i64,
        layover_sum: i64,
        layover_count: i64,
    }

    let mut groups: BTreeMap<String, Accumulator> = BTreeMap::new();
    for itinerary in itineraries {
        let entry = groups
            .entry(itinerary.origin().to_string())
            .or_insert_with(|| Accumulator {
                route_count: 0,
                airlines: HashSet::new(),
                total_duration_sum: 0,
                stop_count_sum: 0,
                layover_sum: 0,
                layover_count: 0,
            });
        entry.route_count += 1;
        entry.airlines.insert(itinerary.leg1.airline_code.clone());
        entry.total_duration_sum += itinerary.total_duration_s;
        entry.stop_count_sum += i64::from(itinerary.stop_count);
        if let Some(layover) = itinerary.layover_duration_1_s {
            entry.layover_sum += layover;
            entry.layover_count += 1;
        }
    }

    groups
        .into_iter()
        .map(|(airport, acc)| {
            let (kpi1, kpi2, kpi3) = traffic_by_airport
                .get(airport.as_str())
                .map(|summary| {
                    (
                        summary.flight_count,
                        summary.airline_count,
                        summary.destination_count,
                    )
                })
                .unwrap_or((0, 0, 0));

            let route_count = acc.route_count as f64;
            KpiRow {
                kpi1,
                kpi2,
                kpi3,
                kpi4: acc.route_count,
                kpi5: acc.airlines.len() as i64,
                kpi6: acc.total_duration_sum as f64 / route_count,
                kpi7: acc.stop_count_sum as f64 / route_count,
                kpi8: if acc.layover_count > 0 {
                    acc.layover_sum as f64 / acc.layover_count as f64
                } else {
                    0.0
                },
                airport,
            }
        })
        .collect()
}
