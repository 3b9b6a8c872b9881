//! In-memory local repository implementation.
//!
//! Stores flight segments and reference data in plain `Vec`s and `HashMap`s
//! behind an `RwLock`, giving fast, deterministic, isolated execution for
//! unit tests and local development. The 0/1/2-stop temporal joins are
//! computed with explicit loops over the segment store, applying the same
//! predicates the SQL backend expresses in its join conditions.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Duration;

use crate::api::TrafficSummary;
use crate::db::repository::{
    FlightRepository, ReferenceRepository, RepositoryError, RepositoryResult,
    MIN_CONNECTION_SECONDS, SECOND_LEG_BOUND_DAYS, THIRD_LEG_BOUND_DAYS,
};
use crate::models::{
    AirportRef, AirportSelector, CountryRef, FlightSegment, RegionRef, SegmentChain, TimeWindow,
};

/// In-memory local repository.
///
/// # Example
/// ```
/// use skylens_rust::db::repositories::LocalRepository;
///
/// let repo = LocalRepository::new();
/// // Pre-populate with test data
/// // repo.insert_segment(...);
/// ```
#[derive(Clone, Default)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

#[derive(Default)]
struct LocalData {
    segments: Vec<FlightSegment>,
    airports: HashMap<String, AirportRef>,
    countries: Vec<CountryRef>,
    regions: Vec<RegionRef>,
    is_healthy: bool,
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        let repo = Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        };
        repo.data.write().unwrap().is_healthy = true;
        repo
    }

    /// Add a flight segment to the store.
    pub fn insert_segment(&self, segment: FlightSegment) {
        self.data.write().unwrap().segments.push(segment);
    }

    /// Add a batch of flight segments.
    pub fn insert_segments(&self, segments: impl IntoIterator<Item = FlightSegment>) {
        self.data.write().unwrap().segments.extend(segments);
    }

    /// Add an airport reference row, keyed by ident.
    pub fn insert_airport(&self, airport: AirportRef) {
        self.data
            .write()
            .unwrap()
            .airports
            .insert(airport.ident.clone(), airport);
    }

    pub fn insert_country(&self, country: CountryRef) {
        self.data.write().unwrap().countries.push(country);
    }

    pub fn insert_region(&self, region: RegionRef) {
        self.data.write().unwrap().regions.push(region);
    }

    /// Simulate a backend outage in tests.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().unwrap().is_healthy = healthy;
    }

    fn ensure_healthy(&self, operation: &str) -> RepositoryResult<()> {
        if self.data.read().unwrap().is_healthy {
            Ok(())
        } else {
            Err(RepositoryError::connection("Local repository marked unhealthy")
                .with_operation(operation))
        }
    }
}

/// Connection predicate shared by the 1- and 2-stop joins: the next leg must
/// depart at least an hour and at most the layover ceiling after the
/// previous leg's arrival.
fn connects(prev: &FlightSegment, next: &FlightSegment, layover_ceiling_s: i64) -> bool {
    if prev.destination != next.origin {
        return false;
    }
    let gap = (next.first_seen - prev.last_seen).num_seconds();
    gap >= MIN_CONNECTION_SECONDS && gap <= layover_ceiling_s
}

#[async_trait]
impl FlightRepository for LocalRepository {
    async fn query_segment_chains(
        &self,
        origins: &[String],
        destinations: &[String],
        window: TimeWindow,
        stops: u8,
        max_layover_hours: f64,
    ) -> RepositoryResult<Vec<SegmentChain>> {
        self.ensure_healthy("query_segment_chains")?;
        let data = self.data.read().unwrap();

        let origin_set: HashSet<&str> = origins.iter().map(String::as_str).collect();
        let destination_set: HashSet<&str> = destinations.iter().map(String::as_str).collect();
        let layover_ceiling_s = (max_layover_hours * 3600.0).round() as i64;
        let second_leg_end = window.start + Duration::days(SECOND_LEG_BOUND_DAYS);
        let third_leg_end = window.start + Duration::days(THIRD_LEG_BOUND_DAYS);

        let firsts: Vec<&FlightSegment> = data
            .segments
            .iter()
            .filter(|s| origin_set.contains(s.origin.as_str()) && window.contains(s.first_seen))
            .collect();

        let mut chains = Vec::new();
        match stops {
            0 => {
                for s1 in firsts {
                    if destination_set.contains(s1.destination.as_str()) {
                        chains.push(SegmentChain::nonstop(s1.clone()));
                    }
                }
            }
            1 => {
                for s1 in firsts {
                    for s2 in &data.segments {
                        if destination_set.contains(s2.destination.as_str())
                            && s2.first_seen >= window.start
                            && s2.first_seen <= second_leg_end
                            && connects(s1, s2, layover_ceiling_s)
                        {
                            chains.push(SegmentChain::one_stop(s1.clone(), s2.clone()));
                        }
                    }
                }
            }
            2 => {
                for s1 in firsts {
                    for s2 in &data.segments {
                        if s2.first_seen < window.start
                            || s2.first_seen > second_leg_end
                            || !connects(s1, s2, layover_ceiling_s)
                        {
                            continue;
                        }
                        for s3 in &data.segments {
                            if destination_set.contains(s3.destination.as_str())
                                && s3.first_seen >= window.start
                                && s3.first_seen <= third_leg_end
                                && connects(s2, s3, layover_ceiling_s)
                            {
                                chains.push(SegmentChain::two_stop(
                                    s1.clone(),
                                    s2.clone(),
                                    s3.clone(),
                                ));
                            }
                        }
                    }
                }
            }
            other => {
                return Err(RepositoryError::validation(format!(
                    "Unsupported join depth: {}",
                    other
                ))
                .with_operation("query_segment_chains"));
            }
        }

        Ok(chains)
    }

    async fn query_traffic(
        &self,
        origins: &[String],
        window: TimeWindow,
    ) -> RepositoryResult<Vec<TrafficSummary>> {
        self.ensure_healthy("query_traffic")?;
        let data = self.data.read().unwrap();
        let origin_set: HashSet<&str> = origins.iter().map(String::as_str).collect();

        // BTreeMap keeps the per-origin rows in deterministic order
        let mut counts: BTreeMap<String, (i64, HashSet<String>, HashSet<String>)> = BTreeMap::new();
        for segment in &data.segments {
            if !origin_set.contains(segment.origin.as_str()) || !window.contains(segment.first_seen)
            {
                continue;
            }
            let entry = counts.entry(segment.origin.clone()).or_default();
            entry.0 += 1;
            entry.1.insert(segment.airline_code());
            entry.2.insert(segment.destination.clone());
        }

        Ok(counts
            .into_iter()
            .map(|(airport, (flights, airlines, dests))| TrafficSummary {
                airport,
                flight_count: flights,
                airline_count: airlines.len() as i64,
                destination_count: dests.len() as i64,
            })
            .collect())
    }
}

#[async_trait]
impl ReferenceRepository for LocalRepository {
    async fn resolve_airport_idents(
        &self,
        selector: &AirportSelector,
    ) -> RepositoryResult<Vec<String>> {
        self.ensure_healthy("resolve_airport_idents")?;
        let data = self.data.read().unwrap();

        let mut idents: Vec<String> = data
            .airports
            .values()
            .filter(|airport| airport.is_selectable())
            .filter(|airport| match selector {
                AirportSelector::Continent(code) => airport.continent == *code,
                AirportSelector::Country(code) => airport.iso_country == *code,
                AirportSelector::Region(code) => airport.iso_region == *code,
                AirportSelector::Municipality {
                    iso_country,
                    iso_region,
                    municipality,
                } => {
                    airport.iso_country == *iso_country
                        && airport.iso_region == *iso_region
                        && airport.municipality.as_deref() == Some(municipality.as_str())
                }
                AirportSelector::Airport(iata) => {
                    airport.iata_code.as_deref() == Some(iata.as_str())
                }
            })
            .map(|airport| airport.ident.clone())
            .collect();
        idents.sort();
        Ok(idents)
    }

    async fn resolve_airports(&self, idents: &[String]) -> RepositoryResult<Vec<AirportRef>> {
        self.ensure_healthy("resolve_airports")?;
        let data = self.data.read().unwrap();
        let mut airports: Vec<AirportRef> = idents
            .iter()
            .filter_map(|ident| data.airports.get(ident).cloned())
            .collect();
        airports.sort_by(|a, b| a.ident.cmp(&b.ident));
        Ok(airports)
    }

    async fn list_selectable_airports(&self) -> RepositoryResult<Vec<AirportRef>> {
        self.ensure_healthy("list_selectable_airports")?;
        let data = self.data.read().unwrap();
        let mut airports: Vec<AirportRef> = data
            .airports
            .values()
            .filter(|airport| airport.is_selectable())
            .cloned()
            .collect();
        airports.sort_by(|a, b| a.ident.cmp(&b.ident));
        Ok(airports)
    }

    async fn resolve_countries(&self) -> RepositoryResult<Vec<CountryRef>> {
        self.ensure_healthy("resolve_countries")?;
        Ok(self.data.read().unwrap().countries.clone())
    }

    async fn resolve_regions(&self) -> RepositoryResult<Vec<RegionRef>> {
        self.ensure_healthy("resolve_regions")?;
        Ok(self.data.read().unwrap().regions.clone())
    }

    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().unwrap().is_healthy)
    }
}
