//! Repository trait definitions.
//!
//! The core never talks to a database directly; every entry point receives a
//! repository handle (`Arc<dyn FullRepository>`) and issues read queries
//! through these traits. Implementations live in
//! [`repositories`](crate::db::repositories).

pub mod error;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

use async_trait::async_trait;

use crate::api::TrafficSummary;
use crate::models::{AirportRef, AirportSelector, CountryRef, RegionRef, SegmentChain, TimeWindow};

/// Minimum buffer between a segment's arrival and the next departure.
pub const MIN_CONNECTION_SECONDS: i64 = 3600;

/// Outer bound on the second leg's departure: within this many days of the
/// window start. Caps join breadth before the layover filter narrows it.
pub const SECOND_LEG_BOUND_DAYS: i64 = 1;

/// Outer bound on the third leg's departure, days from the window start.
pub const THIRD_LEG_BOUND_DAYS: i64 = 2;

/// Read access to recorded flight segments.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait FlightRepository: Send + Sync {
    /// Fetch candidate segment chains for one join depth.
    ///
    /// * depth 0: single segments origin → destination departing inside
    ///   `window`.
    /// * depth 1: connecting pairs where the second segment departs within
    ///   one day of the window start and between 1 hour and
    ///   `max_layover_hours` after the first segment's arrival.
    /// * depth 2: connecting triples with the same layover rule applied to
    ///   both connections; the second leg departs within one day of the
    ///   window start, the third within two days.
    ///
    /// Only the final leg's destination is constrained to `destinations`.
    /// An empty result is a normal value.
    async fn query_segment_chains(
        &self,
        origins: &[String],
        destinations: &[String],
        window: TimeWindow,
        stops: u8,
        max_layover_hours: f64,
    ) -> RepositoryResult<Vec<SegmentChain>>;

    /// Per-origin traffic counts inside the window: total departures,
    /// distinct airline codes, distinct destinations. Origins without any
    /// traffic are absent from the result.
    async fn query_traffic(
        &self,
        origins: &[String],
        window: TimeWindow,
    ) -> RepositoryResult<Vec<TrafficSummary>>;
}

/// Read access to airport/country/region reference data.
#[async_trait]
pub trait ReferenceRepository: Send + Sync {
    /// Expand a selector key into the airport idents it covers, restricted
    /// to large/medium airports with scheduled service.
    async fn resolve_airport_idents(
        &self,
        selector: &AirportSelector,
    ) -> RepositoryResult<Vec<String>>;

    /// Look up airport reference rows by ident.
    async fn resolve_airports(&self, idents: &[String]) -> RepositoryResult<Vec<AirportRef>>;

    /// All airports eligible for the search forms (large/medium with
    /// scheduled service).
    async fn list_selectable_airports(&self) -> RepositoryResult<Vec<AirportRef>>;

    /// Country reference rows for selector labels.
    async fn resolve_countries(&self) -> RepositoryResult<Vec<CountryRef>>;

    /// Region reference rows for selector labels.
    async fn resolve_regions(&self) -> RepositoryResult<Vec<RegionRef>>;

    /// Verify the backend is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;
}

/// Combined repository interface injected into the service layer.
pub trait FullRepository: FlightRepository + ReferenceRepository {}

impl<T: FlightRepository + ReferenceRepository> FullRepository for T {}
