//! Public API surface for the Rust backend.
//!
//! This file consolidates the DTO types exchanged with the presentation
//! layer. All types derive Serialize/Deserialize for JSON serialization.
//! Each pipeline stage has its own record type: repository rows come in as
//! [`SegmentChain`](crate::models::SegmentChain), the builder produces
//! [`Itinerary`], the aggregators produce [`TrafficSummary`] and [`KpiRow`],
//! and the weighter produces [`WeightedKpiRow`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use crate::models::time::TimeWindow;

/// One leg of an itinerary, fully derived for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightLeg {
    /// First three characters of the callsign
    pub airline_code: String,
    pub airline_name: String,
    pub origin: String,
    pub destination: String,
    pub departure: DateTime<Utc>,
    /// `HH:MM` display form of `departure`
    pub departure_str: String,
    pub arrival: DateTime<Utc>,
    /// `HH:MM` display form of `arrival`
    pub arrival_str: String,
    pub duration_s: i64,
    /// `"x hr y min"` display form of `duration_s`
    pub duration_str: String,
}

/// A chain of one to three connecting legs forming a valid trip.
///
/// Legs 2 and 3 are present only for 1- and 2-stop itineraries; the layover
/// fields mirror that (`stop_count` equals the number of populated layovers).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Itinerary {
    pub leg1: FlightLeg,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leg2: Option<FlightLeg>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leg3: Option<FlightLeg>,
    /// Number of connections: 0, 1 or 2
    pub stop_count: u8,
    /// `"Nonstop"`, `"1 stop"` or `"2 stops"`
    pub stop_count_str: String,
    /// First leg departure to last populated leg arrival, seconds
    pub total_duration_s: i64,
    pub total_duration_str: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layover_duration_1_s: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layover_duration_1_str: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layover_duration_2_s: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layover_duration_2_str: Option<String>,
    /// Arrival of the last populated leg
    pub arrival_time: DateTime<Utc>,
}

/// Identity of a routing: origin, intermediate stops, final destination.
/// Itineraries sharing a route key are the "same route" for deduplication.
pub type RouteKey = (String, Option<String>, Option<String>, String);

impl Itinerary {
    pub fn origin(&self) -> &str {
        &self.leg1.origin
    }

    pub fn final_destination(&self) -> &str {
        self.leg3
            .as_ref()
            .or(self.leg2.as_ref())
            .map(|leg| leg.destination.as_str())
            .unwrap_or(&self.leg1.destination)
    }

    pub fn route_key(&self) -> RouteKey {
        (
            self.leg1.origin.clone(),
            self.leg2.as_ref().map(|leg| leg.origin.clone()),
            self.leg3.as_ref().map(|leg| leg.origin.clone()),
            self.final_destination().to_string(),
        )
    }
}

/// Whether the builder collapses duplicate routings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupMode {
    /// Keep only the fastest itinerary per distinct routing
    BestPerRoute,
    /// Keep every candidate
    All,
}

/// Result ordering for the flight-search page. Total duration is always the
/// tiebreak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Fastest,
    Departure,
    Arrival,
    Stops,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fastest" => Ok(Self::Fastest),
            "departure" => Ok(Self::Departure),
            "arrival" => Ok(Self::Arrival),
            "stops" => Ok(Self::Stops),
            _ => Err(format!("Unknown sort key: {}", s)),
        }
    }
}

/// Validated parameters for one itinerary-builder invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItinerarySearch {
    /// Candidate origin airport idents (non-empty)
    pub origins: Vec<String>,
    /// Candidate destination airport idents (non-empty)
    pub destinations: Vec<String>,
    pub window: TimeWindow,
    /// Layover ceiling in hours (> 0); converted to seconds internally
    pub max_layover_hours: f64,
    /// Maximum number of connections: 0, 1 or 2
    pub max_stops: u8,
    pub mode: DedupMode,
}

impl ItinerarySearch {
    /// Check the documented preconditions. Rejected before any repository
    /// query is issued.
    pub fn validate(&self) -> Result<(), String> {
        if self.origins.is_empty() {
            return Err("Origin airport set must not be empty".to_string());
        }
        if self.destinations.is_empty() {
            return Err("Destination airport set must not be empty".to_string());
        }
        if self.max_layover_hours <= 0.0 {
            return Err("Layover ceiling must be positive".to_string());
        }
        if self.max_stops > 2 {
            return Err(format!("max_stops must be 0, 1 or 2, got {}", self.max_stops));
        }
        Ok(())
    }
}

/// Origin-airport traffic aggregates, independent of any destination (GAP).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficSummary {
    pub airport: String,
    /// kpi1: total departing segments in the window
    pub flight_count: i64,
    /// kpi2: distinct airline codes
    pub airline_count: i64,
    /// kpi3: distinct destinations
    pub destination_count: i64,
}

/// One unweighted KPI row per eligible origin airport.
///
/// kpi1-kpi3 come from the traffic aggregates, kpi4-kpi8 from the
/// route-specific itinerary aggregates. kpi8 is 0 when no layovers were
/// observed for the airport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiRow {
    pub airport: String,
    pub kpi1: i64,
    pub kpi2: i64,
    pub kpi3: i64,
    pub kpi4: i64,
    pub kpi5: i64,
    /// Mean total itinerary duration, seconds
    pub kpi6: f64,
    /// Mean stop count
    pub kpi7: f64,
    /// Mean first-layover duration, seconds
    pub kpi8: f64,
}

pub const KPI_COUNT: usize = 8;

impl KpiRow {
    /// Indicator value by zero-based index (0 = kpi1 .. 7 = kpi8).
    pub fn indicator(&self, index: usize) -> f64 {
        match index {
            0 => self.kpi1 as f64,
            1 => self.kpi2 as f64,
            2 => self.kpi3 as f64,
            3 => self.kpi4 as f64,
            4 => self.kpi5 as f64,
            5 => self.kpi6,
            6 => self.kpi7,
            7 => self.kpi8,
            _ => panic!("KPI index out of range: {}", index),
        }
    }

    /// kpi6-kpi8 are cost indicators (lower is better) and get inverted
    /// after normalization.
    pub fn is_cost_indicator(index: usize) -> bool {
        index >= 5
    }
}

/// User-selected indicator to up-weight in the composite rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Preference {
    #[default]
    #[serde(rename = "NA")]
    Na,
    #[serde(rename = "kpi1")]
    Kpi1,
    #[serde(rename = "kpi2")]
    Kpi2,
    #[serde(rename = "kpi3")]
    Kpi3,
    #[serde(rename = "kpi4")]
    Kpi4,
    #[serde(rename = "kpi5")]
    Kpi5,
    #[serde(rename = "kpi6")]
    Kpi6,
    #[serde(rename = "kpi7")]
    Kpi7,
    #[serde(rename = "kpi8")]
    Kpi8,
}

impl Preference {
    /// Zero-based index of the preferred indicator, `None` when unset.
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Na => None,
            Self::Kpi1 => Some(0),
            Self::Kpi2 => Some(1),
            Self::Kpi3 => Some(2),
            Self::Kpi4 => Some(3),
            Self::Kpi5 => Some(4),
            Self::Kpi6 => Some(5),
            Self::Kpi7 => Some(6),
            Self::Kpi8 => Some(7),
        }
    }
}

impl FromStr for Preference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "na" => Ok(Self::Na),
            "kpi1" => Ok(Self::Kpi1),
            "kpi2" => Ok(Self::Kpi2),
            "kpi3" => Ok(Self::Kpi3),
            "kpi4" => Ok(Self::Kpi4),
            "kpi5" => Ok(Self::Kpi5),
            "kpi6" => Ok(Self::Kpi6),
            "kpi7" => Ok(Self::Kpi7),
            "kpi8" => Ok(Self::Kpi8),
            _ => Err(format!("Unknown preference: {}", s)),
        }
    }
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Na => write!(f, "NA"),
            other => write!(f, "kpi{}", other.index().unwrap() + 1),
        }
    }
}

/// A KPI row after normalization and weighting.
///
/// The `*_weighted` columns carry the display scaling (×80 without a
/// preference, ×50 with one); `rating` is always on the fixed [0, 10] scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedKpiRow {
    /// Display code: IATA where known, otherwise the ident
    pub airport: String,
    pub airport_name: String,
    pub kpi1_weighted: f64,
    pub kpi2_weighted: f64,
    pub kpi3_weighted: f64,
    pub kpi4_weighted: f64,
    pub kpi5_weighted: f64,
    pub kpi6_weighted: f64,
    pub kpi7_weighted: f64,
    pub kpi8_weighted: f64,
    /// Composite score in [0, 10]
    pub rating: f64,
}

impl WeightedKpiRow {
    /// Blank row used when aligning the two comparison periods: an airport
    /// present in only one period shows zeros in the other.
    pub fn zeroed(airport: String, airport_name: String) -> Self {
        Self {
            airport,
            airport_name,
            kpi1_weighted: 0.0,
            kpi2_weighted: 0.0,
            kpi3_weighted: 0.0,
            kpi4_weighted: 0.0,
            kpi5_weighted: 0.0,
            kpi6_weighted: 0.0,
            kpi7_weighted: 0.0,
            kpi8_weighted: 0.0,
            rating: 0.0,
        }
    }

    pub fn weighted(&self, index: usize) -> f64 {
        match index {
            0 => self.kpi1_weighted,
            1 => self.kpi2_weighted,
            2 => self.kpi3_weighted,
            3 => self.kpi4_weighted,
            4 => self.kpi5_weighted,
            5 => self.kpi6_weighted,
            6 => self.kpi7_weighted,
            7 => self.kpi8_weighted,
            _ => panic!("KPI index out of range: {}", index),
        }
    }

    pub fn set_weighted(&mut self, index: usize, value: f64) {
        match index {
            0 => self.kpi1_weighted = value,
            1 => self.kpi2_weighted = value,
            2 => self.kpi3_weighted = value,
            3 => self.kpi4_weighted = value,
            4 => self.kpi5_weighted = value,
            5 => self.kpi6_weighted = value,
            6 => self.kpi7_weighted = value,
            7 => self.kpi8_weighted = value,
            _ => panic!("KPI index out of range: {}", index),
        }
    }
}

/// Ranked airport tables for the selected and the previous period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareData {
    pub preference: Preference,
    /// Weighted rows for the selected period, sorted by rating descending
    pub current: Vec<WeightedKpiRow>,
    /// Weighted rows for the shifted-back period, aligned to `current`
    pub previous: Vec<WeightedKpiRow>,
}

/// One grouped dropdown entry for the search forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirportOption {
    pub label: String,
    /// Selector key, e.g. `air#ZRH` or `cou#CH`
    pub value: String,
    pub group: String,
}
