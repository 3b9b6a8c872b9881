//! Domain records: flight segments, joined segment chains, and reference data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One recorded point-to-point aircraft movement.
///
/// Invariant (owned by ingestion): `first_seen < last_seen`. Segments are
/// immutable once loaded; the core only reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightSegment {
    pub callsign: String,
    /// Origin airport ident (ICAO-style, e.g. "KJFK")
    pub origin: String,
    /// Destination airport ident
    pub destination: String,
    /// Segment start (departure), timezone-aware
    pub first_seen: DateTime<Utc>,
    /// Segment end (arrival), timezone-aware
    pub last_seen: DateTime<Utc>,
}

impl FlightSegment {
    /// Airline code: the first three characters of the callsign. Callsigns
    /// shorter than three characters are used as-is.
    pub fn airline_code(&self) -> String {
        self.callsign.chars().take(3).collect()
    }

    /// Segment duration in seconds.
    pub fn duration_seconds(&self) -> i64 {
        (self.last_seen - self.first_seen).num_seconds()
    }
}

/// A raw joined row from the repository: one, two or three connecting
/// segments. Absent legs are explicit `None`s rather than missing columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentChain {
    pub first: FlightSegment,
    pub second: Option<FlightSegment>,
    pub third: Option<FlightSegment>,
}

impl SegmentChain {
    pub fn nonstop(first: FlightSegment) -> Self {
        Self {
            first,
            second: None,
            third: None,
        }
    }

    pub fn one_stop(first: FlightSegment, second: FlightSegment) -> Self {
        Self {
            first,
            second: Some(second),
            third: None,
        }
    }

    pub fn two_stop(first: FlightSegment, second: FlightSegment, third: FlightSegment) -> Self {
        Self {
            first,
            second: Some(second),
            third: Some(third),
        }
    }

    /// The last populated segment of the chain.
    pub fn last(&self) -> &FlightSegment {
        self.third.as_ref().or(self.second.as_ref()).unwrap_or(&self.first)
    }

    pub fn final_destination(&self) -> &str {
        &self.last().destination
    }
}

/// Airport size classification from the reference data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AirportType {
    LargeAirport,
    MediumAirport,
    SmallAirport,
    Other,
}

impl AirportType {
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "large_airport" => Self::LargeAirport,
            "medium_airport" => Self::MediumAirport,
            "small_airport" => Self::SmallAirport,
            _ => Self::Other,
        }
    }

    /// Only large and medium airports are selectable in the search forms.
    pub fn is_selectable(&self) -> bool {
        matches!(self, Self::LargeAirport | Self::MediumAirport)
    }
}

/// Read-only airport reference row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportRef {
    pub ident: String,
    pub iata_code: Option<String>,
    pub name: String,
    pub airport_type: AirportType,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub continent: String,
    pub iso_country: String,
    pub iso_region: String,
    pub municipality: Option<String>,
    pub scheduled_service: bool,
}

impl AirportRef {
    /// Eligible as a search origin/destination: large or medium with
    /// scheduled service.
    pub fn is_selectable(&self) -> bool {
        self.airport_type.is_selectable() && self.scheduled_service
    }
}

/// Country reference row used for selector labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRef {
    pub code: String,
    pub name: String,
    pub continent: String,
}

/// Region reference row used for selector labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRef {
    pub code: String,
    pub name: String,
    pub iso_country: String,
}
