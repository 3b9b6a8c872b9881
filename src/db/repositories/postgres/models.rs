//! Row structs mapping query results into domain types.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Nullable, Text, Timestamptz};

use crate::models::{AirportRef, AirportType, CountryRef, FlightSegment, RegionRef, SegmentChain};

use super::schema::{airports, countries, regions};

/// One leg of a chain row returned by the temporal-join SQL. Legs two and
/// three are null for shorter chains.
#[derive(Debug, QueryableByName)]
pub struct ChainRow {
    #[diesel(sql_type = Text)]
    pub callsign_1: String,
    #[diesel(sql_type = Text)]
    pub origin_1: String,
    #[diesel(sql_type = Text)]
    pub destination_1: String,
    #[diesel(sql_type = Timestamptz)]
    pub firstseen_1: DateTime<Utc>,
    #[diesel(sql_type = Timestamptz)]
    pub lastseen_1: DateTime<Utc>,

    #[diesel(sql_type = Nullable<Text>)]
    pub callsign_2: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub origin_2: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub destination_2: Option<String>,
    #[diesel(sql_type = Nullable<Timestamptz>)]
    pub firstseen_2: Option<DateTime<Utc>>,
    #[diesel(sql_type = Nullable<Timestamptz>)]
    pub lastseen_2: Option<DateTime<Utc>>,

    #[diesel(sql_type = Nullable<Text>)]
    pub callsign_3: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub origin_3: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub destination_3: Option<String>,
    #[diesel(sql_type = Nullable<Timestamptz>)]
    pub firstseen_3: Option<DateTime<Utc>>,
    #[diesel(sql_type = Nullable<Timestamptz>)]
    pub lastseen_3: Option<DateTime<Utc>>,
}

impl ChainRow {
    pub fn into_chain(self) -> SegmentChain {
        let first = FlightSegment {
            callsign: self.callsign_1,
            origin: self.origin_1,
            destination: self.destination_1,
            first_seen: self.firstseen_1,
            last_seen: self.lastseen_1,
        };

        let second = match (
            self.callsign_2,
            self.origin_2,
            self.destination_2,
            self.firstseen_2,
            self.lastseen_2,
        ) {
            (Some(callsign), Some(origin), Some(destination), Some(first_seen), Some(last_seen)) => {
                Some(FlightSegment {
                    callsign,
                    origin,
                    destination,
                    first_seen,
                    last_seen,
                })
            }
            _ => None,
        };

        let third = match (
            self.callsign_3,
            self.origin_3,
            self.destination_3,
            self.firstseen_3,
            self.lastseen_3,
        ) {
            (Some(callsign), Some(origin), Some(destination), Some(first_seen), Some(last_seen)) => {
                Some(FlightSegment {
                    callsign,
                    origin,
                    destination,
                    first_seen,
                    last_seen,
                })
            }
            _ => None,
        };

        SegmentChain {
            first,
            second,
            third,
        }
    }
}

/// Per-origin traffic counts row.
#[derive(Debug, QueryableByName)]
pub struct TrafficRow {
    #[diesel(sql_type = Text)]
    pub airport: String,
    #[diesel(sql_type = BigInt)]
    pub flight_count: i64,
    #[diesel(sql_type = BigInt)]
    pub airline_count: i64,
    #[diesel(sql_type = BigInt)]
    pub destination_count: i64,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = airports)]
pub struct AirportRow {
    pub airport_ident: Option<String>,
    pub airport_type: Option<String>,
    pub airport_name: Option<String>,
    pub airport_latitude_deg: Option<f64>,
    pub airport_longitude_deg: Option<f64>,
    pub airport_continent: Option<String>,
    pub airport_iso_country: Option<String>,
    pub airport_iso_region: Option<String>,
    pub airport_municipality: Option<String>,
    pub airport_scheduled_service: Option<String>,
    pub airport_iata_code: Option<String>,
}

impl AirportRow {
    /// Rows without an ident are unusable and skipped upstream.
    pub fn into_airport(self) -> Option<AirportRef> {
        let ident = self.airport_ident?;
        Some(AirportRef {
            ident,
            iata_code: self.airport_iata_code.filter(|c| !c.is_empty()),
            name: self.airport_name.unwrap_or_default(),
            airport_type: AirportType::from_raw(self.airport_type.as_deref().unwrap_or("")),
            latitude_deg: self.airport_latitude_deg.unwrap_or(0.0),
            longitude_deg: self.airport_longitude_deg.unwrap_or(0.0),
            continent: self.airport_continent.unwrap_or_default(),
            iso_country: self.airport_iso_country.unwrap_or_default(),
            iso_region: self.airport_iso_region.unwrap_or_default(),
            municipality: self.airport_municipality.filter(|m| !m.is_empty()),
            scheduled_service: self.airport_scheduled_service.as_deref() == Some("yes"),
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = countries)]
pub struct CountryRow {
    pub country_code: Option<String>,
    pub country_name: Option<String>,
    pub country_continent: Option<String>,
}

impl CountryRow {
    pub fn into_country(self) -> Option<CountryRef> {
        Some(CountryRef {
            code: self.country_code?,
            name: self.country_name.unwrap_or_default(),
            continent: self.country_continent.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = regions)]
pub struct RegionRow {
    pub region_code: Option<String>,
    pub region_name: Option<String>,
    pub region_iso_country: Option<String>,
}

impl RegionRow {
    pub fn into_region(self) -> Option<RegionRef> {
        Some(RegionRef {
            code: self.region_code?,
            name: self.region_name.unwrap_or_default(),
            iso_country: self.region_iso_country.unwrap_or_default(),
        })
    }
}
