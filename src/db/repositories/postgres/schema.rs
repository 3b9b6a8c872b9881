//! Diesel table definitions for the flight warehouse.
//!
//! Column names mirror the ETL output tables. Only the columns the
//! repository reads are declared.

use diesel::table;

table! {
    flights (flight_id) {
        flight_id -> Int4,
        callsign -> Nullable<Varchar>,
        origin -> Nullable<Varchar>,
        destination -> Nullable<Varchar>,
        firstseen -> Nullable<Timestamptz>,
        lastseen -> Nullable<Timestamptz>,
    }
}

table! {
    airports (airport_id) {
        airport_id -> Int4,
        airport_ident -> Nullable<Varchar>,
        airport_type -> Nullable<Varchar>,
        airport_name -> Nullable<Varchar>,
        airport_latitude_deg -> Nullable<Float8>,
        airport_longitude_deg -> Nullable<Float8>,
        airport_continent -> Nullable<Varchar>,
        airport_iso_country -> Nullable<Varchar>,
        airport_iso_region -> Nullable<Varchar>,
        airport_municipality -> Nullable<Varchar>,
        airport_scheduled_service -> Nullable<Varchar>,
        airport_iata_code -> Nullable<Varchar>,
    }
}

table! {
    countries (country_id) {
        country_id -> Int4,
        country_code -> Nullable<Varchar>,
        country_name -> Nullable<Varchar>,
        country_continent -> Nullable<Varchar>,
    }
}

table! {
    regions (region_id) {
        region_id -> Int4,
        region_code -> Nullable<Varchar>,
        region_name -> Nullable<Varchar>,
        region_iso_country -> Nullable<Varchar>,
    }
}
