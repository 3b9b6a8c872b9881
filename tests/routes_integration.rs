//! HTTP route integration tests using `tower::ServiceExt::oneshot`.

#![cfg(feature = "http-server")]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use tower::ServiceExt;

use skylens_rust::db::repositories::LocalRepository;
use skylens_rust::db::repository::FullRepository;
use skylens_rust::http::{create_router, AppState};
use skylens_rust::models::{AirportRef, AirportType, CountryRef, FlightSegment, RegionRef};

fn airport(ident: &str, iata: &str, name: &str, country: &str) -> AirportRef {
    AirportRef {
        ident: ident.to_string(),
        iata_code: Some(iata.to_string()),
        name: name.to_string(),
        airport_type: AirportType::LargeAirport,
        latitude_deg: 0.0,
        longitude_deg: 0.0,
        continent: "EU".to_string(),
        iso_country: country.to_string(),
        iso_region: format!("{}-01", country),
        municipality: Some(name.trim_end_matches(" Airport").to_string()),
        scheduled_service: true,
    }
}

fn segment(callsign: &str, origin: &str, dest: &str, day: u32, dep_h: u32, arr_h: u32) -> FlightSegment {
    FlightSegment {
        callsign: callsign.to_string(),
        origin: origin.to_string(),
        destination: dest.to_string(),
        first_seen: Utc.with_ymd_and_hms(2024, 3, day, dep_h, 0, 0).unwrap(),
        last_seen: Utc.with_ymd_and_hms(2024, 3, day, arr_h, 0, 0).unwrap(),
    }
}

fn seeded_state() -> AppState {
    let repo = LocalRepository::new();
    repo.insert_airport(airport("LSZH", "ZRH", "Zurich Airport", "CH"));
    repo.insert_airport(airport("LSGG", "GVA", "Geneva Airport", "CH"));
    repo.insert_airport(airport("EGLL", "LHR", "London Heathrow", "GB"));
    repo.insert_country(CountryRef {
        code: "CH".to_string(),
        name: "Switzerland".to_string(),
        continent: "EU".to_string(),
    });
    repo.insert_region(RegionRef {
        code: "CH-01".to_string(),
        name: "Zurich Region".to_string(),
        iso_country: "CH".to_string(),
    });
    repo.insert_segments(vec![
        segment("SWR100", "LSZH", "EGLL", 10, 7, 9),
        segment("SWR102", "LSZH", "EGLL", 10, 12, 14),
        segment("SWR110", "LSGG", "EGLL", 10, 9, 11),
        segment("SWR100", "LSZH", "EGLL", 3, 7, 9),
        segment("SWR110", "LSGG", "EGLL", 3, 9, 11),
    ]);
    AppState::new(Arc::new(repo) as Arc<dyn FullRepository>)
}

async fn get(uri: &str) -> (StatusCode, serde_json::Value) {
    let app = create_router(seeded_state());
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn health_reports_connected_repository() {
    let (status, json) = get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["database"], "connected");
}

#[tokio::test]
async fn origin_options_are_grouped() {
    let (status, json) = get("/v1/airports/options").await;
    assert_eq!(status, StatusCode::OK);
    let options = json["options"].as_array().unwrap();
    assert!(!options.is_empty());

    let values: Vec<&str> = options
        .iter()
        .map(|o| o["value"].as_str().unwrap())
        .collect();
    assert!(values.contains(&"cou#CH"));
    assert!(values.contains(&"air#ZRH"));
}

#[tokio::test]
async fn destination_options_are_airports_only() {
    let (status, json) = get("/v1/airports/options?kind=destination").await;
    assert_eq!(status, StatusCode::OK);
    let options = json["options"].as_array().unwrap();
    assert!(options
        .iter()
        .all(|o| o["value"].as_str().unwrap().starts_with("air#")));
}

#[tokio::test]
async fn flight_search_returns_itineraries() {
    let (status, json) =
        get("/v1/flights/search?from=air%23ZRH&to=air%23LHR&date=2024-03-10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 1); // best-per-route dedup collapses the pair
    let itinerary = &json["itineraries"][0];
    assert_eq!(itinerary["stop_count_str"], "Nonstop");
    assert_eq!(itinerary["leg1"]["airline_code"], "SWR");
}

#[tokio::test]
async fn flight_search_all_mode_keeps_duplicates() {
    let (status, json) =
        get("/v1/flights/search?from=air%23ZRH&to=air%23LHR&date=2024-03-10&mode=all").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 2);
}

#[tokio::test]
async fn flight_search_empty_selector_yields_empty_result() {
    let (status, json) =
        get("/v1/flights/search?from=cou%23FR&to=air%23LHR&date=2024-03-10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 0);
}

#[tokio::test]
async fn flight_search_rejects_malformed_selector() {
    let (status, json) =
        get("/v1/flights/search?from=bogus&to=air%23LHR&date=2024-03-10").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn compare_returns_two_aligned_tables() {
    let (status, json) = get(
        "/v1/airports/compare?from=cou%23CH&to=air%23LHR&start_date=2024-03-10&end_date=2024-03-10&period_days=7",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["preference"], "NA");
    let current = json["current"].as_array().unwrap();
    let previous = json["previous"].as_array().unwrap();
    assert_eq!(current.len(), 2);
    assert_eq!(previous.len(), 2);
    assert_eq!(current[0]["airport"], previous[0]["airport"]);
}

#[tokio::test]
async fn compare_with_thin_window_is_unprocessable() {
    // No traffic at all on Mar 17, so ranking has nothing to work with
    let (status, json) = get(
        "/v1/airports/compare?from=cou%23CH&to=air%23LHR&start_date=2024-03-17&end_date=2024-03-17",
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["code"], "NOT_ENOUGH_DATA");
}

#[tokio::test]
async fn compare_rejects_inverted_date_range() {
    let (status, json) = get(
        "/v1/airports/compare?from=cou%23CH&to=air%23LHR&start_date=2024-03-10&end_date=2024-03-01",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
}
