//! Postgres repository implementation using Diesel.
//!
//! Implements the repository traits against the flight warehouse schema.
//! Chain queries are expressed as raw SQL self-joins so the temporal
//! predicates run inside the database instead of materialising the flight
//! table in memory.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel::sql_types::{Array, Float8, Text, Timestamptz};
use log::debug;
use std::time::Duration;
use tokio::task;

use crate::api::TrafficSummary;
use crate::db::repository::{
    ErrorContext, FlightRepository, ReferenceRepository, RepositoryError, RepositoryResult,
    SECOND_LEG_BOUND_DAYS, THIRD_LEG_BOUND_DAYS,
};
use crate::models::{
    AirportRef, AirportSelector, CountryRef, RegionRef, SegmentChain, TimeWindow,
};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let max_pool_size = std::env::var("PG_POOL_MAX")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);

        let min_pool_size = std::env::var("PG_POOL_MIN")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(1);

        let connection_timeout_sec = std::env::var("PG_CONN_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let idle_timeout_sec = std::env::var("PG_IDLE_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(600);

        let max_retries = std::env::var("PG_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(3);

        let retry_delay_ms = std::env::var("PG_RETRY_DELAY_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(100);

        Ok(Self {
            database_url,
            max_pool_size,
            min_pool_size,
            connection_timeout_sec,
            idle_timeout_sec,
            max_retries,
            retry_delay_ms,
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Diesel-backed repository for Postgres.
#[derive(Clone)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
}

impl PostgresRepository {
    /// Create a new repository with a validated connection pool.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::query_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size))
                        .retryable(),
                )
            })?;

        Ok(Self { pool, config })
    }

    /// Execute a database operation with automatic retry for transient
    /// failures (connection errors, serialization failures).
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    debug!(
                        "Retrying database operation after transient failure (attempt {}/{})",
                        attempt + 1,
                        max_retries + 1
                    );
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2;
                }

                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::ConnectionError {
                            message: e.to_string(),
                            context: ErrorContext::new("get_connection")
                                .with_details(format!("attempt={}", attempt + 1))
                                .retryable(),
                        };
                        if attempt < max_retries {
                            last_error = Some(err);
                            continue;
                        }
                        return Err(err);
                    }
                };

                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => return Err(e),
                }
            }

            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal(format!("Task join error: {}", e))
                .with_operation("spawn_blocking")
        })?
    }
}

fn map_diesel_error(err: diesel::result::Error) -> RepositoryError {
    RepositoryError::from(err)
}

/// Columns shared by all three chain queries; legs 2 and 3 are padded with
/// typed nulls where the chain is shorter.
const LEG1_COLUMNS: &str = "\
    f1.callsign AS callsign_1, f1.origin AS origin_1, f1.destination AS destination_1, \
    f1.firstseen AS firstseen_1, f1.lastseen AS lastseen_1";

const NULL_LEG2: &str = "\
    NULL::varchar AS callsign_2, NULL::varchar AS origin_2, NULL::varchar AS destination_2, \
    NULL::timestamptz AS firstseen_2, NULL::timestamptz AS lastseen_2";

const LEG2_COLUMNS: &str = "\
    f2.callsign AS callsign_2, f2.origin AS origin_2, f2.destination AS destination_2, \
    f2.firstseen AS firstseen_2, f2.lastseen AS lastseen_2";

const NULL_LEG3: &str = "\
    NULL::varchar AS callsign_3, NULL::varchar AS origin_3, NULL::varchar AS destination_3, \
    NULL::timestamptz AS firstseen_3, NULL::timestamptz AS lastseen_3";

const LEG3_COLUMNS: &str = "\
    f3.callsign AS callsign_3, f3.origin AS origin_3, f3.destination AS destination_3, \
    f3.firstseen AS firstseen_3, f3.lastseen AS lastseen_3";

const SEGMENT_GUARD: &str = "\
    callsign IS NOT NULL AND origin IS NOT NULL AND destination IS NOT NULL \
    AND firstseen IS NOT NULL AND lastseen IS NOT NULL";

fn nonstop_sql() -> String {
    format!(
        "SELECT {LEG1_COLUMNS}, {NULL_LEG2}, {NULL_LEG3} \
         FROM flights f1 \
         WHERE f1.origin = ANY($1) AND f1.destination = ANY($2) \
           AND f1.firstseen BETWEEN $3 AND $4 \
           AND {SEGMENT_GUARD}"
    )
}

fn one_stop_sql() -> String {
    format!(
        "SELECT {LEG1_COLUMNS}, {LEG2_COLUMNS}, {NULL_LEG3} \
         FROM flights f1 \
         JOIN flights f2 ON f2.origin = f1.destination \
         WHERE f1.origin = ANY($1) \
           AND f1.firstseen BETWEEN $3 AND $4 \
           AND f2.destination = ANY($2) \
           AND f2.firstseen BETWEEN $3 AND $5 \
           AND f2.firstseen >= f1.lastseen + INTERVAL '1 hour' \
           AND f2.firstseen <= f1.lastseen + make_interval(secs => $6) \
           AND f1.callsign IS NOT NULL AND f1.destination IS NOT NULL \
           AND f1.lastseen IS NOT NULL \
           AND f2.callsign IS NOT NULL AND f2.lastseen IS NOT NULL"
    )
}

fn two_stop_sql() -> String {
    format!(
        "SELECT {LEG1_COLUMNS}, {LEG2_COLUMNS}, {LEG3_COLUMNS} \
         FROM flights f1 \
         JOIN flights f2 ON f2.origin = f1.destination \
         JOIN flights f3 ON f3.origin = f2.destination \
         WHERE f1.origin = ANY($1) \
           AND f1.firstseen BETWEEN $3 AND $4 \
           AND f2.firstseen BETWEEN $3 AND $5 \
           AND f2.firstseen >= f1.lastseen + INTERVAL '1 hour' \
           AND f2.firstseen <= f1.lastseen + make_interval(secs => $7) \
           AND f3.destination = ANY($2) \
           AND f3.firstseen BETWEEN $3 AND $6 \
           AND f3.firstseen >= f2.lastseen + INTERVAL '1 hour' \
           AND f3.firstseen <= f2.lastseen + make_interval(secs => $7) \
           AND f1.callsign IS NOT NULL AND f1.destination IS NOT NULL \
           AND f1.lastseen IS NOT NULL \
           AND f2.callsign IS NOT NULL AND f2.lastseen IS NOT NULL \
           AND f3.callsign IS NOT NULL AND f3.lastseen IS NOT NULL"
    )
}

const TRAFFIC_SQL: &str = "\
    SELECT origin AS airport, \
           COUNT(*) AS flight_count, \
           COUNT(DISTINCT substring(callsign FROM 1 FOR 3)) AS airline_count, \
           COUNT(DISTINCT destination) AS destination_count \
    FROM flights \
    WHERE origin = ANY($1) \
      AND firstseen BETWEEN $2 AND $3 \
      AND callsign IS NOT NULL AND destination IS NOT NULL \
    GROUP BY origin \
    ORDER BY origin";

#[async_trait]
impl FlightRepository for PostgresRepository {
    async fn query_segment_chains(
        &self,
        origins: &[String],
        destinations: &[String],
        window: TimeWindow,
        stops: u8,
        max_layover_hours: f64,
    ) -> RepositoryResult<Vec<SegmentChain>> {
        let origins = origins.to_vec();
        let destinations = destinations.to_vec();
        let second_bound: DateTime<Utc> = window.start + ChronoDuration::days(SECOND_LEG_BOUND_DAYS);
        let third_bound: DateTime<Utc> = window.start + ChronoDuration::days(THIRD_LEG_BOUND_DAYS);
        let layover_ceiling_s = max_layover_hours * 3600.0;
        let (window_start, window_end) = (window.start, window.end);

        self.with_conn(move |conn| {
            let rows: Vec<ChainRow> = match stops {
                0 => sql_query(nonstop_sql())
                    .bind::<Array<Text>, _>(&origins)
                    .bind::<Array<Text>, _>(&destinations)
                    .bind::<Timestamptz, _>(window_start)
                    .bind::<Timestamptz, _>(window_end)
                    .load(conn)
                    .map_err(map_diesel_error)?,
                1 => sql_query(one_stop_sql())
                    .bind::<Array<Text>, _>(&origins)
                    .bind::<Array<Text>, _>(&destinations)
                    .bind::<Timestamptz, _>(window_start)
                    .bind::<Timestamptz, _>(window_end)
                    .bind::<Timestamptz, _>(second_bound)
                    .bind::<Float8, _>(layover_ceiling_s)
                    .load(conn)
                    .map_err(map_diesel_error)?,
                2 => sql_query(two_stop_sql())
                    .bind::<Array<Text>, _>(&origins)
                    .bind::<Array<Text>, _>(&destinations)
                    .bind::<Timestamptz, _>(window_start)
                    .bind::<Timestamptz, _>(window_end)
                    .bind::<Timestamptz, _>(second_bound)
                    .bind::<Timestamptz, _>(third_bound)
                    .bind::<Float8, _>(layover_ceiling_s)
                    .load(conn)
                    .map_err(map_diesel_error)?,
                other => {
                    return Err(RepositoryError::validation(format!(
                        "Unsupported join depth: {}",
                        other
                    )));
                }
            };

            Ok(rows.into_iter().map(ChainRow::into_chain).collect())
        })
        .await
        .map_err(|e| e.with_operation("query_segment_chains"))
    }

    async fn query_traffic(
        &self,
        origins: &[String],
        window: TimeWindow,
    ) -> RepositoryResult<Vec<TrafficSummary>> {
        let origins = origins.to_vec();
        let (window_start, window_end) = (window.start, window.end);

        self.with_conn(move |conn| {
            let rows: Vec<TrafficRow> = sql_query(TRAFFIC_SQL)
                .bind::<Array<Text>, _>(&origins)
                .bind::<Timestamptz, _>(window_start)
                .bind::<Timestamptz, _>(window_end)
                .load(conn)
                .map_err(map_diesel_error)?;

            Ok(rows
                .into_iter()
                .map(|row| TrafficSummary {
                    airport: row.airport,
                    flight_count: row.flight_count,
                    airline_count: row.airline_count,
                    destination_count: row.destination_count,
                })
                .collect())
        })
        .await
        .map_err(|e| e.with_operation("query_traffic"))
    }
}

#[async_trait]
impl ReferenceRepository for PostgresRepository {
    async fn resolve_airport_idents(
        &self,
        selector: &AirportSelector,
    ) -> RepositoryResult<Vec<String>> {
        let selector = selector.clone();
        self.with_conn(move |conn| {
            let mut query = airports::table
                .filter(
                    airports::airport_type
                        .eq("large_airport")
                        .or(airports::airport_type.eq("medium_airport")),
                )
                .filter(airports::airport_scheduled_service.eq("yes"))
                .into_boxed();

            query = match &selector {
                AirportSelector::Continent(code) => {
                    query.filter(airports::airport_continent.eq(code.clone()))
                }
                AirportSelector::Country(code) => {
                    query.filter(airports::airport_iso_country.eq(code.clone()))
                }
                AirportSelector::Region(code) => {
                    query.filter(airports::airport_iso_region.eq(code.clone()))
                }
                AirportSelector::Municipality {
                    iso_country,
                    iso_region,
                    municipality,
                } => query
                    .filter(airports::airport_iso_country.eq(iso_country.clone()))
                    .filter(airports::airport_iso_region.eq(iso_region.clone()))
                    .filter(airports::airport_municipality.eq(municipality.clone())),
                AirportSelector::Airport(iata) => {
                    query.filter(airports::airport_iata_code.eq(iata.clone()))
                }
            };

            let idents: Vec<Option<String>> = query
                .select(airports::airport_ident)
                .order(airports::airport_ident.asc())
                .load(conn)
                .map_err(map_diesel_error)?;

            Ok(idents.into_iter().flatten().collect())
        })
        .await
        .map_err(|e| e.with_operation("resolve_airport_idents"))
    }

    async fn resolve_airports(&self, idents: &[String]) -> RepositoryResult<Vec<AirportRef>> {
        let idents = idents.to_vec();
        self.with_conn(move |conn| {
            let rows: Vec<AirportRow> = airports::table
                .filter(airports::airport_ident.eq_any(&idents))
                .select(AirportRow::as_select())
                .order(airports::airport_ident.asc())
                .load(conn)
                .map_err(map_diesel_error)?;

            Ok(rows.into_iter().filter_map(AirportRow::into_airport).collect())
        })
        .await
        .map_err(|e| e.with_operation("resolve_airports"))
    }

    async fn list_selectable_airports(&self) -> RepositoryResult<Vec<AirportRef>> {
        self.with_conn(move |conn| {
            let rows: Vec<AirportRow> = airports::table
                .filter(
                    airports::airport_type
                        .eq("large_airport")
                        .or(airports::airport_type.eq("medium_airport")),
                )
                .filter(airports::airport_scheduled_service.eq("yes"))
                .select(AirportRow::as_select())
                .order(airports::airport_ident.asc())
                .load(conn)
                .map_err(map_diesel_error)?;

            Ok(rows.into_iter().filter_map(AirportRow::into_airport).collect())
        })
        .await
        .map_err(|e| e.with_operation("list_selectable_airports"))
    }

    async fn resolve_countries(&self) -> RepositoryResult<Vec<CountryRef>> {
        self.with_conn(move |conn| {
            let rows: Vec<CountryRow> = countries::table
                .select(CountryRow::as_select())
                .order(countries::country_name.asc())
                .load(conn)
                .map_err(map_diesel_error)?;

            Ok(rows.into_iter().filter_map(CountryRow::into_country).collect())
        })
        .await
        .map_err(|e| e.with_operation("resolve_countries"))
    }

    async fn resolve_regions(&self) -> RepositoryResult<Vec<RegionRef>> {
        self.with_conn(move |conn| {
            let rows: Vec<RegionRow> = regions::table
                .select(RegionRow::as_select())
                .order(regions::region_name.asc())
                .load(conn)
                .map_err(map_diesel_error)?;

            Ok(rows.into_iter().filter_map(RegionRow::into_region).collect())
        })
        .await
        .map_err(|e| e.with_operation("resolve_regions"))
    }

    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(map_diesel_error)
        })
        .await
    }
}
