//! # SkyLens Rust Backend
//!
//! Flight-search and airport-ranking engine.
//!
//! This crate provides the backend for the SkyLens dashboard: it chains
//! recorded point-to-point flight segments into 0/1/2-stop itineraries under
//! timing constraints, and ranks origin airports by normalized, weighted
//! performance indicators (KPIs). The backend exposes a REST API via Axum
//! for the web frontend.
//!
//! ## Features
//!
//! - **Itinerary construction**: temporal self-joins over flight segments,
//!   connection and layover constraints, best-per-route deduplication
//! - **Airport KPIs**: traffic aggregates (GAP), route-specific aggregates
//!   (ODP), quantile normalization and preference weighting
//! - **Two-period comparison**: the same pipeline run for a selected and a
//!   previous period, aligned for display
//! - **HTTP API**: RESTful endpoints for frontend integration
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: Data Transfer Objects (DTOs) for API responses
//! - [`models`]: Domain records, time windows, airport selectors
//! - [`db`]: Repository pattern and storage backends
//! - [`services`]: Itinerary builder, KPI aggregation, weighting
//! - [`http`]: Axum-based HTTP server and request handlers

pub mod api;

pub mod db;
pub mod models;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
