/// wxwarn_service: severe-weather warning monitoring for registered sensors.
///
/// # Module structure
///
/// ```text
/// wxwarn_service
/// ├── model       — shared data types (Warning, Snapshot, Sensor, Severity, …)
/// ├── error       — error types for feed, geometry, directory, delivery, config
/// ├── config      — service configuration loader (wxwarn.toml + environment)
/// ├── logging     — tracing subscriber setup
/// ├── shutdown    — cooperative shutdown signal
/// ├── geo         — GeoJSON polygon conversion + point-in-polygon
/// ├── cache       — atomically replaced warning snapshot
/// ├── http        — outbound HTTP client and fetch seam
/// ├── ingest
/// │   ├── smhi    — SMHI IBWW warning feed: fetch + JSON parsing
/// │   └── fixtures (test only) — representative feed payloads
/// ├── daemon      — startup fetch and fixed-interval scheduler loop
/// ├── notify
/// │   └── webhook — webhook payload + delivery
/// ├── query       — warning filtering and pagination
/// ├── endpoint    — HTTP query API (tiny_http)
/// ├── directory   — sensor / subscriber directory traits + in-memory impl
/// ├── db          — PostgreSQL-backed directory
/// └── registry    — TOML sensor/webhook registry loader
/// ```

/// Public modules
pub mod cache;
pub mod config;
pub mod daemon;
pub mod db;
pub mod directory;
pub mod endpoint;
pub mod error;
pub mod geo;
pub mod http;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod notify;
pub mod query;
pub mod registry;
pub mod shutdown;
