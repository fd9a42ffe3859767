//! immo-api: read-only HTTP API over a French real-estate dataset
//!
//! Translates query parameters (city, year) into bound SQL statements
//! against a pre-populated SQLite file and serializes the rows to JSON.
//! Eleven read operations, no write path.

pub mod db;
pub mod http;
pub mod models;

pub use http::{build_router, run_server, ApiError, AppState, ServerConfig};
