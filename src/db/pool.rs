//! Database connection pool management
//!
//! The dataset is a pre-populated SQLite file that this service never
//! writes, so connections are opened read-only. Each repository call runs
//! exactly one statement: the connection is acquired from the pool for that
//! statement and returned when the call completes, on success and failure
//! alike.

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

/// Default maximum connections for the pool.
/// Kept low for a single-dataset read-only service.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Open a read-only pool over the SQLite dataset.
///
/// # Errors
///
/// Returns an error if the file does not exist or cannot be opened.
pub async fn create_pool(path: &Path) -> Result<SqlitePool, sqlx::Error> {
    create_pool_with_options(path, DEFAULT_MAX_CONNECTIONS).await
}

/// Open a read-only pool with a custom connection limit.
pub async fn create_pool_with_options(
    path: &Path,
    max_connections: u32,
) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .read_only(true);

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}
