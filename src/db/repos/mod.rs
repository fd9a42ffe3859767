//! Repository implementations for dataset access
//!
//! Each repository method builds one bound SQL statement and executes it.
//! User-supplied values are always bound as parameters, never interpolated
//! into the statement text. City columns are compared on their lowercased
//! form against pre-normalized input (see `models::CityName`).

pub mod fiscal;
pub mod transactions;

pub use fiscal::FiscalRepo;
pub use transactions::{CityCount, CityPrice, DepartmentCount, RoomCount, TransactionRepo};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("no matching rows")]
    NotFound,
}

#[cfg(test)]
pub(crate) mod tests {
    use std::str::FromStr;

    use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

    /// Schema mirroring the production dataset, for in-memory fixtures.
    pub const DATASET_SCHEMA: &str = r#"
        CREATE TABLE foyers_fiscaux (
            ville TEXT,
            date INTEGER,
            revenu_fiscal_moyen REAL
        );
        CREATE TABLE transactions_sample (
            id_transaction TEXT,
            date_transaction TEXT,
            prix REAL,
            departement TEXT,
            ville TEXT,
            type_batiment TEXT,
            n_pieces INTEGER,
            surface_habitable REAL
        );
    "#;

    /// Single-connection in-memory pool with the dataset schema applied.
    pub async fn memory_pool() -> SqlitePool {
        let options = SqliteConnectOptions::from_str("sqlite::memory:").expect("options");
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .expect("in-memory pool");
        sqlx::raw_sql(DATASET_SCHEMA)
            .execute(&pool)
            .await
            .expect("schema");
        pool
    }
}
