//! Fiscal household repository
//!
//! Point lookups against `foyers_fiscaux`. One row is expected per
//! (ville, date) pair; the lookup treats the pair as a key.

use sqlx::SqlitePool;

use super::DbError;
use crate::models::CityName;

/// Fiscal household repository
pub struct FiscalRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FiscalRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Average fiscal income for a city and year.
    ///
    /// Returns `DbError::NotFound` when no row matches the pair.
    pub async fn average_income(&self, city: &CityName, year: i64) -> Result<f64, DbError> {
        let row: Option<(f64,)> = sqlx::query_as(
            "SELECT revenu_fiscal_moyen FROM foyers_fiscaux WHERE date = ? AND LOWER(ville) = ?",
        )
        .bind(year)
        .bind(city.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| r.0).ok_or(DbError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repos::tests::memory_pool;

    #[tokio::test]
    async fn finds_income_case_insensitively() {
        let pool = memory_pool().await;
        sqlx::query("INSERT INTO foyers_fiscaux VALUES ('Montpellier', 2020, 31500.0)")
            .execute(&pool)
            .await
            .unwrap();

        let repo = FiscalRepo::new(&pool);
        let city = CityName::new(" MONTPELLIER ").unwrap();
        let income = repo.average_income(&city, 2020).await.unwrap();
        assert_eq!(income, 31500.0);
    }

    #[tokio::test]
    async fn absent_pair_is_not_found() {
        let pool = memory_pool().await;
        let repo = FiscalRepo::new(&pool);
        let city = CityName::new("Lille").unwrap();
        let err = repo.average_income(&city, 1999).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound));
    }
}
