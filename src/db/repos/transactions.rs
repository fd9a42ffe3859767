//! Transaction repository
//!
//! All reads over `transactions_sample`: per-city lookups, counts,
//! department and city rankings, and price-per-m² aggregates. Year
//! filtering relies on `date_transaction` starting with a 4-digit year,
//! so it binds a `LIKE` prefix instead of comparing date ranges.

use sqlx::{FromRow, SqlitePool};

use super::DbError;
use crate::models::CityName;

/// How many rows the ranking and latest-transaction queries return.
const TOP_LIMIT: i64 = 10;

/// Building type values as stored in the dataset.
const APARTMENT: &str = "appartement";
const HOUSE: &str = "maison";
const STUDIO: &str = "studio";

/// Join constants for the wealthy-city apartment sales count: apartment
/// sales in 2022, restricted to cities whose average fiscal income exceeds
/// the floor.
const WEALTHY_SALES_YEAR: i64 = 2022;
const WEALTHY_INCOME_FLOOR: f64 = 70_000.0;

/// Apartment count for one room-count bucket
#[derive(Debug, Clone, FromRow)]
pub struct RoomCount {
    pub rooms: i64,
    pub count: i64,
}

/// Transaction count for one department
#[derive(Debug, Clone, FromRow)]
pub struct DepartmentCount {
    pub department: String,
    pub count: i64,
}

/// Transaction count for one city
#[derive(Debug, Clone, FromRow)]
pub struct CityCount {
    pub city: String,
    pub count: i64,
}

/// Average price per m² for one city, grouped on the normalized name
#[derive(Debug, Clone, FromRow)]
pub struct CityPrice {
    pub city: String,
    pub avg_price: f64,
}

/// Transaction repository
pub struct TransactionRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> TransactionRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Ids of the 10 most recent transactions in a city, newest first.
    ///
    /// `id_transaction` is the tie-break so equal-date rows order
    /// deterministically. Returns `NotFound` when the city has no
    /// transactions at all.
    pub async fn latest_ids(&self, city: &CityName) -> Result<Vec<String>, DbError> {
        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT id_transaction FROM transactions_sample \
             WHERE LOWER(ville) = ? \
             ORDER BY date_transaction DESC, id_transaction DESC \
             LIMIT ?",
        )
        .bind(city.as_str())
        .bind(TOP_LIMIT)
        .fetch_all(self.pool)
        .await?;

        if ids.is_empty() {
            return Err(DbError::NotFound);
        }
        Ok(ids)
    }

    /// Number of acquisitions in a city for a year. Zero is a valid answer.
    pub async fn acquisition_count(&self, city: &CityName, year: i64) -> Result<i64, DbError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(id_transaction) FROM transactions_sample \
             WHERE LOWER(ville) = ? AND date_transaction LIKE ?",
        )
        .bind(city.as_str())
        .bind(year_prefix(year))
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// Apartments sold in a city during a year, bucketed by room count.
    pub async fn room_distribution(
        &self,
        city: &CityName,
        year: i64,
    ) -> Result<Vec<RoomCount>, DbError> {
        let rows: Vec<RoomCount> = sqlx::query_as(
            "SELECT n_pieces AS rooms, COUNT(*) AS count FROM transactions_sample \
             WHERE LOWER(ville) = ? AND date_transaction LIKE ? AND LOWER(type_batiment) = ? \
             GROUP BY n_pieces",
        )
        .bind(city.as_str())
        .bind(year_prefix(year))
        .bind(APARTMENT)
        .fetch_all(self.pool)
        .await?;

        if rows.is_empty() {
            return Err(DbError::NotFound);
        }
        Ok(rows)
    }

    /// Number of studio acquisitions in a city for a year.
    pub async fn studio_count(&self, city: &CityName, year: i64) -> Result<i64, DbError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM transactions_sample \
             WHERE LOWER(ville) = ? AND date_transaction LIKE ? AND LOWER(type_batiment) = ?",
        )
        .bind(city.as_str())
        .bind(year_prefix(year))
        .bind(STUDIO)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// Average price per m² for houses sold in a year, optionally
    /// restricted to one city. Without a city the aggregate spans the
    /// whole dataset for that year.
    ///
    /// Rows with a non-positive living area are excluded from the average.
    /// A null aggregate (no qualifying sale) maps to `NotFound`.
    pub async fn house_price_per_m2(
        &self,
        city: Option<&CityName>,
        year: i64,
    ) -> Result<f64, DbError> {
        let avg: Option<f64> = match city {
            Some(city) => {
                sqlx::query_scalar(
                    "SELECT AVG(prix / surface_habitable) FROM transactions_sample \
                     WHERE LOWER(ville) = ? AND date_transaction LIKE ? \
                       AND LOWER(type_batiment) = ? AND surface_habitable > 0",
                )
                .bind(city.as_str())
                .bind(year_prefix(year))
                .bind(HOUSE)
                .fetch_one(self.pool)
                .await?
            }
            None => {
                sqlx::query_scalar(
                    "SELECT AVG(prix / surface_habitable) FROM transactions_sample \
                     WHERE date_transaction LIKE ? \
                       AND LOWER(type_batiment) = ? AND surface_habitable > 0",
                )
                .bind(year_prefix(year))
                .bind(HOUSE)
                .fetch_one(self.pool)
                .await?
            }
        };

        avg.ok_or(DbError::NotFound)
    }

    /// Transaction counts per department, busiest first.
    pub async fn count_by_department(&self) -> Result<Vec<DepartmentCount>, DbError> {
        let rows: Vec<DepartmentCount> = sqlx::query_as(
            "SELECT departement AS department, COUNT(*) AS count FROM transactions_sample \
             GROUP BY departement \
             ORDER BY count DESC",
        )
        .fetch_all(self.pool)
        .await?;

        if rows.is_empty() {
            return Err(DbError::NotFound);
        }
        Ok(rows)
    }

    /// The 10 cities with the most transactions.
    pub async fn top_cities_by_volume(&self) -> Result<Vec<CityCount>, DbError> {
        let rows: Vec<CityCount> = sqlx::query_as(
            "SELECT ville AS city, COUNT(*) AS count FROM transactions_sample \
             GROUP BY ville \
             ORDER BY count DESC \
             LIMIT ?",
        )
        .bind(TOP_LIMIT)
        .fetch_all(self.pool)
        .await?;

        if rows.is_empty() {
            return Err(DbError::NotFound);
        }
        Ok(rows)
    }

    /// Apartment sales in 2022 across every city whose average fiscal
    /// income exceeds 70k. The join matches city names case-insensitively
    /// on both sides. Zero is a valid answer.
    pub async fn apartment_sales_in_wealthy_cities(&self) -> Result<i64, DbError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM transactions_sample t \
             JOIN foyers_fiscaux f ON LOWER(t.ville) = LOWER(f.ville) \
             WHERE LOWER(t.type_batiment) = ? \
               AND t.date_transaction LIKE ? \
               AND f.revenu_fiscal_moyen > ?",
        )
        .bind(APARTMENT)
        .bind(year_prefix(WEALTHY_SALES_YEAR))
        .bind(WEALTHY_INCOME_FLOOR)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// The 10 cities with the lowest average apartment price per m².
    pub async fn cheapest_cities_by_m2(&self) -> Result<Vec<CityPrice>, DbError> {
        self.cities_ranked_by_m2(APARTMENT, "ASC").await
    }

    /// The 10 cities with the highest average house price per m².
    pub async fn most_expensive_cities_by_m2(&self) -> Result<Vec<CityPrice>, DbError> {
        self.cities_ranked_by_m2(HOUSE, "DESC").await
    }

    /// Rank cities by average price per m² for one building type.
    ///
    /// Groups on the trimmed, lowercased city name so casing variants of
    /// the same city fold into one bucket. `direction` is one of the two
    /// static keywords above, never user input.
    async fn cities_ranked_by_m2(
        &self,
        building_type: &str,
        direction: &str,
    ) -> Result<Vec<CityPrice>, DbError> {
        let sql = format!(
            "SELECT TRIM(LOWER(ville)) AS city, AVG(prix / surface_habitable) AS avg_price \
             FROM transactions_sample \
             WHERE LOWER(type_batiment) = ? AND surface_habitable > 0 \
             GROUP BY city \
             ORDER BY avg_price {direction} \
             LIMIT ?"
        );

        let rows: Vec<CityPrice> = sqlx::query_as(&sql)
            .bind(building_type)
            .bind(TOP_LIMIT)
            .fetch_all(self.pool)
            .await?;

        if rows.is_empty() {
            return Err(DbError::NotFound);
        }
        Ok(rows)
    }
}

fn year_prefix(year: i64) -> String {
    format!("{year}%")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repos::tests::memory_pool;

    async fn insert_transaction(
        pool: &SqlitePool,
        id: &str,
        city: &str,
        department: &str,
        date: &str,
        building_type: &str,
        rooms: i64,
        price: f64,
        area: f64,
    ) {
        sqlx::query(
            "INSERT INTO transactions_sample \
             (id_transaction, date_transaction, prix, departement, ville, type_batiment, n_pieces, surface_habitable) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(date)
        .bind(price)
        .bind(department)
        .bind(city)
        .bind(building_type)
        .bind(rooms)
        .bind(area)
        .execute(pool)
        .await
        .expect("insert transaction");
    }

    #[tokio::test]
    async fn latest_ids_caps_at_ten_newest_first() {
        let pool = memory_pool().await;
        for i in 0..12 {
            let id = format!("T{i:02}");
            let date = format!("2022-01-{:02}", i + 1);
            insert_transaction(&pool, &id, "Lyon", "69", &date, APARTMENT, 2, 150_000.0, 40.0)
                .await;
        }

        let repo = TransactionRepo::new(&pool);
        let city = CityName::new("LYON").unwrap();
        let ids = repo.latest_ids(&city).await.unwrap();

        assert_eq!(ids.len(), 10);
        assert_eq!(ids.first().unwrap(), "T11");
        assert_eq!(ids.last().unwrap(), "T02");
    }

    #[tokio::test]
    async fn latest_ids_breaks_date_ties_by_id() {
        let pool = memory_pool().await;
        insert_transaction(&pool, "A", "Lyon", "69", "2022-01-01", HOUSE, 4, 1.0, 1.0).await;
        insert_transaction(&pool, "B", "Lyon", "69", "2022-01-01", HOUSE, 4, 1.0, 1.0).await;

        let repo = TransactionRepo::new(&pool);
        let city = CityName::new("Lyon").unwrap();
        let ids = repo.latest_ids(&city).await.unwrap();
        assert_eq!(ids, vec!["B".to_string(), "A".to_string()]);
    }

    #[tokio::test]
    async fn unknown_city_has_no_latest_ids() {
        let pool = memory_pool().await;
        let repo = TransactionRepo::new(&pool);
        let city = CityName::new("Nulle-Part").unwrap();
        assert!(matches!(
            repo.latest_ids(&city).await.unwrap_err(),
            DbError::NotFound
        ));
    }

    #[tokio::test]
    async fn acquisition_count_filters_by_year_prefix() {
        let pool = memory_pool().await;
        insert_transaction(&pool, "T1", "Paris", "75", "2022-03-10", APARTMENT, 3, 1.0, 1.0).await;
        insert_transaction(&pool, "T2", "Paris", "75", "2022-11-02", HOUSE, 5, 1.0, 1.0).await;
        insert_transaction(&pool, "T3", "Paris", "75", "2021-06-30", APARTMENT, 2, 1.0, 1.0).await;

        let repo = TransactionRepo::new(&pool);
        let city = CityName::new("paris").unwrap();
        assert_eq!(repo.acquisition_count(&city, 2022).await.unwrap(), 2);
        assert_eq!(repo.acquisition_count(&city, 2020).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn room_distribution_counts_sum_to_apartment_total() {
        let pool = memory_pool().await;
        insert_transaction(&pool, "T1", "Marseille", "13", "2022-01-01", APARTMENT, 1, 1.0, 1.0)
            .await;
        insert_transaction(&pool, "T2", "Marseille", "13", "2022-02-01", APARTMENT, 2, 1.0, 1.0)
            .await;
        insert_transaction(&pool, "T3", "Marseille", "13", "2022-03-01", APARTMENT, 2, 1.0, 1.0)
            .await;
        // Other building types and years stay out of the distribution
        insert_transaction(&pool, "T4", "Marseille", "13", "2022-04-01", HOUSE, 4, 1.0, 1.0).await;
        insert_transaction(&pool, "T5", "Marseille", "13", "2021-01-01", APARTMENT, 1, 1.0, 1.0)
            .await;

        let repo = TransactionRepo::new(&pool);
        let city = CityName::new("Marseille").unwrap();
        let rows = repo.room_distribution(&city, 2022).await.unwrap();

        let total: i64 = rows.iter().map(|r| r.count).sum();
        assert_eq!(total, 3);
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn studio_count_zero_is_not_an_error() {
        let pool = memory_pool().await;
        insert_transaction(&pool, "T1", "Rennes", "35", "2022-01-01", APARTMENT, 2, 1.0, 1.0)
            .await;

        let repo = TransactionRepo::new(&pool);
        let city = CityName::new("Rennes").unwrap();
        assert_eq!(repo.studio_count(&city, 2022).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn house_price_per_m2_averages_ratio() {
        let pool = memory_pool().await;
        insert_transaction(&pool, "T1", "Lyon", "69", "2022-05-01", HOUSE, 5, 200_000.0, 100.0)
            .await;
        insert_transaction(&pool, "T2", "Lyon", "69", "2022-06-01", HOUSE, 4, 300_000.0, 100.0)
            .await;

        let repo = TransactionRepo::new(&pool);
        let city = CityName::new("Lyon").unwrap();
        let avg = repo.house_price_per_m2(Some(&city), 2022).await.unwrap();
        assert_eq!(avg, 2500.0);
    }

    #[tokio::test]
    async fn house_price_per_m2_skips_zero_area_rows() {
        let pool = memory_pool().await;
        insert_transaction(&pool, "T1", "Lyon", "69", "2022-05-01", HOUSE, 5, 200_000.0, 100.0)
            .await;
        insert_transaction(&pool, "T2", "Lyon", "69", "2022-06-01", HOUSE, 4, 300_000.0, 0.0)
            .await;

        let repo = TransactionRepo::new(&pool);
        let city = CityName::new("Lyon").unwrap();
        let avg = repo.house_price_per_m2(Some(&city), 2022).await.unwrap();
        assert_eq!(avg, 2000.0);
    }

    #[tokio::test]
    async fn house_price_per_m2_without_city_spans_dataset() {
        let pool = memory_pool().await;
        insert_transaction(&pool, "T1", "Lyon", "69", "2022-05-01", HOUSE, 5, 200_000.0, 100.0)
            .await;
        insert_transaction(&pool, "T2", "Avignon", "84", "2022-06-01", HOUSE, 4, 100_000.0, 100.0)
            .await;

        let repo = TransactionRepo::new(&pool);
        let avg = repo.house_price_per_m2(None, 2022).await.unwrap();
        assert_eq!(avg, 1500.0);
    }

    #[tokio::test]
    async fn house_price_per_m2_null_aggregate_is_not_found() {
        let pool = memory_pool().await;
        let repo = TransactionRepo::new(&pool);
        let city = CityName::new("Lyon").unwrap();
        assert!(matches!(
            repo.house_price_per_m2(Some(&city), 2022).await.unwrap_err(),
            DbError::NotFound
        ));
    }

    #[tokio::test]
    async fn departments_ranked_by_volume() {
        let pool = memory_pool().await;
        insert_transaction(&pool, "T1", "Lyon", "69", "2022-01-01", HOUSE, 4, 1.0, 1.0).await;
        insert_transaction(&pool, "T2", "Villeurbanne", "69", "2022-01-02", HOUSE, 4, 1.0, 1.0)
            .await;
        insert_transaction(&pool, "T3", "Paris", "75", "2022-01-03", APARTMENT, 2, 1.0, 1.0)
            .await;

        let repo = TransactionRepo::new(&pool);
        let rows = repo.count_by_department().await.unwrap();
        assert_eq!(rows[0].department, "69");
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[1].department, "75");
    }

    #[tokio::test]
    async fn wealthy_city_sales_counts_qualifying_rows() {
        let pool = memory_pool().await;
        sqlx::query("INSERT INTO foyers_fiscaux VALUES ('Neuilly-sur-Seine', 2018, 95000.0)")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO foyers_fiscaux VALUES ('Roubaix', 2018, 15000.0)")
            .execute(&pool)
            .await
            .unwrap();
        // Qualifies: apartment, 2022, wealthy city (case differs across tables)
        insert_transaction(
            &pool, "T1", "NEUILLY-SUR-SEINE", "92", "2022-03-01", APARTMENT, 3, 1.0, 1.0,
        )
        .await;
        // Wrong year
        insert_transaction(
            &pool, "T2", "Neuilly-sur-Seine", "92", "2021-03-01", APARTMENT, 3, 1.0, 1.0,
        )
        .await;
        // City below the income floor
        insert_transaction(&pool, "T3", "Roubaix", "59", "2022-03-01", APARTMENT, 3, 1.0, 1.0)
            .await;

        let repo = TransactionRepo::new(&pool);
        assert_eq!(repo.apartment_sales_in_wealthy_cities().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn wealthy_city_sales_zero_is_not_an_error() {
        let pool = memory_pool().await;
        let repo = TransactionRepo::new(&pool);
        assert_eq!(repo.apartment_sales_in_wealthy_cities().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn city_rankings_fold_casing_variants() {
        let pool = memory_pool().await;
        insert_transaction(&pool, "T1", "Lyon", "69", "2022-01-01", APARTMENT, 2, 4000.0, 1.0)
            .await;
        insert_transaction(&pool, "T2", " LYON", "69", "2022-01-02", APARTMENT, 2, 2000.0, 1.0)
            .await;
        insert_transaction(&pool, "T3", "Grenoble", "38", "2022-01-03", APARTMENT, 2, 1000.0, 1.0)
            .await;

        let repo = TransactionRepo::new(&pool);
        let rows = repo.cheapest_cities_by_m2().await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].city, "grenoble");
        assert_eq!(rows[0].avg_price, 1000.0);
        assert_eq!(rows[1].city, "lyon");
        assert_eq!(rows[1].avg_price, 3000.0);
    }

    #[tokio::test]
    async fn expensive_ranking_is_descending_and_houses_only() {
        let pool = memory_pool().await;
        insert_transaction(&pool, "T1", "Lyon", "69", "2022-01-01", HOUSE, 4, 3000.0, 1.0).await;
        insert_transaction(&pool, "T2", "Avignon", "84", "2022-01-02", HOUSE, 4, 1000.0, 1.0)
            .await;
        insert_transaction(&pool, "T3", "Paris", "75", "2022-01-03", APARTMENT, 2, 9000.0, 1.0)
            .await;

        let repo = TransactionRepo::new(&pool);
        let rows = repo.most_expensive_cities_by_m2().await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].city, "lyon");
        assert_eq!(rows[1].city, "avignon");
    }
}
