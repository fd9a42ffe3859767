//! Market-wide endpoints: price-per-m² aggregates, department and city
//! rankings, and the cross-dataset wealthy-city sales count.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db::repos::{CityCount, CityPrice, DepartmentCount, TransactionRepo};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::{city::capitalize, CityName};

#[derive(Deserialize)]
pub struct HousePriceParams {
    pub year: i64,
    /// Optional: without a city the average spans the whole dataset.
    pub city: Option<String>,
}

#[derive(Serialize)]
pub struct HousePriceResponse {
    pub prix_m2_moyen: f64,
}

#[derive(Serialize)]
pub struct DepartmentCountEntry {
    pub departement: String,
    pub nombre_transactions: i64,
}

impl From<DepartmentCount> for DepartmentCountEntry {
    fn from(d: DepartmentCount) -> Self {
        Self {
            departement: d.department,
            nombre_transactions: d.count,
        }
    }
}

#[derive(Serialize)]
pub struct DepartmentCountsResponse {
    pub nb_transactions_departement: Vec<DepartmentCountEntry>,
}

#[derive(Serialize)]
pub struct CityCountEntry {
    pub ville: String,
    pub nombre_transactions: i64,
}

impl From<CityCount> for CityCountEntry {
    fn from(c: CityCount) -> Self {
        Self {
            ville: c.city,
            nombre_transactions: c.count,
        }
    }
}

#[derive(Serialize)]
pub struct TopCitiesResponse {
    pub top_10_villes: Vec<CityCountEntry>,
}

#[derive(Serialize)]
pub struct WealthyCitySalesResponse {
    pub nombre_ventes_appart_2022: i64,
}

#[derive(Serialize)]
pub struct CityPriceEntry {
    pub ville: String,
    pub prix_m2_moyen: f64,
}

impl From<CityPrice> for CityPriceEntry {
    fn from(c: CityPrice) -> Self {
        Self {
            // Grouped on the normalized name; re-capitalize for display
            ville: capitalize(&c.city),
            prix_m2_moyen: c.avg_price,
        }
    }
}

#[derive(Serialize)]
pub struct CheapestCitiesResponse {
    pub top_10_villes_prix_m2_bas: Vec<CityPriceEntry>,
}

#[derive(Serialize)]
pub struct MostExpensiveCitiesResponse {
    pub top_10_villes_prix_m2_haut: Vec<CityPriceEntry>,
}

/// GET /prix_m2_moyen_maison/ - average house price per m² for a year,
/// optionally restricted to one city
async fn prix_m2_moyen_maison(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HousePriceParams>,
) -> Result<Json<HousePriceResponse>, ApiError> {
    let city = match params.city.as_deref() {
        Some(raw) => Some(CityName::new(raw)?),
        None => None,
    };
    let avg = TransactionRepo::new(&state.pool)
        .house_price_per_m2(city.as_ref(), params.year)
        .await?;

    Ok(Json(HousePriceResponse { prix_m2_moyen: avg }))
}

/// GET /nb_transactions_departement/ - transaction counts per department
async fn nb_transactions_departement(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DepartmentCountsResponse>, ApiError> {
    let rows = TransactionRepo::new(&state.pool).count_by_department().await?;

    Ok(Json(DepartmentCountsResponse {
        nb_transactions_departement: rows.into_iter().map(DepartmentCountEntry::from).collect(),
    }))
}

/// GET /top_10_villes/ - the 10 cities with the most transactions
async fn top_10_villes(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TopCitiesResponse>, ApiError> {
    let rows = TransactionRepo::new(&state.pool)
        .top_cities_by_volume()
        .await?;

    Ok(Json(TopCitiesResponse {
        top_10_villes: rows.into_iter().map(CityCountEntry::from).collect(),
    }))
}

/// GET /nb_ventes_appart_2022/ - apartment sales in 2022 across cities
/// with average fiscal income above 70k
async fn nb_ventes_appart_2022(
    State(state): State<Arc<AppState>>,
) -> Result<Json<WealthyCitySalesResponse>, ApiError> {
    let count = TransactionRepo::new(&state.pool)
        .apartment_sales_in_wealthy_cities()
        .await?;

    Ok(Json(WealthyCitySalesResponse {
        nombre_ventes_appart_2022: count,
    }))
}

/// GET /top_10_villes_prix_m2_bas/ - cheapest cities for apartments
async fn top_10_villes_prix_m2_bas(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CheapestCitiesResponse>, ApiError> {
    let rows = TransactionRepo::new(&state.pool)
        .cheapest_cities_by_m2()
        .await?;

    Ok(Json(CheapestCitiesResponse {
        top_10_villes_prix_m2_bas: rows.into_iter().map(CityPriceEntry::from).collect(),
    }))
}

/// GET /top_10_villes_prix_m2_haut/ - most expensive cities for houses
async fn top_10_villes_prix_m2_haut(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MostExpensiveCitiesResponse>, ApiError> {
    let rows = TransactionRepo::new(&state.pool)
        .most_expensive_cities_by_m2()
        .await?;

    Ok(Json(MostExpensiveCitiesResponse {
        top_10_villes_prix_m2_haut: rows.into_iter().map(CityPriceEntry::from).collect(),
    }))
}

/// Market routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/prix_m2_moyen_maison/", get(prix_m2_moyen_maison))
        .route("/nb_transactions_departement/", get(nb_transactions_departement))
        .route("/top_10_villes/", get(top_10_villes))
        .route("/nb_ventes_appart_2022/", get(nb_ventes_appart_2022))
        .route("/top_10_villes_prix_m2_bas/", get(top_10_villes_prix_m2_bas))
        .route("/top_10_villes_prix_m2_haut/", get(top_10_villes_prix_m2_haut))
}
