//! Fiscal income endpoint

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db::repos::FiscalRepo;
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::CityName;

#[derive(Deserialize)]
pub struct FiscalIncomeParams {
    pub year: i64,
    pub city: String,
}

#[derive(Serialize)]
pub struct FiscalIncomeResponse {
    pub revenu_fiscal_moyen: f64,
}

/// GET /revenu_fiscal_moyen/ - average fiscal income for a city and year
async fn revenu_fiscal_moyen(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FiscalIncomeParams>,
) -> Result<Json<FiscalIncomeResponse>, ApiError> {
    let city = CityName::new(&params.city)?;
    let income = FiscalRepo::new(&state.pool)
        .average_income(&city, params.year)
        .await?;

    Ok(Json(FiscalIncomeResponse {
        revenu_fiscal_moyen: income,
    }))
}

/// Fiscal routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/revenu_fiscal_moyen/", get(revenu_fiscal_moyen))
}
