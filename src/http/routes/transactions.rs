//! Per-city transaction endpoints: latest ids, acquisition counts, and the
//! apartment room-count distribution.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db::repos::{RoomCount, TransactionRepo};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::CityName;

#[derive(Deserialize)]
pub struct CityParams {
    pub city: String,
}

#[derive(Deserialize)]
pub struct CityYearParams {
    pub city: String,
    pub year: i64,
}

#[derive(Serialize)]
pub struct TopTransactionsResponse {
    pub top_transactions: Vec<String>,
}

#[derive(Serialize)]
pub struct AcquisitionCountResponse {
    pub nombre_acquisitions: i64,
}

#[derive(Serialize)]
pub struct RoomCountEntry {
    pub n_pieces: i64,
    pub nombre_appartements: i64,
}

impl From<RoomCount> for RoomCountEntry {
    fn from(r: RoomCount) -> Self {
        Self {
            n_pieces: r.rooms,
            nombre_appartements: r.count,
        }
    }
}

#[derive(Serialize)]
pub struct RoomDistributionResponse {
    pub repartition_appartements: Vec<RoomCountEntry>,
}

#[derive(Serialize)]
pub struct StudioCountResponse {
    pub nombre_acquisitions_studios: i64,
}

/// GET /top10_transaction/ - ids of the 10 latest transactions in a city
async fn top10_transaction(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CityParams>,
) -> Result<Json<TopTransactionsResponse>, ApiError> {
    let city = CityName::new(&params.city)?;
    let ids = TransactionRepo::new(&state.pool).latest_ids(&city).await?;

    Ok(Json(TopTransactionsResponse {
        top_transactions: ids,
    }))
}

/// GET /nb_acquisitions_city/ - acquisition count for a city and year
async fn nb_acquisitions_city(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CityYearParams>,
) -> Result<Json<AcquisitionCountResponse>, ApiError> {
    let city = CityName::new(&params.city)?;
    let count = TransactionRepo::new(&state.pool)
        .acquisition_count(&city, params.year)
        .await?;

    Ok(Json(AcquisitionCountResponse {
        nombre_acquisitions: count,
    }))
}

/// GET /repartition_appart/ - apartments sold, bucketed by room count
async fn repartition_appart(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CityYearParams>,
) -> Result<Json<RoomDistributionResponse>, ApiError> {
    let city = CityName::new(&params.city)?;
    let rows = TransactionRepo::new(&state.pool)
        .room_distribution(&city, params.year)
        .await?;

    Ok(Json(RoomDistributionResponse {
        repartition_appartements: rows.into_iter().map(RoomCountEntry::from).collect(),
    }))
}

/// GET /acquisitions_studio/ - studio acquisition count for a city and year
async fn acquisitions_studio(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CityYearParams>,
) -> Result<Json<StudioCountResponse>, ApiError> {
    let city = CityName::new(&params.city)?;
    let count = TransactionRepo::new(&state.pool)
        .studio_count(&city, params.year)
        .await?;

    Ok(Json(StudioCountResponse {
        nombre_acquisitions_studios: count,
    }))
}

/// Transaction routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/top10_transaction/", get(top10_transaction))
        .route("/nb_acquisitions_city/", get(nb_acquisitions_city))
        .route("/repartition_appart/", get(repartition_appart))
        .route("/acquisitions_studio/", get(acquisitions_studio))
}
