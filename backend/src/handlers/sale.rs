//! HTTP handlers for sales endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared::models::{RecentSale, RecordSaleInput};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::{RecordedSale, SaleRecorder};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RecentSalesQuery {
    pub limit: Option<i64>,
}

/// Record a sale and decrement stock
pub async fn record_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RecordSaleInput>,
) -> AppResult<(StatusCode, Json<RecordedSale>)> {
    let service = SaleRecorder::new(state.products, state.sales);
    let recorded = service.record(current_user.0.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(recorded)))
}

/// Recent sales with product names
pub async fn list_recent_sales(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<RecentSalesQuery>,
) -> AppResult<Json<Vec<RecentSale>>> {
    let service = SaleRecorder::new(state.products, state.sales);
    let sales = service.recent(current_user.0.user_id, query.limit).await?;
    Ok(Json(sales))
}
