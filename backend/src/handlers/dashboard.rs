//! HTTP handler for the dashboard summary

use axum::{extract::State, Json};
use shared::types::DashboardSummary;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::DashboardService;
use crate::AppState;

pub async fn get_dashboard(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<DashboardSummary>> {
    let service = DashboardService::new(state.products, state.sales);
    let summary = service.summary(current_user.0.user_id).await?;
    Ok(Json(summary))
}
