use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState, models::CashParameterRequest};
use apex_core::sync::SyncSummary;
use apex_core::PortfolioValuation;
use axum::{
    extract::State,
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;

async fn get_valuation(State(state): State<Arc<AppState>>) -> ApiResult<Json<PortfolioValuation>> {
    Ok(Json(state.coordinator.valuation(Utc::now())))
}

async fn set_cash_parameter(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CashParameterRequest>,
) -> ApiResult<Json<PortfolioValuation>> {
    state.coordinator.set_cash_parameter(body.amount)?;
    Ok(Json(state.coordinator.valuation(Utc::now())))
}

async fn refresh(State(state): State<Arc<AppState>>) -> ApiResult<Json<SyncSummary>> {
    state.coordinator.refresh().await?;
    Ok(Json(SyncSummary::from(&state.coordinator.state())))
}

async fn get_sync_state(State(state): State<Arc<AppState>>) -> ApiResult<Json<SyncSummary>> {
    Ok(Json(SyncSummary::from(&state.coordinator.state())))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/portfolio/valuation", get(get_valuation))
        .route("/portfolio/cash-parameter", put(set_cash_parameter))
        .route("/portfolio/refresh", post(refresh))
        .route("/portfolio/sync", get(get_sync_state))
}
