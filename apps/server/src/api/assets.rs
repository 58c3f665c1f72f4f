use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
    models::{AssetsQuery, SaleRequest},
};
use apex_core::{Asset, NewAsset};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};

async fn list_assets(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AssetsQuery>,
) -> ApiResult<Json<Vec<Asset>>> {
    Ok(Json(state.coordinator.assets(query.status)))
}

async fn create_asset(
    State(state): State<Arc<AppState>>,
    Json(new_asset): Json<NewAsset>,
) -> ApiResult<Json<Asset>> {
    let asset = state.coordinator.add_asset(new_asset).await?;
    Ok(Json(asset))
}

async fn update_asset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(asset): Json<Asset>,
) -> ApiResult<Json<Asset>> {
    if asset.id != id {
        return Err(ApiError::BadRequest(format!(
            "Body id {} does not match path id {}",
            asset.id, id
        )));
    }
    let stored = state.coordinator.update_asset(asset).await?;
    Ok(Json(stored))
}

async fn delete_asset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.coordinator.delete_asset(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn mark_sold(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(sale): Json<SaleRequest>,
) -> ApiResult<Json<Asset>> {
    let stored = state
        .coordinator
        .mark_sold(&id, sale.sold_price, sale.sold_date)
        .await?;
    Ok(Json(stored))
}

async fn unmark_sold(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Asset>> {
    let stored = state.coordinator.unmark_sold(&id).await?;
    Ok(Json(stored))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/assets", get(list_assets).post(create_asset))
        .route("/assets/{id}", put(update_asset).delete(delete_asset))
        .route("/assets/{id}/sale", post(mark_sold).delete(unmark_sold))
}
