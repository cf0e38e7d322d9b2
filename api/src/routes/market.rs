use axum::{extract::State, routing::get, Json, Router};
use domain::MarketResponse;

use super::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/market", get(get_market))
}

async fn get_market(State(state): State<AppState>) -> Result<Json<MarketResponse>, ApiError> {
    let assets = state.market.assets().await.map_err(ApiError::Market)?;
    Ok(Json(MarketResponse { assets }))
}
