use axum::{routing::get, Router};

use crate::state::AppState;

pub const BANNER: &str = "blocktrade portfolio service";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { BANNER }))
        .route("/healthz", get(healthz))
}

async fn healthz() -> &'static str {
    "ok"
}
