use axum::{
    extract::{Path, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        HeaderName, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use domain::{PortfolioResponse, PortfolioSnapshot};
use portfolio::{SnapshotState, ViewStatus};
use serde::Serialize;

use super::ApiError;
use crate::{services::demo_holdings, state::AppState};

pub const FALLBACK_HEADER: &str = "x-portfolio-fallback";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/portfolio/:owner", get(get_holdings))
        .route("/portfolio/:owner/snapshot", get(get_snapshot))
        .route("/portfolio/:owner/refresh", post(refresh_snapshot))
        .route("/portfolio/:owner/export", get(export_report))
}

#[derive(Serialize)]
struct SnapshotView<'a> {
    status: ViewStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    snapshot: Option<&'a PortfolioSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn state_response(state: &SnapshotState) -> Response {
    let status = match state {
        SnapshotState::Failed(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::OK,
    };
    let view = SnapshotView {
        status: state.status(),
        snapshot: state.snapshot().map(|snapshot| snapshot.as_ref()),
        error: state.error().map(ToString::to_string),
    };
    (status, Json(view)).into_response()
}

fn owner_param(owner: &str) -> Result<&str, ApiError> {
    let owner = owner.trim();
    if owner.is_empty() {
        Err(ApiError::BlankOwner)
    } else {
        Ok(owner)
    }
}

/// Raw demo holdings in the provider wire shape.
async fn get_holdings(Path(owner): Path<String>) -> (StatusCode, Json<PortfolioResponse>) {
    if owner.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(PortfolioResponse {
                holdings: Vec::new(),
            }),
        );
    }
    (
        StatusCode::OK,
        Json(PortfolioResponse {
            holdings: demo_holdings(),
        }),
    )
}

async fn get_snapshot(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> Result<Response, ApiError> {
    let owner = owner_param(&owner)?;
    Ok(state_response(&state.board.state(owner).await))
}

async fn refresh_snapshot(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> Result<Response, ApiError> {
    let owner = owner_param(&owner)?;
    let refreshed = state.board.refresh(&state.portfolio, owner).await;
    Ok(state_response(&refreshed))
}

async fn export_report(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> Result<Response, ApiError> {
    let owner = owner_param(&owner)?;
    let outcome = state.portfolio.get_snapshot(owner).await?;
    let artifact = state.portfolio.export(outcome.snapshot())?;
    tracing::info!(
        owner,
        filename = %artifact.filename,
        fallback = outcome.is_fallback(),
        "portfolio report exported"
    );

    let headers = [
        (CONTENT_TYPE, artifact.content_type.to_string()),
        (
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", artifact.filename),
        ),
        (
            HeaderName::from_static(FALLBACK_HEADER),
            outcome.is_fallback().to_string(),
        ),
    ];
    Ok((StatusCode::OK, headers, artifact.body).into_response())
}
