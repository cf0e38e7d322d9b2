use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use portfolio::DataUnavailable;
use reporting::ExportFailure;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("owner must not be blank")]
    BlankOwner,
    #[error(transparent)]
    Unavailable(#[from] DataUnavailable),
    #[error(transparent)]
    Export(#[from] ExportFailure),
    #[error("market data unavailable: {0}")]
    Market(anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BlankOwner => StatusCode::BAD_REQUEST,
            Self::Unavailable(_) | Self::Market(_) => StatusCode::BAD_GATEWAY,
            Self::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            // 上游失敗與匯出失敗都記一筆，4xx 不記
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
