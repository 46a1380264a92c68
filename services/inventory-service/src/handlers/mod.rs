pub mod health;
pub mod inventory;
pub mod portal;

pub use health::*;
pub use inventory::*;
pub use portal::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

use bionexa_utils::{BionexaError, ErrorResponse};

/// Handler error carrying the domain error into a JSON response.
#[derive(Debug)]
pub struct ApiError(pub BionexaError);

impl From<BionexaError> for ApiError {
    fn from(error: BionexaError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorResponse::from(&self.0))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Splits a comma-separated query value into trimmed, non-empty parts.
pub(crate) fn split_list(raw: Option<&str>) -> Option<Vec<&str>> {
    let parts: Vec<&str> = raw?
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    (!parts.is_empty()).then_some(parts)
}
