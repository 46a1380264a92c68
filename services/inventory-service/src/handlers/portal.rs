//! Client Portal Handlers

use axum::{
    extract::{Multipart, Path, Query, State},
    http::header,
    response::{IntoResponse, Json},
};
use serde::Deserialize;

use bionexa_models::Chemical;
use bionexa_utils::{sanitize_file_name, BionexaError};

use super::ApiResult;
use crate::service::ClientTestStatus;
use crate::AppState;

const REPORT_FIELD: &str = "file";

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    pub sample_id: Option<String>,
    pub client: Option<String>,
}

/// GET /api/v1/portal/lookup
pub async fn client_lookup(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> ApiResult<Json<ClientTestStatus>> {
    let status = state
        .service
        .client_lookup(query.sample_id.as_deref(), query.client.as_deref())
        .await?;
    Ok(Json(status))
}

/// POST /api/v1/portal/reports/:sample_id
///
/// Expects a multipart form with the PDF in the `file` field.
pub async fn upload_report(
    State(state): State<AppState>,
    Path(sample_id): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<Json<Chemical>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| BionexaError::validation(REPORT_FIELD, e.to_string()))?
    {
        if field.name() != Some(REPORT_FIELD) {
            continue;
        }
        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| BionexaError::validation(REPORT_FIELD, "uploaded file has no name"))?;
        let contents = field
            .bytes()
            .await
            .map_err(|e| BionexaError::validation(REPORT_FIELD, e.to_string()))?;

        let chemical = state
            .service
            .attach_report(&sample_id, &file_name, &contents)
            .await?;
        return Ok(Json(chemical));
    }

    Err(BionexaError::validation(REPORT_FIELD, "multipart field 'file' is required").into())
}

/// GET /api/v1/portal/reports/:sample_id
pub async fn download_report(
    State(state): State<AppState>,
    Path(sample_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let status = state.service.client_lookup(Some(&sample_id), None).await?;
    let path = status
        .report_download
        .ok_or_else(|| BionexaError::not_found(format!("report for sample {}", status.sample_id)))?;

    let contents = tokio::fs::read(&path).await.map_err(BionexaError::from)?;
    let disposition = format!(
        "attachment; filename=\"{}_report.pdf\"",
        sanitize_file_name(&status.sample_id)
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        contents,
    ))
}
