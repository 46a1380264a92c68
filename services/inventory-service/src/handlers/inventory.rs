//! Staff Inventory Handlers
//!
//! Receiving, dispatch, dashboard and label endpoints.

use std::collections::BTreeSet;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use serde::Deserialize;

use bionexa_models::{
    Chemical, ChemicalStatus, ClientTestUpdate, ExpiryStatus, InventoryFilter, InventoryRow,
    InventorySummary, Movement, NewChemical,
};
use bionexa_utils::BionexaError;

use super::{split_list, ApiResult};
use crate::labels::{LabelSheet, DEFAULT_LABELS_PER_ROW, DEFAULT_LABEL_COUNT};
use crate::AppState;

// ===== Receive / Dispatch =====

/// POST /api/v1/chemicals
pub async fn receive_chemical(
    State(state): State<AppState>,
    Json(input): Json<NewChemical>,
) -> ApiResult<(StatusCode, Json<Chemical>)> {
    let chemical = state.service.receive(input).await?;
    Ok((StatusCode::CREATED, Json(chemical)))
}

#[derive(Debug, Deserialize)]
pub struct DispatchRequest {
    pub barcode: String,
}

/// POST /api/v1/dispatch
pub async fn dispatch_chemical(
    State(state): State<AppState>,
    Json(request): Json<DispatchRequest>,
) -> ApiResult<Json<Chemical>> {
    let chemical = state.service.dispatch(&request.barcode).await?;
    Ok(Json(chemical))
}

// ===== Inventory views =====

/// Comma-separated column filters, e.g. `?status=in_stock&expiry_status=Expired,Expiring Soon`.
#[derive(Debug, Default, Deserialize)]
pub struct InventoryQuery {
    pub status: Option<String>,
    pub expiry_status: Option<String>,
    pub hazard_class: Option<String>,
}

impl InventoryQuery {
    pub fn to_filter(&self) -> Result<InventoryFilter, BionexaError> {
        let statuses: Option<BTreeSet<ChemicalStatus>> = split_list(self.status.as_deref())
            .map(|parts| {
                parts
                    .into_iter()
                    .map(|p| {
                        p.parse::<ChemicalStatus>()
                            .map_err(|e| BionexaError::validation("status", e.to_string()))
                    })
                    .collect::<Result<_, _>>()
            })
            .transpose()?;
        let expiry_statuses: Option<BTreeSet<ExpiryStatus>> = split_list(self.expiry_status.as_deref())
            .map(|parts| {
                parts
                    .into_iter()
                    .map(|p| {
                        p.parse::<ExpiryStatus>()
                            .map_err(|e| BionexaError::validation("expiry_status", e.to_string()))
                    })
                    .collect::<Result<_, _>>()
            })
            .transpose()?;
        let hazard_classes = split_list(self.hazard_class.as_deref())
            .map(|parts| parts.into_iter().map(str::to_string).collect());

        Ok(InventoryFilter {
            statuses,
            expiry_statuses,
            hazard_classes,
        })
    }
}

/// GET /api/v1/chemicals
pub async fn list_chemicals(
    State(state): State<AppState>,
    Query(query): Query<InventoryQuery>,
) -> ApiResult<Json<Vec<InventoryRow>>> {
    let filter = query.to_filter()?;
    Ok(Json(state.service.inventory(&filter).await?))
}

/// GET /api/v1/chemicals/export.csv
pub async fn export_chemicals_csv(
    State(state): State<AppState>,
    Query(query): Query<InventoryQuery>,
) -> ApiResult<impl IntoResponse> {
    let filter = query.to_filter()?;
    let csv = state.service.export_csv(&filter).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"chemical_inventory.csv\""),
        ],
        csv,
    ))
}

/// GET /api/v1/chemicals/:id
pub async fn get_chemical(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Chemical>> {
    Ok(Json(state.service.chemical(id).await?))
}

/// GET /api/v1/summary
pub async fn inventory_summary(State(state): State<AppState>) -> ApiResult<Json<InventorySummary>> {
    Ok(Json(state.service.summary().await?))
}

/// GET /api/v1/chemicals/:id/movements
pub async fn chemical_movements(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<Movement>>> {
    Ok(Json(state.service.movement_history(Some(id)).await?))
}

/// GET /api/v1/movements
pub async fn list_movements(State(state): State<AppState>) -> ApiResult<Json<Vec<Movement>>> {
    Ok(Json(state.service.movement_history(None).await?))
}

#[derive(Debug, Deserialize)]
pub struct LabelQuery {
    pub per_row: Option<usize>,
    pub count: Option<usize>,
}

/// GET /api/v1/labels
pub async fn label_sheet(
    State(state): State<AppState>,
    Query(query): Query<LabelQuery>,
) -> ApiResult<Json<LabelSheet>> {
    let sheet = state
        .service
        .label_sheet(
            query.per_row.unwrap_or(DEFAULT_LABELS_PER_ROW),
            query.count.unwrap_or(DEFAULT_LABEL_COUNT),
        )
        .await?;
    Ok(Json(sheet))
}

// ===== Administration =====

#[derive(Debug, Deserialize)]
pub struct WrittenOffRequest {
    pub written_off: bool,
}

/// PUT /api/v1/chemicals/:id/written-off
pub async fn set_written_off(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<WrittenOffRequest>,
) -> ApiResult<Json<Chemical>> {
    Ok(Json(state.service.set_written_off(id, request.written_off).await?))
}

/// PUT /api/v1/chemicals/:id/client-test
pub async fn update_client_test(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(update): Json<ClientTestUpdate>,
) -> ApiResult<Json<Chemical>> {
    Ok(Json(state.service.update_client_test(id, update).await?))
}
