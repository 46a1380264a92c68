//! Inventory Engine
//!
//! Orchestrates receipt and dispatch of chemical lots over an
//! [`InventoryStore`] and a [`BarcodeEncoder`], plus the derived dashboard,
//! label and client portal views.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use bionexa_database::{InventoryStore, SqliteInventoryStore, SqlitePool};
use bionexa_models::{
    compute_low_stock_with, inventory_rows, Chemical, ChemicalStatus, ClientTestUpdate,
    ExpiryPolicy, ExpiryStatus, InventoryFilter, InventoryRow, InventorySummary, Movement,
    NewChemical, ReportStatus, DEFAULT_LOW_STOCK_THRESHOLD,
};
use bionexa_utils::{
    encode_path_component, normalize_optional, require_non_blank, sanitize_file_name,
    validate_model, AppConfig, BionexaError, BionexaResult, InventoryConfig,
};

use crate::barcode::{BarcodeEncoder, Code128Encoder};
use crate::export::inventory_csv;
use crate::labels::LabelSheet;

/// What a client sees when looking up their sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientTestStatus {
    pub sample_id: String,
    pub chemical_name: String,
    pub client_name: Option<String>,
    pub test_type: Option<String>,
    pub expected_report_date: Option<NaiveDate>,
    pub report_status: ReportStatus,
    pub ready_for_collection: bool,
    pub current_location: Option<String>,
    pub issues: Option<String>,
    /// True when staff recorded a non-blank issue against the sample.
    pub has_issue: bool,
    /// Set only when the report is ready and its file is present.
    pub report_download: Option<String>,
}

#[derive(Clone)]
pub struct InventoryService {
    store: Arc<dyn InventoryStore>,
    barcodes: Arc<dyn BarcodeEncoder>,
    report_dir: PathBuf,
    expiry_policy: ExpiryPolicy,
    low_stock_threshold: usize,
}

impl InventoryService {
    pub fn new(
        store: Arc<dyn InventoryStore>,
        barcodes: Arc<dyn BarcodeEncoder>,
        report_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            barcodes,
            report_dir: report_dir.into(),
            expiry_policy: ExpiryPolicy::default(),
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }

    /// Wires the SQLite store and Code128 encoder from application config.
    pub fn from_config(pool: SqlitePool, config: &AppConfig) -> Self {
        Self::new(
            Arc::new(SqliteInventoryStore::new(pool)),
            Arc::new(Code128Encoder::new(&config.storage.barcode_dir)),
            &config.storage.report_dir,
        )
        .with_inventory_config(&config.inventory)
    }

    pub fn with_inventory_config(mut self, inventory: &InventoryConfig) -> Self {
        self.expiry_policy = ExpiryPolicy::new(inventory.expiring_soon_days);
        self.low_stock_threshold = inventory.low_stock_threshold;
        self
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    // ===== Receive / Dispatch =====

    pub async fn receive(&self, input: NewChemical) -> BionexaResult<Chemical> {
        self.receive_on(input, Self::today()).await
    }

    /// Registers a lot as in stock, renders its barcode and appends the
    /// `received` movement. Nothing is written to the store unless the
    /// barcode rendered successfully.
    pub async fn receive_on(&self, input: NewChemical, received_on: NaiveDate) -> BionexaResult<Chemical> {
        let input = input.normalized();
        validate_model(&input)?;
        let sample_id = input.sample_id();

        if self.store.chemical_by_sample_id(&sample_id).await?.is_some() {
            warn!(sample_id = %sample_id, "Rejected receipt of an already registered sample");
            return Err(BionexaError::conflict(format!(
                "sample {} is already registered",
                sample_id
            )));
        }

        let barcode_path = self.render_barcode(&sample_id).await.map_err(|e| {
            error!(sample_id = %sample_id, error = %e, "Barcode rendering failed");
            e
        })?;

        let (chemical, movement) = self
            .store
            .receive(&input, &barcode_path.to_string_lossy(), received_on)
            .await
            .map_err(|e| log_failure("receive", &sample_id, e))?;

        info!(
            chemical_id = chemical.id,
            sample_id = %sample_id,
            movement_id = movement.id,
            "Chemical received"
        );
        Ok(chemical)
    }

    async fn render_barcode(&self, sample_id: &str) -> BionexaResult<PathBuf> {
        let encoder = Arc::clone(&self.barcodes);
        let identifier = sample_id.to_string();
        tokio::task::spawn_blocking(move || encoder.encode(&identifier))
            .await
            .map_err(|e| BionexaError::internal(format!("barcode task failed: {}", e)))?
    }

    /// Dispatches the in-stock lot whose sample identifier matches the scanned barcode.
    pub async fn dispatch(&self, barcode_identifier: &str) -> BionexaResult<Chemical> {
        self.dispatch_on(barcode_identifier, Self::today()).await
    }

    pub async fn dispatch_on(&self, barcode_identifier: &str, dispatched_on: NaiveDate) -> BionexaResult<Chemical> {
        let sample_id = barcode_identifier.trim();
        require_non_blank("barcode", sample_id)?;

        let chemical = self
            .store
            .chemical_by_sample_id(sample_id)
            .await?
            .ok_or_else(|| BionexaError::not_found(format!("chemical with barcode {}", sample_id)))
            .map_err(|e| log_failure("dispatch", sample_id, e))?;

        if !chemical.status.can_transition_to(ChemicalStatus::Dispatched) {
            return Err(log_failure(
                "dispatch",
                sample_id,
                BionexaError::already_dispatched(sample_id),
            ));
        }

        match self.store.dispatch(chemical.id, dispatched_on).await {
            Ok(Some((dispatched, movement))) => {
                info!(
                    chemical_id = dispatched.id,
                    sample_id = %sample_id,
                    movement_id = movement.id,
                    "Chemical dispatched"
                );
                Ok(dispatched)
            }
            // lost the race to a concurrent dispatcher
            Ok(None) => Err(log_failure(
                "dispatch",
                sample_id,
                BionexaError::already_dispatched(sample_id),
            )),
            Err(e) => Err(log_failure("dispatch", sample_id, e)),
        }
    }

    // ===== Derived views =====

    pub fn compute_expiry_status(&self, chemical: &Chemical, reference_date: NaiveDate) -> ExpiryStatus {
        self.expiry_policy.status_of(chemical.expiry_date, reference_date)
    }

    pub async fn low_stock(&self) -> BionexaResult<BTreeMap<String, bool>> {
        let chemicals = self.store.chemicals().await?;
        Ok(compute_low_stock_with(&chemicals, self.low_stock_threshold))
    }

    pub async fn inventory(&self, filter: &InventoryFilter) -> BionexaResult<Vec<InventoryRow>> {
        let chemicals = self.store.chemicals().await?;
        Ok(inventory_rows(&chemicals, Self::today(), &self.expiry_policy, filter))
    }

    pub async fn summary(&self) -> BionexaResult<InventorySummary> {
        let chemicals = self.store.chemicals().await?;
        let summary = InventorySummary::build(
            &chemicals,
            Self::today(),
            &self.expiry_policy,
            self.low_stock_threshold,
        );
        let low = summary.low_stock_names();
        if !low.is_empty() {
            info!(chemicals = ?low, "Chemicals below reorder threshold");
        }
        Ok(summary)
    }

    pub async fn export_csv(&self, filter: &InventoryFilter) -> BionexaResult<Vec<u8>> {
        let rows = self.inventory(filter).await?;
        debug!(rows = rows.len(), filtered = !filter.is_empty(), "Exporting inventory CSV");
        inventory_csv(&rows)
    }

    pub async fn label_sheet(&self, labels_per_row: usize, count: usize) -> BionexaResult<LabelSheet> {
        let chemicals = self.store.chemicals().await?;
        let sheet = LabelSheet::build(&chemicals, labels_per_row, count)?;
        debug!(labels = sheet.len(), labels_per_row, "Label sheet prepared");
        Ok(sheet)
    }

    pub async fn movement_history(&self, chemical_id: Option<i64>) -> BionexaResult<Vec<Movement>> {
        if let Some(id) = chemical_id {
            self.require_chemical(id).await?;
        }
        self.store.movements(chemical_id).await
    }

    pub async fn chemical(&self, id: i64) -> BionexaResult<Chemical> {
        self.require_chemical(id).await
    }

    async fn require_chemical(&self, id: i64) -> BionexaResult<Chemical> {
        self.store
            .chemical(id)
            .await?
            .ok_or_else(|| BionexaError::not_found(format!("chemical {}", id)))
    }

    // ===== Administration =====

    /// Sets the write-off flag. Stock status is left untouched.
    pub async fn set_written_off(&self, id: i64, written_off: bool) -> BionexaResult<Chemical> {
        let chemical = self.store.set_written_off(id, written_off).await?;
        info!(chemical_id = id, written_off, "Write-off flag updated");
        Ok(chemical)
    }

    pub async fn update_client_test(&self, id: i64, update: ClientTestUpdate) -> BionexaResult<Chemical> {
        let update = ClientTestUpdate {
            client_name: normalize_optional(update.client_name),
            test_type: normalize_optional(update.test_type),
            expected_report_date: update.expected_report_date,
            current_location: normalize_optional(update.current_location),
            issues: normalize_optional(update.issues),
        };
        validate_model(&update)?;

        let chemical = self.store.update_client_test(id, &update).await?;
        info!(chemical_id = id, "Client test details updated");
        Ok(chemical)
    }

    /// Stores an uploaded PDF report for the sample and marks it ready.
    pub async fn attach_report(&self, sample_id: &str, file_name: &str, contents: &[u8]) -> BionexaResult<Chemical> {
        let sample_id = sample_id.trim();
        require_non_blank("sample_id", sample_id)?;

        let file_name = sanitize_file_name(file_name);
        if !file_name.to_ascii_lowercase().ends_with(".pdf") || file_name.len() <= ".pdf".len() {
            return Err(BionexaError::validation("file", "report must be a PDF file"));
        }
        if contents.is_empty() {
            return Err(BionexaError::validation("file", "report file is empty"));
        }

        let chemical = self
            .store
            .chemical_by_sample_id(sample_id)
            .await?
            .ok_or_else(|| BionexaError::not_found(format!("sample {}", sample_id)))?;

        // One directory per sample so equal upload names never collide
        let sample_dir = self.report_dir.join(encode_path_component(sample_id));
        tokio::fs::create_dir_all(&sample_dir).await?;
        let path = sample_dir.join(&file_name);
        tokio::fs::write(&path, contents).await?;

        let updated = self
            .store
            .attach_report(chemical.id, &path.to_string_lossy())
            .await
            .map_err(|e| log_failure("attach_report", sample_id, e))?;

        info!(sample_id = %sample_id, path = %path.display(), "Client report attached");
        Ok(updated)
    }

    // ===== Client portal =====

    /// Finds a sample by exact identifier, or failing that the most recent
    /// sample whose client name contains `client`.
    pub async fn client_lookup(
        &self,
        sample_id: Option<&str>,
        client: Option<&str>,
    ) -> BionexaResult<ClientTestStatus> {
        let sample_id = sample_id.map(str::trim).filter(|s| !s.is_empty());
        let client = client.map(str::trim).filter(|s| !s.is_empty());

        let chemical = match (sample_id, client) {
            (Some(id), _) => self.store.chemical_by_sample_id(id).await?,
            (None, Some(client)) => self.store.latest_chemical_for_client(client).await?,
            (None, None) => {
                return Err(BionexaError::validation(
                    "sample_id",
                    "Provide a sample ID or client identifier",
                ))
            }
        };

        let chemical = chemical.ok_or_else(|| {
            warn!(?sample_id, ?client, "Client lookup matched no sample");
            BionexaError::not_found("sample for the given identifiers")
        })?;

        let ready_for_collection = chemical.client.is_report_ready();
        let has_issue = chemical.client.has_active_issue();
        let report_download = match chemical.client.report_file_path.as_deref() {
            Some(path) if ready_for_collection && file_exists(path).await => {
                Some(path.to_string())
            }
            _ => None,
        };

        Ok(ClientTestStatus {
            sample_id: chemical.sample_id(),
            chemical_name: chemical.chemical_name,
            client_name: chemical.client.client_name,
            test_type: chemical.client.test_type,
            expected_report_date: chemical.client.expected_report_date,
            ready_for_collection,
            report_status: chemical.client.report_status,
            current_location: chemical.client.current_location,
            issues: chemical.client.issues,
            has_issue,
            report_download,
        })
    }

    pub async fn health_check(&self) -> BionexaResult<()> {
        self.store.health_check().await
    }
}

async fn file_exists(path: impl AsRef<Path>) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

fn log_failure(operation: &str, sample_id: &str, error: BionexaError) -> BionexaError {
    if error.is_warning() {
        warn!(operation, sample_id, error = %error, "Inventory operation rejected");
    } else {
        error!(operation, sample_id, error = %error, "Inventory operation failed");
    }
    error
}
