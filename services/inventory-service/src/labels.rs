//! Printable barcode label sheets.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use bionexa_models::Chemical;
use bionexa_utils::{BionexaError, BionexaResult};

pub const LABELS_PER_ROW: [usize; 3] = [2, 3, 4];
pub const DEFAULT_LABELS_PER_ROW: usize = 3;
pub const DEFAULT_LABEL_COUNT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub chemical_id: i64,
    pub sample_id: String,
    pub chemical_name: String,
    pub article_number: String,
    pub batch_number: String,
    pub expiry_date: NaiveDate,
    pub hazard_class: Option<String>,
    pub ph: Option<String>,
    pub barcode_path: Option<String>,
    /// False when no rendered barcode file exists for the lot.
    pub barcode_available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelSheet {
    pub labels_per_row: usize,
    pub rows: Vec<Vec<Label>>,
}

impl LabelSheet {
    /// Lays out the first `count` lots, clamped to `1..=chemicals.len()`.
    pub fn build(chemicals: &[Chemical], labels_per_row: usize, count: usize) -> BionexaResult<Self> {
        if !LABELS_PER_ROW.contains(&labels_per_row) {
            return Err(BionexaError::validation(
                "per_row",
                format!("labels per row must be one of {:?}", LABELS_PER_ROW),
            ));
        }

        let count = count.clamp(1, chemicals.len().max(1));
        let labels: Vec<Label> = chemicals.iter().take(count).map(Label::for_chemical).collect();
        let rows = labels
            .chunks(labels_per_row)
            .map(<[Label]>::to_vec)
            .collect();

        Ok(Self {
            labels_per_row,
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }
}

impl Label {
    fn for_chemical(chemical: &Chemical) -> Self {
        let barcode_available = chemical
            .barcode_path
            .as_deref()
            .map_or(false, |p| Path::new(p).is_file());

        Self {
            chemical_id: chemical.id,
            sample_id: chemical.sample_id(),
            chemical_name: chemical.chemical_name.clone(),
            article_number: chemical.article_number.clone(),
            batch_number: chemical.batch_number.clone(),
            expiry_date: chemical.expiry_date,
            hazard_class: chemical.hazard_class.clone(),
            ph: chemical.ph.clone(),
            barcode_path: chemical.barcode_path.clone(),
            barcode_available,
        }
    }
}
