//! Chemical lot domain models for the Bionexa inventory system.
//!
//! A [`Chemical`] is one physical lot identified by its article and batch
//! numbers. Its stock status moves through a small state machine
//! ([`ChemicalStatus`]) while the client-facing test annotations
//! ([`ClientTestInfo`]) follow their own unguarded lifecycle.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::UnknownVariant;

pub const DEFAULT_REORDER_POINT: i32 = 5;

/// Builds the barcode-facing sample identifier `"{article}-{batch}"`.
pub fn sample_identifier(article_number: &str, batch_number: &str) -> String {
    format!("{}-{}", article_number, batch_number)
}

/// One physical lot of a chemical substance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chemical {
    pub id: i64,
    pub article_number: String,
    pub batch_number: String,
    pub chemical_name: String,
    pub hazard_class: Option<String>,
    pub ph: Option<String>,
    pub expiry_date: NaiveDate,
    pub reorder_point: i32,
    pub status: ChemicalStatus,
    pub written_off: bool,
    pub barcode_path: Option<String>,
    pub client: ClientTestInfo,
}

impl Chemical {
    pub fn sample_id(&self) -> String {
        sample_identifier(&self.article_number, &self.batch_number)
    }

    pub fn is_in_stock(&self) -> bool {
        self.status == ChemicalStatus::InStock
    }
}

/// Stock state of a lot. `Dispatched` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChemicalStatus {
    InStock,
    Dispatched,
}

impl ChemicalStatus {
    pub fn can_transition_to(&self, target: ChemicalStatus) -> bool {
        use ChemicalStatus::*;

        matches!((self, target), (InStock, Dispatched))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InStock => "in_stock",
            Self::Dispatched => "dispatched",
        }
    }
}

impl Default for ChemicalStatus {
    fn default() -> Self {
        Self::InStock
    }
}

impl fmt::Display for ChemicalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChemicalStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_stock" => Ok(Self::InStock),
            "dispatched" => Ok(Self::Dispatched),
            other => Err(UnknownVariant::new("status", other)),
        }
    }
}

/// Readiness of the client report. Only ever moves from `NotReady` to `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportStatus {
    #[serde(rename = "Not Ready")]
    NotReady,
    #[serde(rename = "Ready")]
    Ready,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotReady => "Not Ready",
            Self::Ready => "Ready",
        }
    }
}

impl Default for ReportStatus {
    fn default() -> Self {
        Self::NotReady
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Not Ready" => Ok(Self::NotReady),
            "Ready" => Ok(Self::Ready),
            other => Err(UnknownVariant::new("report_status", other)),
        }
    }
}

/// Client-facing test annotations carried by a lot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientTestInfo {
    pub client_name: Option<String>,
    pub test_type: Option<String>,
    pub expected_report_date: Option<NaiveDate>,
    pub report_status: ReportStatus,
    pub report_file_path: Option<String>,
    pub current_location: Option<String>,
    pub issues: Option<String>,
}

impl ClientTestInfo {
    pub fn has_active_issue(&self) -> bool {
        self.issues.as_deref().map_or(false, |i| !i.trim().is_empty())
    }

    pub fn is_report_ready(&self) -> bool {
        self.report_status == ReportStatus::Ready
    }
}

/// Input accepted when a lot is received into stock.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewChemical {
    #[validate(custom = "validate_not_blank")]
    pub article_number: String,
    #[validate(custom = "validate_not_blank")]
    pub batch_number: String,
    #[validate(custom = "validate_not_blank")]
    pub chemical_name: String,
    #[validate(length(max = 100))]
    pub hazard_class: Option<String>,
    #[validate(length(max = 20))]
    pub ph: Option<String>,
    pub expiry_date: NaiveDate,
    #[serde(default = "default_reorder_point")]
    #[validate(range(min = 1, message = "Reorder point must be at least 1"))]
    pub reorder_point: i32,
}

fn default_reorder_point() -> i32 {
    DEFAULT_REORDER_POINT
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("required");
        error.message = Some(Cow::from("Field is required"));
        return Err(error);
    }
    Ok(())
}

impl NewChemical {
    pub fn new(
        article_number: impl Into<String>,
        batch_number: impl Into<String>,
        expiry_date: NaiveDate,
        chemical_name: impl Into<String>,
    ) -> Self {
        Self {
            article_number: article_number.into(),
            batch_number: batch_number.into(),
            chemical_name: chemical_name.into(),
            hazard_class: None,
            ph: None,
            expiry_date,
            reorder_point: DEFAULT_REORDER_POINT,
        }
    }

    pub fn with_hazard_class(mut self, hazard_class: impl Into<String>) -> Self {
        self.hazard_class = Some(hazard_class.into());
        self
    }

    pub fn with_ph(mut self, ph: impl Into<String>) -> Self {
        self.ph = Some(ph.into());
        self
    }

    pub fn with_reorder_point(mut self, reorder_point: i32) -> Self {
        self.reorder_point = reorder_point;
        self
    }

    /// Trims key fields and drops blank optional attributes.
    pub fn normalized(self) -> Self {
        let trim_opt = |v: Option<String>| {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        };
        Self {
            article_number: self.article_number.trim().to_string(),
            batch_number: self.batch_number.trim().to_string(),
            chemical_name: self.chemical_name.trim().to_string(),
            hazard_class: trim_opt(self.hazard_class),
            ph: trim_opt(self.ph),
            expiry_date: self.expiry_date,
            reorder_point: self.reorder_point,
        }
    }

    pub fn sample_id(&self) -> String {
        sample_identifier(&self.article_number, &self.batch_number)
    }
}

/// Staff edit of the client test annotations. `None` clears a field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ClientTestUpdate {
    #[validate(length(max = 255))]
    pub client_name: Option<String>,
    #[validate(length(max = 100))]
    pub test_type: Option<String>,
    pub expected_report_date: Option<NaiveDate>,
    #[validate(length(max = 255))]
    pub current_location: Option<String>,
    pub issues: Option<String>,
}
