//! Derived views backing the staff inventory dashboard.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::chemical::{Chemical, ChemicalStatus};
use crate::expiry::{days_to_expiry, ExpiryPolicy, ExpiryStatus};
use crate::stock::{compute_low_stock_with, stock_levels};

/// A chemical lot annotated with its expiry derivations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRow {
    pub id: i64,
    pub chemical_name: String,
    pub article_number: String,
    pub batch_number: String,
    pub expiry_date: NaiveDate,
    pub days_to_expiry: i64,
    pub expiry_status: ExpiryStatus,
    pub status: ChemicalStatus,
    pub written_off: bool,
    pub hazard_class: Option<String>,
    pub ph: Option<String>,
    pub barcode_path: Option<String>,
    pub reorder_point: i32,
}

impl InventoryRow {
    pub fn from_chemical(chemical: &Chemical, today: NaiveDate, policy: &ExpiryPolicy) -> Self {
        let days = days_to_expiry(chemical.expiry_date, today);
        Self {
            id: chemical.id,
            chemical_name: chemical.chemical_name.clone(),
            article_number: chemical.article_number.clone(),
            batch_number: chemical.batch_number.clone(),
            expiry_date: chemical.expiry_date,
            days_to_expiry: days,
            expiry_status: policy.classify(days),
            status: chemical.status,
            written_off: chemical.written_off,
            hazard_class: chemical.hazard_class.clone(),
            ph: chemical.ph.clone(),
            barcode_path: chemical.barcode_path.clone(),
            reorder_point: chemical.reorder_point,
        }
    }
}

/// Column filters; `None` leaves that column unfiltered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryFilter {
    pub statuses: Option<BTreeSet<ChemicalStatus>>,
    pub expiry_statuses: Option<BTreeSet<ExpiryStatus>>,
    pub hazard_classes: Option<BTreeSet<String>>,
}

impl InventoryFilter {
    pub fn matches(&self, row: &InventoryRow) -> bool {
        let status_ok = self
            .statuses
            .as_ref()
            .map_or(true, |s| s.contains(&row.status));
        let expiry_ok = self
            .expiry_statuses
            .as_ref()
            .map_or(true, |s| s.contains(&row.expiry_status));
        let hazard_ok = self.hazard_classes.as_ref().map_or(true, |s| {
            row.hazard_class.as_ref().map_or(false, |h| s.contains(h))
        });
        status_ok && expiry_ok && hazard_ok
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_none() && self.expiry_statuses.is_none() && self.hazard_classes.is_none()
    }
}

pub fn inventory_rows(
    chemicals: &[Chemical],
    today: NaiveDate,
    policy: &ExpiryPolicy,
    filter: &InventoryFilter,
) -> Vec<InventoryRow> {
    chemicals
        .iter()
        .map(|c| InventoryRow::from_chemical(c, today, policy))
        .filter(|row| filter.matches(row))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventorySummary {
    pub total_lots: usize,
    pub expiry_counts: BTreeMap<String, usize>,
    pub stock_levels: BTreeMap<String, usize>,
    pub low_stock: BTreeMap<String, bool>,
    pub hazard_counts: BTreeMap<String, usize>,
    pub status_counts: BTreeMap<String, usize>,
    /// Lots per expiry month, keyed `YYYY-MM`.
    pub expiry_by_month: BTreeMap<String, usize>,
}

impl InventorySummary {
    pub fn build(
        chemicals: &[Chemical],
        today: NaiveDate,
        policy: &ExpiryPolicy,
        low_stock_threshold: usize,
    ) -> Self {
        let mut summary = Self {
            total_lots: chemicals.len(),
            stock_levels: stock_levels(chemicals),
            low_stock: compute_low_stock_with(chemicals, low_stock_threshold),
            ..Self::default()
        };

        for chemical in chemicals {
            let expiry = policy.status_of(chemical.expiry_date, today);
            *summary.expiry_counts.entry(expiry.to_string()).or_insert(0) += 1;
            *summary.status_counts.entry(chemical.status.to_string()).or_insert(0) += 1;
            if let Some(hazard) = &chemical.hazard_class {
                *summary.hazard_counts.entry(hazard.clone()).or_insert(0) += 1;
            }
            let month = chemical.expiry_date.format("%Y-%m").to_string();
            *summary.expiry_by_month.entry(month).or_insert(0) += 1;
        }

        summary
    }

    /// Names currently flagged for reorder.
    pub fn low_stock_names(&self) -> Vec<&str> {
        self.low_stock
            .iter()
            .filter(|(_, low)| **low)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chemical::ClientTestInfo;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 15).unwrap()
    }

    fn lot(id: i64, name: &str, hazard: Option<&str>, expires_in: i64, status: ChemicalStatus) -> Chemical {
        Chemical {
            id,
            article_number: format!("ART-{:03}", id),
            batch_number: "BATCH-1000".to_string(),
            chemical_name: name.to_string(),
            hazard_class: hazard.map(str::to_string),
            ph: None,
            expiry_date: today() + Duration::days(expires_in),
            reorder_point: 5,
            status,
            written_off: false,
            barcode_path: None,
            client: ClientTestInfo::default(),
        }
    }

    fn sample() -> Vec<Chemical> {
        vec![
            lot(1, "Acetone", Some("Flammable"), -3, ChemicalStatus::InStock),
            lot(2, "Acetone", Some("Flammable"), 10, ChemicalStatus::Dispatched),
            lot(3, "Phenol", Some("Toxic"), 200, ChemicalStatus::InStock),
            lot(4, "Water", None, 400, ChemicalStatus::InStock),
        ]
    }

    #[test]
    fn test_rows_carry_expiry_derivations() {
        let rows = inventory_rows(&sample(), today(), &ExpiryPolicy::default(), &InventoryFilter::default());
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].days_to_expiry, -3);
        assert_eq!(rows[0].expiry_status, ExpiryStatus::Expired);
        assert_eq!(rows[1].expiry_status, ExpiryStatus::ExpiringSoon);
        assert_eq!(rows[2].expiry_status, ExpiryStatus::Valid);
    }

    #[test]
    fn test_filter_by_status_and_hazard() {
        let filter = InventoryFilter {
            statuses: Some([ChemicalStatus::InStock].into_iter().collect()),
            hazard_classes: Some(["Flammable".to_string(), "Toxic".to_string()].into_iter().collect()),
            ..InventoryFilter::default()
        };
        assert!(!filter.is_empty());
        assert!(InventoryFilter::default().is_empty());
        let rows = inventory_rows(&sample(), today(), &ExpiryPolicy::default(), &filter);
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        // lot 4 has no hazard class and drops out once hazards are filtered
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_summary_counts() {
        let summary = InventorySummary::build(&sample(), today(), &ExpiryPolicy::default(), 5);
        assert_eq!(summary.total_lots, 4);
        assert_eq!(summary.expiry_counts.get("Expired"), Some(&1));
        assert_eq!(summary.expiry_counts.get("Expiring Soon"), Some(&1));
        assert_eq!(summary.expiry_counts.get("Valid"), Some(&2));
        assert_eq!(summary.stock_levels.get("Acetone"), Some(&1));
        assert_eq!(summary.status_counts.get("dispatched"), Some(&1));
        assert_eq!(summary.hazard_counts.get("Flammable"), Some(&2));
        assert_eq!(summary.hazard_counts.len(), 2);
        assert_eq!(summary.expiry_by_month.get("2025-04"), Some(&2));
        assert_eq!(summary.low_stock_names(), vec!["Acetone", "Phenol", "Water"]);
    }
}
