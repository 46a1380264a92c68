//! CSV export of the inventory table.

use serde::Serialize;

use bionexa_models::InventoryRow;
use bionexa_utils::{BionexaError, BionexaResult};

#[derive(Debug, Serialize)]
struct CsvRecord<'a> {
    #[serde(rename = "ID")]
    id: i64,
    #[serde(rename = "Chemical Name")]
    chemical_name: &'a str,
    #[serde(rename = "Article Number")]
    article_number: &'a str,
    #[serde(rename = "Batch Number")]
    batch_number: &'a str,
    #[serde(rename = "Expiry Date")]
    expiry_date: String,
    #[serde(rename = "Days to Expiry")]
    days_to_expiry: i64,
    #[serde(rename = "Expiry Status")]
    expiry_status: &'static str,
    #[serde(rename = "Status")]
    status: &'static str,
    #[serde(rename = "Written Off")]
    written_off: &'static str,
    #[serde(rename = "Hazard Class")]
    hazard_class: &'a str,
    #[serde(rename = "pH")]
    ph: &'a str,
    #[serde(rename = "Reorder Point")]
    reorder_point: i32,
    #[serde(rename = "Barcode Path")]
    barcode_path: &'a str,
}

impl<'a> From<&'a InventoryRow> for CsvRecord<'a> {
    fn from(row: &'a InventoryRow) -> Self {
        Self {
            id: row.id,
            chemical_name: &row.chemical_name,
            article_number: &row.article_number,
            batch_number: &row.batch_number,
            expiry_date: row.expiry_date.format("%Y-%m-%d").to_string(),
            days_to_expiry: row.days_to_expiry,
            expiry_status: row.expiry_status.as_str(),
            status: row.status.as_str(),
            written_off: if row.written_off { "Yes" } else { "No" },
            hazard_class: row.hazard_class.as_deref().unwrap_or(""),
            ph: row.ph.as_deref().unwrap_or(""),
            reorder_point: row.reorder_point,
            barcode_path: row.barcode_path.as_deref().unwrap_or(""),
        }
    }
}

pub fn inventory_csv(rows: &[InventoryRow]) -> BionexaResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(CsvRecord::from(row))?;
    }
    writer
        .into_inner()
        .map_err(|e| BionexaError::internal(format!("CSV flush failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bionexa_models::{ChemicalStatus, ExpiryStatus};
    use chrono::NaiveDate;

    fn row() -> InventoryRow {
        InventoryRow {
            id: 1,
            chemical_name: "Acetone, technical".to_string(),
            article_number: "ACE-1".to_string(),
            batch_number: "B-1".to_string(),
            expiry_date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            days_to_expiry: 16,
            expiry_status: ExpiryStatus::ExpiringSoon,
            status: ChemicalStatus::InStock,
            written_off: true,
            hazard_class: Some("Flammable".to_string()),
            ph: None,
            barcode_path: Some("static/barcodes/ACE-1-B-1.png".to_string()),
            reorder_point: 5,
        }
    }

    #[test]
    fn test_csv_has_header_and_quoted_fields() {
        let bytes = inventory_csv(&[row()]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next().unwrap(),
            "ID,Chemical Name,Article Number,Batch Number,Expiry Date,Days to Expiry,\
             Expiry Status,Status,Written Off,Hazard Class,pH,Reorder Point,Barcode Path"
        );
        assert_eq!(
            lines.next().unwrap(),
            "1,\"Acetone, technical\",ACE-1,B-1,2025-05-01,16,Expiring Soon,in_stock,Yes,\
             Flammable,,5,static/barcodes/ACE-1-B-1.png"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_empty_export_is_empty() {
        assert!(inventory_csv(&[]).unwrap().is_empty());
    }
}
