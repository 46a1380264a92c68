//! Stock level and reorder derivations over the full set of lots.

use std::collections::BTreeMap;

use crate::chemical::Chemical;

pub const DEFAULT_LOW_STOCK_THRESHOLD: usize = 5;

/// Number of in-stock lots per chemical name. Names with no in-stock lot are absent.
pub fn stock_levels(chemicals: &[Chemical]) -> BTreeMap<String, usize> {
    let mut levels = BTreeMap::new();
    for chemical in chemicals.iter().filter(|c| c.is_in_stock()) {
        *levels.entry(chemical.chemical_name.clone()).or_insert(0) += 1;
    }
    levels
}

/// Flags each stocked chemical name whose in-stock count is at or below five.
pub fn compute_low_stock(chemicals: &[Chemical]) -> BTreeMap<String, bool> {
    compute_low_stock_with(chemicals, DEFAULT_LOW_STOCK_THRESHOLD)
}

pub fn compute_low_stock_with(chemicals: &[Chemical], threshold: usize) -> BTreeMap<String, bool> {
    stock_levels(chemicals)
        .into_iter()
        .map(|(name, count)| (name, count <= threshold))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chemical::{ChemicalStatus, ClientTestInfo};
    use chrono::NaiveDate;

    fn lots(name: &str, count: usize, status: ChemicalStatus) -> Vec<Chemical> {
        (0..count)
            .map(|i| Chemical {
                id: i as i64,
                article_number: format!("{}-{}", &name[..3].to_uppercase(), i),
                batch_number: "BATCH-1000".to_string(),
                chemical_name: name.to_string(),
                hazard_class: None,
                ph: None,
                expiry_date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
                reorder_point: 5,
                status,
                written_off: false,
                barcode_path: None,
                client: ClientTestInfo::default(),
            })
            .collect()
    }

    #[test]
    fn test_low_stock_threshold() {
        let mut chemicals = lots("Acetone", 5, ChemicalStatus::InStock);
        chemicals.extend(lots("Ethanol", 6, ChemicalStatus::InStock));

        let low = compute_low_stock(&chemicals);
        assert_eq!(low.get("Acetone"), Some(&true));
        assert_eq!(low.get("Ethanol"), Some(&false));
    }

    #[test]
    fn test_dispatched_lots_do_not_count() {
        let mut chemicals = lots("Ethanol", 5, ChemicalStatus::InStock);
        chemicals.extend(lots("Ethanol", 3, ChemicalStatus::Dispatched));
        chemicals.extend(lots("Phenol", 2, ChemicalStatus::Dispatched));

        assert_eq!(stock_levels(&chemicals).get("Ethanol"), Some(&5));
        let low = compute_low_stock(&chemicals);
        assert_eq!(low.get("Ethanol"), Some(&true));
        assert!(!low.contains_key("Phenol"));
    }
}
