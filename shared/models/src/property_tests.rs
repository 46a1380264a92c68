//! Property-based tests for the inventory derivations.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;

use crate::{
    compute_expiry_status, compute_low_stock, days_to_expiry, stock_levels, Chemical,
    ChemicalStatus, ClientTestInfo, ExpiryStatus,
};

prop_compose! {
    fn arb_date()(offset in 0i64..20_000) -> NaiveDate {
        NaiveDate::from_ymd_opt(2000, 1, 1).unwrap() + Duration::days(offset)
    }
}

fn arb_status() -> impl Strategy<Value = ChemicalStatus> {
    prop_oneof![Just(ChemicalStatus::InStock), Just(ChemicalStatus::Dispatched)]
}

prop_compose! {
    fn arb_chemical()(
        id in 1i64..10_000,
        name in prop::sample::select(vec!["Acetone", "Ethanol", "Phenol", "Formaldehyde"]),
        status in arb_status(),
        expiry_date in arb_date(),
    ) -> Chemical {
        Chemical {
            id,
            article_number: format!("CHEM-{}", id),
            batch_number: "BATCH-1000".to_string(),
            chemical_name: name.to_string(),
            hazard_class: None,
            ph: None,
            expiry_date,
            reorder_point: 5,
            status,
            written_off: false,
            barcode_path: None,
            client: ClientTestInfo::default(),
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_expiry_status_matches_day_offset(chemical in arb_chemical(), today in arb_date()) {
        let days = days_to_expiry(chemical.expiry_date, today);
        let status = compute_expiry_status(&chemical, today);
        match status {
            ExpiryStatus::Expired => prop_assert!(days < 0),
            ExpiryStatus::ExpiringSoon => prop_assert!((0..=30).contains(&days)),
            ExpiryStatus::Valid => prop_assert!(days > 30),
        }
    }

    #[test]
    fn prop_expiry_status_never_improves_with_time(chemical in arb_chemical(), today in arb_date(), step in 0i64..400) {
        let earlier = compute_expiry_status(&chemical, today);
        let later = compute_expiry_status(&chemical, today + Duration::days(step));
        // Expired < ExpiringSoon < Valid
        prop_assert!(later <= earlier);
    }

    #[test]
    fn prop_low_stock_covers_exactly_stocked_names(chemicals in prop::collection::vec(arb_chemical(), 0..40)) {
        let levels = stock_levels(&chemicals);
        let low = compute_low_stock(&chemicals);

        prop_assert_eq!(levels.len(), low.len());
        for (name, count) in &levels {
            let in_stock = chemicals
                .iter()
                .filter(|c| c.chemical_name == *name && c.status == ChemicalStatus::InStock)
                .count();
            prop_assert_eq!(*count, in_stock);
            prop_assert_eq!(low[name], *count <= 5);
        }
    }
}
