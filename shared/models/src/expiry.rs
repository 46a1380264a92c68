//! Expiry classification of chemical lots.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::chemical::Chemical;
use crate::UnknownVariant;

pub const DEFAULT_EXPIRING_SOON_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExpiryStatus {
    #[serde(rename = "Expired")]
    Expired,
    #[serde(rename = "Expiring Soon")]
    ExpiringSoon,
    #[serde(rename = "Valid")]
    Valid,
}

impl ExpiryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expired => "Expired",
            Self::ExpiringSoon => "Expiring Soon",
            Self::Valid => "Valid",
        }
    }
}

impl fmt::Display for ExpiryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpiryStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Expired" => Ok(Self::Expired),
            "Expiring Soon" => Ok(Self::ExpiringSoon),
            "Valid" => Ok(Self::Valid),
            other => Err(UnknownVariant::new("expiry_status", other)),
        }
    }
}

/// Whole calendar days from `reference_date` until `expiry_date`; negative once past.
pub fn days_to_expiry(expiry_date: NaiveDate, reference_date: NaiveDate) -> i64 {
    (expiry_date - reference_date).num_days()
}

/// Classifies a lot with the standard 30-day "Expiring Soon" window.
pub fn compute_expiry_status(chemical: &Chemical, reference_date: NaiveDate) -> ExpiryStatus {
    ExpiryPolicy::default().status_of(chemical.expiry_date, reference_date)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryPolicy {
    pub expiring_soon_days: i64,
}

impl ExpiryPolicy {
    pub fn new(expiring_soon_days: i64) -> Self {
        Self { expiring_soon_days }
    }

    pub fn classify(&self, days_to_expiry: i64) -> ExpiryStatus {
        if days_to_expiry < 0 {
            ExpiryStatus::Expired
        } else if days_to_expiry <= self.expiring_soon_days {
            ExpiryStatus::ExpiringSoon
        } else {
            ExpiryStatus::Valid
        }
    }

    pub fn status_of(&self, expiry_date: NaiveDate, reference_date: NaiveDate) -> ExpiryStatus {
        self.classify(days_to_expiry(expiry_date, reference_date))
    }
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_EXPIRING_SOON_DAYS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chemical::{ChemicalStatus, ClientTestInfo};
    use chrono::Duration;

    fn lot_expiring(expiry_date: NaiveDate) -> Chemical {
        Chemical {
            id: 1,
            article_number: "ACE-1".to_string(),
            batch_number: "B-1".to_string(),
            chemical_name: "Acetone".to_string(),
            hazard_class: Some("Flammable".to_string()),
            ph: Some("7.0".to_string()),
            expiry_date,
            reorder_point: 5,
            status: ChemicalStatus::InStock,
            written_off: false,
            barcode_path: None,
            client: ClientTestInfo::default(),
        }
    }

    #[test]
    fn test_expiry_boundaries() {
        let today = NaiveDate::from_ymd_opt(2025, 4, 15).unwrap();
        let status = |offset: i64| compute_expiry_status(&lot_expiring(today + Duration::days(offset)), today);

        assert_eq!(status(-1), ExpiryStatus::Expired);
        assert_eq!(status(0), ExpiryStatus::ExpiringSoon);
        assert_eq!(status(30), ExpiryStatus::ExpiringSoon);
        assert_eq!(status(31), ExpiryStatus::Valid);
    }

    #[test]
    fn test_days_to_expiry_across_year_end() {
        let today = NaiveDate::from_ymd_opt(2024, 12, 20).unwrap();
        let expiry = NaiveDate::from_ymd_opt(2025, 1, 9).unwrap();
        assert_eq!(days_to_expiry(expiry, today), 20);
        assert_eq!(days_to_expiry(today, expiry), -20);
    }

    #[test]
    fn test_parse_display_names() {
        assert_eq!("Expiring Soon".parse::<ExpiryStatus>(), Ok(ExpiryStatus::ExpiringSoon));
        assert!("expiring_soon".parse::<ExpiryStatus>().is_err());
    }

    #[test]
    fn test_custom_window() {
        let policy = ExpiryPolicy::new(7);
        assert_eq!(policy.classify(7), ExpiryStatus::ExpiringSoon);
        assert_eq!(policy.classify(8), ExpiryStatus::Valid);
    }
}
