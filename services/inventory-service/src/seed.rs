//! Demo data for local development and walkthroughs.
//!
//! Seeding goes through [`InventoryService`] so every seeded lot gets a
//! barcode and a `received` movement like any scanned receipt. Values are
//! derived from the lot index, which keeps repeated runs reproducible.

use chrono::{Duration, NaiveDate};
use tracing::{info, warn};

use bionexa_models::{ClientTestUpdate, NewChemical};
use bionexa_utils::{BionexaError, BionexaResult};

use crate::service::InventoryService;

const SUPPLIERS: [&str; 4] = ["MERCK", "SIGMA", "BIO", "CHEM"];

/// Name, hazard class and pH of each catalogue chemical.
const CATALOGUE: [(&str, &str, &str); 8] = [
    ("Acetone", "Flammable", "7.0"),
    ("Sodium Hydroxide", "Corrosive", "14"),
    ("Hydrochloric Acid", "Corrosive", "1"),
    ("Ethanol", "Flammable", "7.2"),
    ("Potassium Permanganate", "Oxidizer", "7"),
    ("Ammonium Nitrate", "Explosive", "5.5"),
    ("Formaldehyde", "Toxic", "3.5"),
    ("Phenol", "Toxic", "6.0"),
];

pub const DEFAULT_SEED_COUNT: usize = 20;
const MAX_BACKDATE_DAYS: i64 = 10;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub received: usize,
    /// Lots already registered by an earlier run.
    pub skipped: usize,
}

impl SeedReport {
    fn record(&mut self, outcome: BionexaResult<()>) -> BionexaResult<()> {
        match outcome {
            Ok(()) => self.received += 1,
            Err(BionexaError::Conflict { .. }) => self.skipped += 1,
            Err(e) => return Err(e),
        }
        Ok(())
    }
}

fn catalogue_lot(index: usize, today: NaiveDate) -> (NewChemical, NaiveDate) {
    let (name, hazard, ph) = CATALOGUE[index % CATALOGUE.len()];
    let supplier = SUPPLIERS[index % SUPPLIERS.len()];
    let prefix: String = name.chars().take(3).collect::<String>().to_uppercase();

    let article = format!("{}-{}-{:03}", supplier, prefix, index + 1);
    let batch = format!("BATCH-{}", 1000 + (index * 7919) % 9000);
    // spread expiry from two months past to a year ahead
    let expiry = today + Duration::days((index as i64 * 37) % 426 - 60);
    let reorder_point = 3 + (index % 8) as i32;
    let received_on = today - Duration::days(index as i64 % (MAX_BACKDATE_DAYS + 1));

    let lot = NewChemical::new(article, batch, expiry, name)
        .with_hazard_class(hazard)
        .with_ph(ph)
        .with_reorder_point(reorder_point);
    (lot, received_on)
}

/// Receives `count` catalogue lots with receipts backdated up to ten days.
pub async fn seed_inventory(
    service: &InventoryService,
    count: usize,
    today: NaiveDate,
) -> BionexaResult<SeedReport> {
    let mut report = SeedReport::default();
    for index in 0..count {
        let (lot, received_on) = catalogue_lot(index, today);
        let outcome = service.receive_on(lot, received_on).await.map(|_| ());
        report.record(outcome)?;
    }

    info!(received = report.received, skipped = report.skipped, "Inventory seeded");
    Ok(report)
}

struct PortalSample {
    article: &'static str,
    batch: &'static str,
    chemical: &'static str,
    test_type: &'static str,
    report_in_days: i64,
    client: &'static str,
    location: &'static str,
    issues: Option<&'static str>,
    report_file: Option<&'static str>,
}

const PORTAL_SAMPLES: [PortalSample; 3] = [
    PortalSample {
        article: "TEST-ACE-001",
        batch: "BATCH-1001",
        chemical: "Acetone",
        test_type: "GC-MS",
        report_in_days: 2,
        client: "client1@example.com",
        location: "GC-MS Room 1",
        issues: None,
        report_file: None,
    },
    PortalSample {
        article: "TEST-FOR-002",
        batch: "BATCH-1002",
        chemical: "Formaldehyde",
        test_type: "Titration",
        report_in_days: 3,
        client: "client2@example.com",
        location: "Chem Lab 2",
        issues: Some("Instrument undergoing calibration"),
        report_file: None,
    },
    PortalSample {
        article: "TEST-NAOH-003",
        batch: "BATCH-1003",
        chemical: "Sodium Hydroxide",
        test_type: "pH Test",
        report_in_days: -1,
        client: "client3@example.com",
        location: "Wet Chemistry Bench 1",
        issues: None,
        report_file: Some("naoh_003_report.pdf"),
    },
];

const PLACEHOLDER_REPORT: &[u8] = b"%PDF-1.4\n% Bionexa placeholder report\n%%EOF\n";

/// Registers three client samples covering the portal states: in progress,
/// held up by an issue, and ready with a downloadable report.
pub async fn seed_client_portal(service: &InventoryService, today: NaiveDate) -> BionexaResult<SeedReport> {
    let mut report = SeedReport::default();
    for sample in &PORTAL_SAMPLES {
        let outcome = seed_portal_sample(service, sample, today).await;
        if let Err(e) = &outcome {
            if !e.is_warning() {
                warn!(sample = sample.article, error = %e, "Portal sample seeding failed");
            }
        }
        report.record(outcome)?;
    }

    info!(received = report.received, skipped = report.skipped, "Client portal samples seeded");
    Ok(report)
}

async fn seed_portal_sample(service: &InventoryService, sample: &PortalSample, today: NaiveDate) -> BionexaResult<()> {
    let hazard = if sample.chemical == "Acetone" { "Flammable" } else { "Corrosive" };
    let lot = NewChemical::new(sample.article, sample.batch, today + Duration::days(365), sample.chemical)
        .with_hazard_class(hazard)
        .with_ph("7.0");
    let chemical = service.receive_on(lot, today).await?;

    let update = ClientTestUpdate {
        client_name: Some(sample.client.to_string()),
        test_type: Some(sample.test_type.to_string()),
        expected_report_date: Some(today + Duration::days(sample.report_in_days)),
        current_location: Some(sample.location.to_string()),
        issues: sample.issues.map(str::to_string),
    };
    service.update_client_test(chemical.id, update).await?;

    if let Some(file_name) = sample.report_file {
        service
            .attach_report(&chemical.sample_id(), file_name, PLACEHOLDER_REPORT)
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use bionexa_database::{create_memory_pool, run_sqlite_migrations, SqliteInventoryStore};
    use bionexa_models::{MovementType, ReportStatus};
    use tempfile::TempDir;

    use crate::barcode::Code128Encoder;

    async fn service() -> (InventoryService, TempDir) {
        let pool = create_memory_pool().await.unwrap();
        run_sqlite_migrations(&pool).await.unwrap();
        let dir = TempDir::new().unwrap();
        let service = InventoryService::new(
            Arc::new(SqliteInventoryStore::new(pool)),
            Arc::new(Code128Encoder::new(dir.path().join("barcodes"))),
            dir.path().join("reports"),
        );
        (service, dir)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[tokio::test]
    async fn test_seed_inventory_receives_backdated_lots() {
        let (service, _dir) = service().await;

        let report = seed_inventory(&service, DEFAULT_SEED_COUNT, today()).await.unwrap();
        assert_eq!(report, SeedReport { received: 20, skipped: 0 });

        let movements = service.movement_history(None).await.unwrap();
        assert_eq!(movements.len(), 20);
        let earliest = today() - Duration::days(MAX_BACKDATE_DAYS);
        assert!(movements.iter().all(|m| m.movement_type == MovementType::Received));
        assert!(movements.iter().all(|m| m.timestamp >= earliest && m.timestamp <= today()));

        let first = service.client_lookup(Some("MERCK-ACE-001-BATCH-1000"), None).await.unwrap();
        assert_eq!(first.chemical_name, "Acetone");
    }

    #[tokio::test]
    async fn test_seed_inventory_rerun_skips_existing_lots() {
        let (service, _dir) = service().await;
        seed_inventory(&service, 5, today()).await.unwrap();

        let report = seed_inventory(&service, 5, today()).await.unwrap();
        assert_eq!(report, SeedReport { received: 0, skipped: 5 });
        assert_eq!(service.movement_history(None).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_seed_client_portal_covers_portal_states() {
        let (service, _dir) = service().await;

        let report = seed_client_portal(&service, today()).await.unwrap();
        assert_eq!(report.received, 3);

        let ready = service.client_lookup(None, Some("client3@example.com")).await.unwrap();
        assert_eq!(ready.sample_id, "TEST-NAOH-003-BATCH-1003");
        assert_eq!(ready.report_status, ReportStatus::Ready);
        assert!(ready.report_download.is_some());

        let held = service.client_lookup(None, Some("client2@example.com")).await.unwrap();
        assert!(held.has_issue);
        assert_eq!(held.report_status, ReportStatus::NotReady);
        assert_eq!(held.expected_report_date, Some(today() + Duration::days(3)));

        let again = seed_client_portal(&service, today()).await.unwrap();
        assert_eq!(again, SeedReport { received: 0, skipped: 3 });
    }
}
