//! Ledger store interface consumed by the inventory engine.

use async_trait::async_trait;
use chrono::NaiveDate;

use bionexa_models::{Chemical, ClientTestUpdate, Movement, NewChemical};
use bionexa_utils::{BionexaError, BionexaResult};

use crate::repositories::{ChemicalRepository, MovementRepository};
use crate::sqlite::SqlitePool;

/// Persistent storage for chemical lots and their movement ledger.
///
/// `receive` and `dispatch` must each apply the lot write and the paired
/// movement atomically.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn receive(
        &self,
        chemical: &NewChemical,
        barcode_path: &str,
        received_on: NaiveDate,
    ) -> BionexaResult<(Chemical, Movement)>;

    /// Returns `None` when the lot is no longer in stock.
    async fn dispatch(
        &self,
        chemical_id: i64,
        dispatched_on: NaiveDate,
    ) -> BionexaResult<Option<(Chemical, Movement)>>;

    async fn chemical(&self, id: i64) -> BionexaResult<Option<Chemical>>;

    async fn chemical_by_sample_id(&self, sample_id: &str) -> BionexaResult<Option<Chemical>>;

    async fn latest_chemical_for_client(&self, client: &str) -> BionexaResult<Option<Chemical>>;

    async fn chemicals(&self) -> BionexaResult<Vec<Chemical>>;

    /// Movements in insertion order, optionally restricted to one lot.
    async fn movements(&self, chemical_id: Option<i64>) -> BionexaResult<Vec<Movement>>;

    async fn set_written_off(&self, id: i64, written_off: bool) -> BionexaResult<Chemical>;

    async fn update_client_test(&self, id: i64, update: &ClientTestUpdate) -> BionexaResult<Chemical>;

    async fn attach_report(&self, id: i64, report_file_path: &str) -> BionexaResult<Chemical>;

    async fn health_check(&self) -> BionexaResult<()>;
}

#[derive(Clone)]
pub struct SqliteInventoryStore {
    pool: SqlitePool,
    chemicals: ChemicalRepository,
    movements: MovementRepository,
}

impl SqliteInventoryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            chemicals: ChemicalRepository::new(pool.clone()),
            movements: MovementRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl InventoryStore for SqliteInventoryStore {
    async fn receive(
        &self,
        chemical: &NewChemical,
        barcode_path: &str,
        received_on: NaiveDate,
    ) -> BionexaResult<(Chemical, Movement)> {
        self.chemicals
            .insert_received(chemical, barcode_path, received_on)
            .await
    }

    async fn dispatch(
        &self,
        chemical_id: i64,
        dispatched_on: NaiveDate,
    ) -> BionexaResult<Option<(Chemical, Movement)>> {
        self.chemicals.mark_dispatched(chemical_id, dispatched_on).await
    }

    async fn chemical(&self, id: i64) -> BionexaResult<Option<Chemical>> {
        self.chemicals.find_by_id(id).await
    }

    async fn chemical_by_sample_id(&self, sample_id: &str) -> BionexaResult<Option<Chemical>> {
        self.chemicals.find_by_sample_id(sample_id).await
    }

    async fn latest_chemical_for_client(&self, client: &str) -> BionexaResult<Option<Chemical>> {
        self.chemicals.find_latest_by_client(client).await
    }

    async fn chemicals(&self) -> BionexaResult<Vec<Chemical>> {
        self.chemicals.find_all().await
    }

    async fn movements(&self, chemical_id: Option<i64>) -> BionexaResult<Vec<Movement>> {
        match chemical_id {
            Some(id) => self.movements.find_by_chemical(id).await,
            None => self.movements.find_all().await,
        }
    }

    async fn set_written_off(&self, id: i64, written_off: bool) -> BionexaResult<Chemical> {
        self.chemicals.set_written_off(id, written_off).await
    }

    async fn update_client_test(&self, id: i64, update: &ClientTestUpdate) -> BionexaResult<Chemical> {
        self.chemicals.update_client_test(id, update).await
    }

    async fn attach_report(&self, id: i64, report_file_path: &str) -> BionexaResult<Chemical> {
        self.chemicals.attach_report(id, report_file_path).await
    }

    async fn health_check(&self) -> BionexaResult<()> {
        crate::sqlite::health_check(&self.pool)
            .await
            .map_err(|e| BionexaError::store(e.to_string()))
    }
}
