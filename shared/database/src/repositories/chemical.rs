//! Chemical Repository
//!
//! CRUD operations for chemical lots. Receipt and dispatch write the lot and
//! its movement in one transaction.

use chrono::NaiveDate;
use sqlx::{FromRow, SqliteConnection, SqlitePool};

use bionexa_models::{
    Chemical, ChemicalStatus, ClientTestInfo, ClientTestUpdate, Movement, MovementType, NewChemical,
    ReportStatus,
};
use bionexa_utils::{BionexaError, BionexaResult};

use super::movement::MovementRepository;

macro_rules! select_chemicals {
    ($tail:literal) => {
        concat!(
            r#"
            SELECT id, article_number, batch_number, chemical_name, hazard_class, ph,
                   expiry_date, reorder_point, status, written_off, barcode_path,
                   client_name, test_type, expected_report_date, report_status,
                   report_file_path, current_location, issues
            FROM chemicals
            "#,
            $tail
        )
    };
}

#[derive(Clone)]
pub struct ChemicalRepository {
    pool: SqlitePool,
}

impl ChemicalRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a lot in stock together with its `received` movement.
    pub async fn insert_received(
        &self,
        chemical: &NewChemical,
        barcode_path: &str,
        received_on: NaiveDate,
    ) -> BionexaResult<(Chemical, Movement)> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query(
            r#"
            INSERT INTO chemicals
                (article_number, batch_number, sample_id, chemical_name, hazard_class, ph,
                 expiry_date, reorder_point, status, written_off, barcode_path, report_status)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?)
            "#,
        )
        .bind(&chemical.article_number)
        .bind(&chemical.batch_number)
        .bind(chemical.sample_id())
        .bind(&chemical.chemical_name)
        .bind(&chemical.hazard_class)
        .bind(&chemical.ph)
        .bind(chemical.expiry_date)
        .bind(chemical.reorder_point)
        .bind(ChemicalStatus::InStock.as_str())
        .bind(barcode_path)
        .bind(ReportStatus::NotReady.as_str())
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        let movement =
            MovementRepository::insert_with(&mut *tx, id, MovementType::Received, received_on).await?;
        let created = Self::fetch_with(&mut *tx, id).await?;

        tx.commit().await?;
        Ok((created, movement))
    }

    /// Move an in-stock lot to `dispatched` and append the movement.
    ///
    /// The status update only matches rows still `in_stock`, so of two racing
    /// dispatchers exactly one sees an affected row. `None` means the lot was
    /// not in stock when the update ran.
    pub async fn mark_dispatched(
        &self,
        id: i64,
        dispatched_on: NaiveDate,
    ) -> BionexaResult<Option<(Chemical, Movement)>> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE chemicals SET status = ? WHERE id = ? AND status = ?")
            .bind(ChemicalStatus::Dispatched.as_str())
            .bind(id)
            .bind(ChemicalStatus::InStock.as_str())
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let movement =
            MovementRepository::insert_with(&mut *tx, id, MovementType::Dispatched, dispatched_on)
                .await?;
        let updated = Self::fetch_with(&mut *tx, id).await?;

        tx.commit().await?;
        Ok(Some((updated, movement)))
    }

    pub async fn find_by_id(&self, id: i64) -> BionexaResult<Option<Chemical>> {
        let row: Option<ChemicalRow> = sqlx::query_as(select_chemicals!("WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Chemical::try_from).transpose()
    }

    /// Indexed lookup on the stored sample identifier.
    pub async fn find_by_sample_id(&self, sample_id: &str) -> BionexaResult<Option<Chemical>> {
        let row: Option<ChemicalRow> = sqlx::query_as(select_chemicals!("WHERE sample_id = ?"))
            .bind(sample_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Chemical::try_from).transpose()
    }

    /// Most recently created lot whose client name contains `client` (case-insensitive).
    pub async fn find_latest_by_client(&self, client: &str) -> BionexaResult<Option<Chemical>> {
        let row: Option<ChemicalRow> = sqlx::query_as(select_chemicals!(
            r#"
            WHERE client_name IS NOT NULL
              AND instr(lower(client_name), lower(?)) > 0
            ORDER BY id DESC
            LIMIT 1
            "#
        ))
        .bind(client)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Chemical::try_from).transpose()
    }

    pub async fn find_all(&self) -> BionexaResult<Vec<Chemical>> {
        let rows: Vec<ChemicalRow> = sqlx::query_as(select_chemicals!("ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Chemical::try_from).collect()
    }

    pub async fn set_written_off(&self, id: i64, written_off: bool) -> BionexaResult<Chemical> {
        let result = sqlx::query("UPDATE chemicals SET written_off = ? WHERE id = ?")
            .bind(written_off)
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.updated(id, result.rows_affected()).await
    }

    pub async fn update_client_test(
        &self,
        id: i64,
        update: &ClientTestUpdate,
    ) -> BionexaResult<Chemical> {
        let result = sqlx::query(
            r#"
            UPDATE chemicals
            SET client_name = ?, test_type = ?, expected_report_date = ?,
                current_location = ?, issues = ?
            WHERE id = ?
            "#,
        )
        .bind(&update.client_name)
        .bind(&update.test_type)
        .bind(update.expected_report_date)
        .bind(&update.current_location)
        .bind(&update.issues)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.updated(id, result.rows_affected()).await
    }

    /// Record the report file and mark the report ready for collection.
    pub async fn attach_report(&self, id: i64, report_file_path: &str) -> BionexaResult<Chemical> {
        let result = sqlx::query(
            "UPDATE chemicals SET report_file_path = ?, report_status = ? WHERE id = ?",
        )
        .bind(report_file_path)
        .bind(ReportStatus::Ready.as_str())
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.updated(id, result.rows_affected()).await
    }

    async fn updated(&self, id: i64, rows_affected: u64) -> BionexaResult<Chemical> {
        if rows_affected == 0 {
            return Err(BionexaError::not_found(format!("chemical {}", id)));
        }
        self.find_by_id(id)
            .await?
            .ok_or_else(|| BionexaError::not_found(format!("chemical {}", id)))
    }

    async fn fetch_with(conn: &mut SqliteConnection, id: i64) -> BionexaResult<Chemical> {
        let row: ChemicalRow = sqlx::query_as(select_chemicals!("WHERE id = ?"))
            .bind(id)
            .fetch_one(&mut *conn)
            .await?;

        Chemical::try_from(row)
    }
}

#[derive(Debug, FromRow)]
struct ChemicalRow {
    id: i64,
    article_number: String,
    batch_number: String,
    chemical_name: String,
    hazard_class: Option<String>,
    ph: Option<String>,
    expiry_date: NaiveDate,
    reorder_point: i64,
    status: String,
    written_off: bool,
    barcode_path: Option<String>,
    client_name: Option<String>,
    test_type: Option<String>,
    expected_report_date: Option<NaiveDate>,
    report_status: String,
    report_file_path: Option<String>,
    current_location: Option<String>,
    issues: Option<String>,
}

impl TryFrom<ChemicalRow> for Chemical {
    type Error = BionexaError;

    fn try_from(row: ChemicalRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<ChemicalStatus>()
            .map_err(|e| BionexaError::store(e.to_string()))?;
        let report_status = row
            .report_status
            .parse::<ReportStatus>()
            .map_err(|e| BionexaError::store(e.to_string()))?;
        let reorder_point = i32::try_from(row.reorder_point)
            .map_err(|_| BionexaError::store(format!("reorder_point out of range: {}", row.reorder_point)))?;

        Ok(Self {
            id: row.id,
            article_number: row.article_number,
            batch_number: row.batch_number,
            chemical_name: row.chemical_name,
            hazard_class: row.hazard_class,
            ph: row.ph,
            expiry_date: row.expiry_date,
            reorder_point,
            status,
            written_off: row.written_off,
            barcode_path: row.barcode_path,
            client: ClientTestInfo {
                client_name: row.client_name,
                test_type: row.test_type,
                expected_report_date: row.expected_report_date,
                report_status,
                report_file_path: row.report_file_path,
                current_location: row.current_location,
                issues: row.issues,
            },
        })
    }
}
