//! Movement Repository
//!
//! Append-only ledger of receive/dispatch events. There is no update or delete.

use chrono::NaiveDate;
use sqlx::{FromRow, SqliteConnection, SqlitePool};

use bionexa_models::{Movement, MovementType};
use bionexa_utils::{BionexaError, BionexaResult};

#[derive(Clone)]
pub struct MovementRepository {
    pool: SqlitePool,
}

impl MovementRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append a movement on an open connection, normally the caller's transaction.
    pub async fn insert_with(
        conn: &mut SqliteConnection,
        chemical_id: i64,
        movement_type: MovementType,
        timestamp: NaiveDate,
    ) -> BionexaResult<Movement> {
        let id = sqlx::query(
            "INSERT INTO movements (chemical_id, movement_type, timestamp) VALUES (?, ?, ?)",
        )
        .bind(chemical_id)
        .bind(movement_type.as_str())
        .bind(timestamp)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

        Ok(Movement {
            id,
            chemical_id,
            movement_type,
            timestamp,
        })
    }

    pub async fn find_all(&self) -> BionexaResult<Vec<Movement>> {
        let rows: Vec<MovementRow> = sqlx::query_as(
            "SELECT id, chemical_id, movement_type, timestamp FROM movements ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Movement::try_from).collect()
    }

    pub async fn find_by_chemical(&self, chemical_id: i64) -> BionexaResult<Vec<Movement>> {
        let rows: Vec<MovementRow> = sqlx::query_as(
            r#"
            SELECT id, chemical_id, movement_type, timestamp
            FROM movements
            WHERE chemical_id = ?
            ORDER BY id
            "#,
        )
        .bind(chemical_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Movement::try_from).collect()
    }
}

#[derive(Debug, FromRow)]
struct MovementRow {
    id: i64,
    chemical_id: i64,
    movement_type: String,
    timestamp: NaiveDate,
}

impl TryFrom<MovementRow> for Movement {
    type Error = BionexaError;

    fn try_from(row: MovementRow) -> Result<Self, Self::Error> {
        let movement_type = row
            .movement_type
            .parse::<MovementType>()
            .map_err(|e| BionexaError::store(e.to_string()))?;

        Ok(Self {
            id: row.id,
            chemical_id: row.chemical_id,
            movement_type,
            timestamp: row.timestamp,
        })
    }
}
