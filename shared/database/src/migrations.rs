use anyhow::Result;
use sqlx::SqlitePool;

pub async fn run_sqlite_migrations(pool: &SqlitePool) -> Result<()> {
    tracing::info!("Running SQLite migrations");

    // Create chemicals table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS chemicals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            article_number TEXT NOT NULL,
            batch_number TEXT NOT NULL,
            sample_id TEXT NOT NULL,
            chemical_name TEXT NOT NULL,
            hazard_class TEXT,
            ph TEXT,
            expiry_date TEXT NOT NULL,
            reorder_point INTEGER NOT NULL DEFAULT 5 CHECK (reorder_point >= 1),
            status TEXT NOT NULL DEFAULT 'in_stock'
                CHECK (status IN ('in_stock', 'dispatched')),
            written_off INTEGER NOT NULL DEFAULT 0,
            barcode_path TEXT,
            client_name TEXT,
            test_type TEXT,
            expected_report_date TEXT,
            report_status TEXT NOT NULL DEFAULT 'Not Ready'
                CHECK (report_status IN ('Not Ready', 'Ready')),
            report_file_path TEXT,
            current_location TEXT,
            issues TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create movements table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS movements (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            chemical_id INTEGER NOT NULL REFERENCES chemicals(id),
            movement_type TEXT NOT NULL
                CHECK (movement_type IN ('received', 'dispatched')),
            timestamp TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // The sample identifier is the scan key, so it must resolve to one lot
    sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS idx_chemicals_sample_id ON chemicals(sample_id)")
        .execute(pool)
        .await?;

    // One label image per lot
    sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS idx_chemicals_barcode_path ON chemicals(barcode_path)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_chemicals_name_status ON chemicals(chemical_name, status)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_movements_chemical_id ON movements(chemical_id)")
        .execute(pool)
        .await?;

    tracing::info!("SQLite migrations completed successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::create_memory_pool;

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = create_memory_pool().await.unwrap();
        run_sqlite_migrations(&pool).await.unwrap();
        run_sqlite_migrations(&pool).await.unwrap();

        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('chemicals', 'movements')",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_movement_requires_existing_chemical() {
        let pool = create_memory_pool().await.unwrap();
        run_sqlite_migrations(&pool).await.unwrap();

        let result = sqlx::query(
            "INSERT INTO movements (chemical_id, movement_type, timestamp) VALUES (42, 'received', '2025-04-15')",
        )
        .execute(&pool)
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_status_check_constraint() {
        let pool = create_memory_pool().await.unwrap();
        run_sqlite_migrations(&pool).await.unwrap();

        let result = sqlx::query(
            r#"
            INSERT INTO chemicals (article_number, batch_number, sample_id, chemical_name, expiry_date, status)
            VALUES ('A', 'B', 'A-B', 'Acetone', '2030-01-01', 'lost')
            "#,
        )
        .execute(&pool)
        .await;
        assert!(result.is_err());
    }
}
