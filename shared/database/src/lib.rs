pub mod sqlite;
pub mod migrations;
pub mod repositories;
pub mod store;

pub use sqlite::{SqlitePool, create_sqlite_pool, create_memory_pool, health_check};
pub use migrations::run_sqlite_migrations;
pub use repositories::*;
pub use store::{InventoryStore, SqliteInventoryStore};

use anyhow::Result;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://bionexa_lab.db".to_string(),
            max_connections: 5,
            connection_timeout: Duration::from_secs(30),
        }
    }
}

pub async fn initialize_database(config: &DatabaseConfig) -> Result<SqlitePool> {
    let pool = create_sqlite_pool(&config.url, config.max_connections, config.connection_timeout).await?;

    // Run migrations
    run_sqlite_migrations(&pool).await?;

    Ok(pool)
}
