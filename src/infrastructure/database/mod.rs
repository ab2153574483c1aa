pub mod entities;
pub mod migrator;
pub mod repositories;

#[cfg(test)]
pub(crate) mod testing;

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde::{Deserialize, Serialize};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use migrator::Migrator;

/// `[database]` section of the service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database URL (e.g., "sqlite://./staff_access.db?mode=rwc")
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./staff_access.db?mode=rwc".to_string(),
        }
    }
}

/// Initialize database connection and bring the schema up to date
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, sea_orm::DbErr> {
    info!("Connecting to database: {}", config.url);
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    let db = Database::connect(options).await?;
    info!("Database connected successfully");

    info!("Running database migrations...");
    Migrator::up(&db, None).await?;
    info!("Migrations completed");

    Ok(db)
}
