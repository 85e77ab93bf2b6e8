//! Drop and recreate every table of the configured database.

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use vaxguard_backend::config::AppConfig;
use vaxguard_backend::storage::DbConnection;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load()?;
    warn!("Resetting database {}, all data will be lost", config.database_url);

    let db = DbConnection::new(&config.database_url).await?;
    db.reset().await?;

    info!("Database reset complete");
    Ok(())
}
