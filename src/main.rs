use dotenvy::dotenv;
use inventory_transactions::{
    config::{
        catalog::{catalog_path, load_catalog},
        database::{DatabaseSettings, create_connection, create_tables},
    },
    core::catalog::seed_catalog,
    errors::Result,
    service::AppState,
};
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Connect and create tables
    let settings = DatabaseSettings::from_env()?;
    let db = create_connection(&settings)
        .await
        .inspect(|_| info!("Connected to database."))
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create tables: {e}"))?;

    // 4. Seed persons and products from the catalog file, if there is one
    let path = catalog_path();
    if Path::new(&path).exists() {
        let catalog = load_catalog(&path)?;
        seed_catalog(&db, &catalog)
            .await
            .inspect_err(|e| error!("Failed to seed catalog: {e}"))?;
    } else {
        warn!("Catalog file {path} not found, skipping seeding");
    }

    // 5. Build the services
    let state = AppState::new(db);
    info!(
        "Transaction services ready: {} sales, {} purchases, {} total",
        state.sales.count().await?,
        state.purchases.count().await?,
        state.transactions.count().await?
    );

    Ok(())
}
