//! Catalog seeding - Inserts configured persons and products that are missing.

use crate::{
    config::catalog::CatalogConfig,
    core::{
        person::{create_person, get_person_by_rut},
        product::{create_product, get_product_by_name},
    },
    errors::Result,
};
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::{debug, info, instrument};

/// What a seeding run inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub persons_created: usize,
    pub products_created: usize,
}

/// Inserts every catalog person (keyed by RUT) and product (keyed by name)
/// that does not exist yet. Existing rows are left untouched.
///
/// Runs as one unit: if any insert fails nothing from this run is kept.
///
/// # Errors
/// Returns an error if an entry is invalid (blank name, negative price) or the
/// database fails.
#[instrument(skip(db, catalog))]
pub async fn seed_catalog(db: &DatabaseConnection, catalog: &CatalogConfig) -> Result<SeedReport> {
    info!(
        "Seeding catalog: {} persons, {} products configured",
        catalog.persons.len(),
        catalog.products.len()
    );

    let txn = db.begin().await?;
    let mut report = SeedReport::default();

    for cfg in &catalog.persons {
        if get_person_by_rut(&txn, cfg.rut.trim()).await?.is_some() {
            debug!("Person {} already exists, skipping", cfg.rut);
            continue;
        }
        create_person(
            &txn,
            cfg.rut.clone(),
            cfg.name.clone(),
            cfg.last_name.clone(),
            cfg.beneficiary_id,
        )
        .await?;
        report.persons_created += 1;
    }

    for cfg in &catalog.products {
        if get_product_by_name(&txn, cfg.name.trim()).await?.is_some() {
            debug!("Product '{}' already exists, skipping", cfg.name);
            continue;
        }
        create_product(
            &txn,
            cfg.name.clone(),
            cfg.description.clone(),
            cfg.measure.clone(),
            cfg.product_type.clone(),
            cfg.price,
        )
        .await?;
        report.products_created += 1;
    }

    // Dropping an uncommitted transaction rolls it back, so an early `?` above
    // leaves the store as it was.
    txn.commit().await?;

    info!(
        "Catalog seeded: {} persons and {} products created",
        report.persons_created, report.products_created
    );
    Ok(report)
}
