//! Shared test utilities for the inventory transactions service.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        person, product,
        query::TransactionDetails,
        references::ItemRequest,
        scope::Scope,
        transaction::{self, TransactionFields},
    },
    entities::{self, PaymentMethod},
    errors::Result,
};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test person with sensible defaults.
///
/// # Defaults
/// * `name`: "Juan"
/// * `last_name`: "Pérez"
/// * `beneficiary_id`: None
pub async fn create_test_person(
    db: &DatabaseConnection,
    rut: &str,
) -> Result<entities::person::Model> {
    person::create_person(
        db,
        rut.to_string(),
        "Juan".to_string(),
        Some("Pérez".to_string()),
        None,
    )
    .await
}

/// Creates a person with a custom name and no last name.
pub async fn create_custom_person(
    db: &DatabaseConnection,
    rut: &str,
    name: &str,
) -> Result<entities::person::Model> {
    person::create_person(db, rut.to_string(), name.to_string(), None, None).await
}

/// Creates a test product with a custom price.
///
/// # Defaults
/// * `description`: None
/// * `measure`: "unidad"
/// * `product_type`: "abarrotes"
pub async fn create_test_product(
    db: &DatabaseConnection,
    name: &str,
    price: i64,
) -> Result<entities::product::Model> {
    product::create_product(
        db,
        name.to_string(),
        None,
        "unidad".to_string(),
        "abarrotes".to_string(),
        price,
    )
    .await
}

/// Shorthand for a line item request.
pub const fn item(product_id: i64, quantity: i32) -> ItemRequest {
    ItemRequest {
        product_id,
        quantity,
    }
}

/// Parent fields for a cash transaction with a computed total.
pub fn sample_fields(rut: &str) -> TransactionFields {
    TransactionFields {
        rut: rut.to_string(),
        transaction_date: None,
        payment_method: PaymentMethod::Cash,
        total_amount: None,
        notes: None,
        kind: None,
        counterparty_id: None,
    }
}

/// Creates a cash transaction for `rut` with the given items in `scope`.
pub async fn create_test_transaction(
    db: &DatabaseConnection,
    scope: Scope,
    rut: &str,
    items: &[ItemRequest],
) -> Result<TransactionDetails> {
    transaction::create_transaction(db, scope, sample_fields(rut), items.to_vec()).await
}

/// Creates a single-item purchase on a fixed date.
pub async fn create_dated_transaction(
    db: &DatabaseConnection,
    rut: &str,
    product_id: i64,
    date: DateTime<Utc>,
) -> Result<TransactionDetails> {
    let mut fields = sample_fields(rut);
    fields.transaction_date = Some(date);
    transaction::create_transaction(db, Scope::Any, fields, vec![item(product_id, 1)]).await
}

/// Sets up a database with one person ("11111111-1", Juan Pérez) and one
/// product ("Harina", price 500).
/// Returns (db, person, product) for transaction tests.
pub async fn setup_with_catalog() -> Result<(
    DatabaseConnection,
    entities::person::Model,
    entities::product::Model,
)> {
    let db = setup_test_db().await?;
    let person = create_test_person(&db, "11111111-1").await?;
    let product = create_test_product(&db, "Harina", 500).await?;
    Ok((db, person, product))
}
