//! Reference validation for transaction writes.
//!
//! Before anything is written, the person and every product referenced by a
//! request must exist. Lookups take the same connection the write uses, so when
//! called with an open [`sea_orm::DatabaseTransaction`] they see the same view
//! the inserts will.

use crate::{
    core::{person::require_person, product::get_product_by_id},
    entities::person,
    errors::{Error, Result},
};
use sea_orm::ConnectionTrait;
use serde::{Deserialize, Serialize};

/// A requested line: which product and how many units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequest {
    pub product_id: i64,
    pub quantity: i32,
}

/// An [`ItemRequest`] whose product was found, with the price read at that moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedItem {
    pub product_id: i64,
    pub quantity: i32,
    /// Live product price at validation time, to be stored on the line item
    pub unit_price: i64,
}

/// Checks that the person and all products exist.
///
/// Products are checked in request order and the first missing one aborts.
///
/// # Errors
/// - [`Error::PersonNotFound`] if the RUT does not resolve
/// - [`Error::InvalidQuantity`] if an item asks for fewer than one unit
/// - [`Error::ProductNotFound`] for the first product that does not resolve
/// - [`Error::Database`] if a lookup fails
pub async fn validate_references<C>(
    db: &C,
    rut: &str,
    items: &[ItemRequest],
) -> Result<(person::Model, Vec<ResolvedItem>)>
where
    C: ConnectionTrait,
{
    let person = require_person(db, rut).await?;
    let resolved = resolve_items(db, items).await?;
    Ok((person, resolved))
}

/// Resolves the unit price of every item, failing on the first unknown product.
///
/// # Errors
/// See [`validate_references`].
pub async fn resolve_items<C>(db: &C, items: &[ItemRequest]) -> Result<Vec<ResolvedItem>>
where
    C: ConnectionTrait,
{
    let mut resolved = Vec::with_capacity(items.len());

    for item in items {
        if item.quantity < 1 {
            return Err(Error::InvalidQuantity {
                product_id: item.product_id,
                quantity: item.quantity,
            });
        }

        let product = get_product_by_id(db, item.product_id)
            .await?
            .ok_or(Error::ProductNotFound {
                product_id: item.product_id,
            })?;

        resolved.push(ResolvedItem {
            product_id: product.id,
            quantity: item.quantity,
            unit_price: product.price,
        });
    }

    Ok(resolved)
}
