//! Transaction writes - Create, update and delete as single units of work.
//!
//! Each write opens one database transaction, validates the referenced person
//! and products inside it, writes the parent row and its line items, fills in
//! the total, and commits. Any failure rolls the whole unit back before the
//! error is returned, so no caller ever sees a parent without its lines or a
//! line without its parent.
//!
//! The transaction kind is decided by the [`Scope`] and never changes after
//! creation.

use crate::{
    core::{
        person::require_person,
        query::{TransactionDetails, get_transaction},
        references::{ItemRequest, ResolvedItem, resolve_items, validate_references},
        scope::Scope,
        totals::{check_supplied_total, resolve_total},
    },
    entities::{
        LineItem, LineItemColumn, PaymentMethod, Transaction, TransactionKind, line_item,
        transaction,
    },
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{DatabaseTransaction, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, error, info, instrument, warn};

/// Longest accepted `notes`, in characters.
pub const MAX_NOTES_LEN: usize = 1000;

/// Parent fields of a new transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFields {
    pub rut: String,
    /// Defaults to the time of creation
    #[serde(default)]
    pub transaction_date: Option<DateTimeUtc>,
    pub payment_method: PaymentMethod,
    /// Computed from the line items when absent
    #[serde(default)]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Only honoured in [`Scope::Any`]
    #[serde(default)]
    pub kind: Option<TransactionKind>,
    #[serde(default)]
    pub counterparty_id: Option<String>,
}

/// Parent fields to merge into an existing transaction. Absent fields are kept.
///
/// `notes` and `counterparty_id` distinguish an absent field (`None`, kept)
/// from an explicit `null` (`Some(None)`, cleared).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::option_option)]
pub struct TransactionPatch {
    #[serde(default)]
    pub rut: Option<String>,
    #[serde(default)]
    pub transaction_date: Option<DateTimeUtc>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub total_amount: Option<f64>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
    /// Ignored: the kind of a transaction cannot change
    #[serde(default)]
    pub kind: Option<TransactionKind>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub counterparty_id: Option<Option<String>>,
}

// Only called for fields present in the input, so `null` becomes `Some(None)`.
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Creates a transaction and its line items atomically.
///
/// The total is computed from the line items' snapshot prices unless
/// `parent.total_amount` is given, in which case it is stored as is.
///
/// # Errors
/// - [`Error::EmptyItems`], [`Error::InvalidAmount`], [`Error::NotesTooLong`],
///   [`Error::PaymentMethodNotAllowed`], [`Error::InvalidQuantity`] for bad input
/// - [`Error::PersonNotFound`] / [`Error::ProductNotFound`] for unknown references
/// - [`Error::Database`] if the store fails; nothing is written in any error case
#[instrument(skip(db, parent, items), fields(rut = %parent.rut, items = items.len()))]
pub async fn create_transaction(
    db: &DatabaseConnection,
    scope: Scope,
    parent: TransactionFields,
    items: Vec<ItemRequest>,
) -> Result<TransactionDetails> {
    if items.is_empty() {
        return Err(Error::EmptyItems);
    }
    check_supplied_total(parent.total_amount)?;
    check_notes(parent.notes.as_deref())?;

    let kind = scope.kind_for_create(parent.kind);
    if parent.kind.is_some_and(|requested| requested != kind) {
        debug!("Ignoring requested kind {:?}, scope forces {kind}", parent.kind);
    }
    check_payment_method(parent.payment_method, kind)?;

    let txn = db.begin().await?;
    let result = insert_transaction(&txn, kind, parent, &items).await;
    let id = finish(txn, result).await?;

    info!(id, %kind, "Transaction created");
    get_transaction(db, scope, id).await
}

/// Merges `patch` into a transaction and, when `items` is given, replaces all
/// of its line items.
///
/// `Some(vec![])` clears the line items; `None` leaves them untouched. When
/// items are replaced the total is recomputed unless `patch.total_amount` is set.
///
/// # Errors
/// - [`Error::TransactionNotFound`] if the id is unknown or belongs to another scope
/// - [`Error::PersonNotFound`] if the RUT changes to an unknown person
/// - [`Error::ProductNotFound`] for an unknown product in `items`
/// - the input errors of [`create_transaction`]
///
/// Nothing is changed in any error case.
#[instrument(skip(db, patch, items))]
pub async fn update_transaction(
    db: &DatabaseConnection,
    scope: Scope,
    id: i64,
    patch: TransactionPatch,
    items: Option<Vec<ItemRequest>>,
) -> Result<TransactionDetails> {
    check_supplied_total(patch.total_amount)?;
    check_notes(patch.notes.as_ref().and_then(Option::as_deref))?;

    let txn = db.begin().await?;
    let result = apply_update(&txn, scope, id, patch, items.as_deref()).await;
    finish(txn, result).await?;

    info!(id, "Transaction updated");
    get_transaction(db, scope, id).await
}

/// Deletes a transaction together with its line items.
///
/// # Errors
/// Returns [`Error::TransactionNotFound`] if the id is unknown or belongs to
/// another scope, or [`Error::Database`] if the store fails.
#[instrument(skip(db))]
pub async fn delete_transaction(db: &DatabaseConnection, scope: Scope, id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let result = remove_transaction(&txn, scope, id).await;
    finish(txn, result).await?;

    info!(id, "Transaction deleted");
    Ok(())
}

/// Commits on success, rolls back on failure. The rollback completes before the
/// original error is handed back.
async fn finish<T>(txn: DatabaseTransaction, result: Result<T>) -> Result<T> {
    match result {
        Ok(value) => {
            txn.commit().await?;
            Ok(value)
        }
        Err(e) => {
            warn!("Rolling back: {e}");
            if let Err(rollback_err) = txn.rollback().await {
                error!("Rollback failed: {rollback_err}");
            }
            Err(e)
        }
    }
}

async fn insert_transaction<C>(
    db: &C,
    kind: TransactionKind,
    parent: TransactionFields,
    items: &[ItemRequest],
) -> Result<i64>
where
    C: ConnectionTrait,
{
    let (_person, resolved) = validate_references(db, &parent.rut, items).await?;

    let now = Utc::now();
    let created = transaction::ActiveModel {
        transaction_date: Set(parent.transaction_date.unwrap_or(now)),
        rut: Set(parent.rut),
        payment_method: Set(parent.payment_method),
        // Filled in once the line items exist
        total_amount: Set(0.0),
        notes: Set(parent.notes),
        kind: Set(kind),
        counterparty_id: Set(parent.counterparty_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let lines = insert_line_items(db, created.id, &resolved).await?;
    let total = resolve_total(parent.total_amount, &lines)?;

    let mut active: transaction::ActiveModel = created.into();
    active.total_amount = Set(total);
    let stored = active.update(db).await?;

    Ok(stored.id)
}

async fn apply_update<C>(
    db: &C,
    scope: Scope,
    id: i64,
    patch: TransactionPatch,
    items: Option<&[ItemRequest]>,
) -> Result<()>
where
    C: ConnectionTrait,
{
    let existing = find_scoped(db, scope, id).await?;

    if let Some(rut) = patch.rut.as_deref() {
        if rut != existing.rut {
            require_person(db, rut).await?;
        }
    }

    if patch.kind.is_some_and(|requested| requested != existing.kind) {
        debug!("Ignoring requested kind change to {:?}", patch.kind);
    }
    let payment_method = patch.payment_method.unwrap_or(existing.payment_method);
    check_payment_method(payment_method, existing.kind)?;

    let kind = existing.kind;
    let mut active: transaction::ActiveModel = existing.into();
    if let Some(rut) = patch.rut {
        active.rut = Set(rut);
    }
    if let Some(date) = patch.transaction_date {
        active.transaction_date = Set(date);
    }
    if let Some(total) = patch.total_amount {
        active.total_amount = Set(total);
    }
    if let Some(notes) = patch.notes {
        active.notes = Set(notes);
    }
    if let Some(counterparty_id) = patch.counterparty_id {
        active.counterparty_id = Set(counterparty_id);
    }
    active.payment_method = Set(payment_method);
    active.kind = Set(kind);
    active.updated_at = Set(Utc::now());
    let updated = active.update(db).await?;

    let Some(items) = items else {
        return Ok(());
    };

    LineItem::delete_many()
        .filter(LineItemColumn::TransactionId.eq(id))
        .exec(db)
        .await?;
    let resolved = resolve_items(db, items).await?;
    let lines = insert_line_items(db, id, &resolved).await?;

    let mut active: transaction::ActiveModel = updated.into();
    active.total_amount = Set(resolve_total(patch.total_amount, &lines)?);
    active.update(db).await?;

    Ok(())
}

async fn remove_transaction<C>(db: &C, scope: Scope, id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let existing = find_scoped(db, scope, id).await?;

    LineItem::delete_many()
        .filter(LineItemColumn::TransactionId.eq(existing.id))
        .exec(db)
        .await?;
    Transaction::delete_by_id(existing.id).exec(db).await?;

    Ok(())
}

async fn find_scoped<C>(db: &C, scope: Scope, id: i64) -> Result<transaction::Model>
where
    C: ConnectionTrait,
{
    Transaction::find_by_id(id)
        .filter(scope.condition())
        .one(db)
        .await?
        .ok_or(Error::TransactionNotFound { id })
}

async fn insert_line_items<C>(
    db: &C,
    transaction_id: i64,
    items: &[ResolvedItem],
) -> Result<Vec<line_item::Model>>
where
    C: ConnectionTrait,
{
    let mut lines = Vec::with_capacity(items.len());
    for item in items {
        let line = line_item::ActiveModel {
            transaction_id: Set(transaction_id),
            product_id: Set(item.product_id),
            quantity: Set(item.quantity),
            unit_price: Set(item.unit_price),
            ..Default::default()
        }
        .insert(db)
        .await?;
        lines.push(line);
    }
    Ok(lines)
}

fn check_payment_method(method: PaymentMethod, kind: TransactionKind) -> Result<()> {
    if method.is_allowed_for(kind) {
        Ok(())
    } else {
        Err(Error::PaymentMethodNotAllowed { method, kind })
    }
}

fn check_notes(notes: Option<&str>) -> Result<()> {
    let len = notes.map_or(0, |n| n.chars().count());
    if len > MAX_NOTES_LEN {
        return Err(Error::NotesTooLong {
            max: MAX_NOTES_LEN,
            len,
        });
    }
    Ok(())
}
