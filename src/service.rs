//! Service facade - One handle per transaction kind over a shared connection.
//!
//! A [`TransactionService`] binds a database connection to a [`Scope`]. The
//! sales and purchase services are the same type with a different scope, so
//! every operation behaves identically apart from which rows it can see and
//! which kind it stamps on creation.

use crate::{
    core::{
        query::{
            self, DateRange, DateRangePage, Page, PageRequest, PersonRangePage,
            PersonTransactions, Sort, TransactionDetails, TransactionFilter,
        },
        references::ItemRequest,
        scope::Scope,
        transaction::{self, TransactionFields, TransactionPatch},
    },
    entities::TransactionKind,
    errors::{Error, ErrorKind, Result},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Transaction operations restricted to one [`Scope`].
///
/// Cloning is cheap: clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct TransactionService {
    db: Arc<DatabaseConnection>,
    scope: Scope,
}

impl TransactionService {
    #[must_use]
    pub fn new(db: impl Into<Arc<DatabaseConnection>>, scope: Scope) -> Self {
        Self {
            db: db.into(),
            scope,
        }
    }

    /// Sees every transaction.
    #[must_use]
    pub fn all(db: impl Into<Arc<DatabaseConnection>>) -> Self {
        Self::new(db, Scope::Any)
    }

    /// Sees and creates sales only.
    #[must_use]
    pub fn sales(db: impl Into<Arc<DatabaseConnection>>) -> Self {
        Self::new(db, Scope::Only(TransactionKind::Sale))
    }

    /// Sees and creates purchases only.
    #[must_use]
    pub fn purchases(db: impl Into<Arc<DatabaseConnection>>) -> Self {
        Self::new(db, Scope::Only(TransactionKind::Purchase))
    }

    #[must_use]
    pub const fn scope(&self) -> Scope {
        self.scope
    }

    /// Creates a transaction with its line items.
    ///
    /// # Errors
    /// See [`transaction::create_transaction`].
    pub async fn create(
        &self,
        fields: TransactionFields,
        items: Vec<ItemRequest>,
    ) -> Result<TransactionDetails> {
        transaction::create_transaction(self.db.as_ref(), self.scope, fields, items)
            .await
            .inspect(|t| {
                info!(
                    "Created {} {} for {} totalling {}",
                    t.transaction.kind, t.transaction.id, t.transaction.rut, t.transaction.total_amount
                );
            })
            .inspect_err(|e| log_failure("create", e))
    }

    /// # Errors
    /// Returns [`Error::TransactionNotFound`] if the id is not visible in this scope.
    pub async fn get_by_id(&self, id: i64) -> Result<TransactionDetails> {
        query::get_transaction(self.db.as_ref(), self.scope, id)
            .await
            .inspect_err(|e| log_failure("get", e))
    }

    /// Merges `patch` and, when given, replaces the line items.
    ///
    /// # Errors
    /// See [`transaction::update_transaction`].
    pub async fn update(
        &self,
        id: i64,
        patch: TransactionPatch,
        items: Option<Vec<ItemRequest>>,
    ) -> Result<TransactionDetails> {
        transaction::update_transaction(self.db.as_ref(), self.scope, id, patch, items)
            .await
            .inspect(|t| info!("Updated transaction {}", t.transaction.id))
            .inspect_err(|e| log_failure("update", e))
    }

    /// # Errors
    /// Returns [`Error::TransactionNotFound`] if the id is not visible in this scope.
    pub async fn delete(&self, id: i64) -> Result<()> {
        transaction::delete_transaction(self.db.as_ref(), self.scope, id)
            .await
            .inspect(|()| info!("Deleted transaction {id}"))
            .inspect_err(|e| log_failure("delete", e))
    }

    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: &TransactionFilter,
        page: PageRequest,
        sort: Sort,
    ) -> Result<Page<TransactionDetails>> {
        query::list_transactions(self.db.as_ref(), self.scope, filter, page, sort)
            .await
            .inspect_err(|e| log_failure("list", e))
    }

    /// # Errors
    /// Returns [`Error::PersonNotFound`] if the RUT does not resolve.
    pub async fn get_by_rut(&self, rut: &str) -> Result<PersonTransactions> {
        query::transactions_by_rut(self.db.as_ref(), self.scope, rut)
            .await
            .inspect_err(|e| log_failure("get_by_rut", e))
    }

    /// # Errors
    /// Returns [`Error::DateRequired`] if neither bound is set.
    pub async fn get_by_date_range(
        &self,
        range: DateRange,
        page: PageRequest,
    ) -> Result<DateRangePage> {
        query::transactions_by_date_range(self.db.as_ref(), self.scope, range, page)
            .await
            .inspect_err(|e| log_failure("get_by_date_range", e))
    }

    /// # Errors
    /// Returns [`Error::RutRequired`] or [`Error::PersonNotFound`] for a bad RUT.
    pub async fn get_by_date_range_and_rut(
        &self,
        rut: Option<&str>,
        range: DateRange,
        page: PageRequest,
    ) -> Result<PersonRangePage> {
        query::transactions_by_date_range_and_rut(self.db.as_ref(), self.scope, rut, range, page)
            .await
            .inspect_err(|e| log_failure("get_by_date_range_and_rut", e))
    }

    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn count(&self) -> Result<u64> {
        query::count_transactions(self.db.as_ref(), self.scope)
            .await
            .inspect_err(|e| log_failure("count", e))
    }
}

fn log_failure(operation: &str, e: &Error) {
    match e.kind() {
        ErrorKind::NotFound | ErrorKind::InvalidInput => warn!("{operation} rejected: {e}"),
        ErrorKind::Internal => error!("{operation} failed: {e}"),
    }
}

/// The three services the application exposes, sharing one connection pool.
#[derive(Debug, Clone)]
pub struct AppState {
    pub transactions: TransactionService,
    pub sales: TransactionService,
    pub purchases: TransactionService,
}

impl AppState {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        let db = Arc::new(db);
        Self {
            transactions: TransactionService::all(Arc::clone(&db)),
            sales: TransactionService::sales(Arc::clone(&db)),
            purchases: TransactionService::purchases(db),
        }
    }
}
