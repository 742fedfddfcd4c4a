//! Transaction reads - Filtering, sorting, pagination and joined results.
//!
//! Every result is returned with its person and its line items, each line item
//! with its product. Lines keep the price they were written with; the joined
//! product shows the current catalog entry.
//!
//! All queries honour a [`Scope`], so a sales listing never returns purchases
//! and the other way round.

use crate::{
    core::{person::require_person, scope::Scope},
    entities::{
        LineItem, LineItemColumn, PaymentMethod, Person, PersonColumn, Product, ProductColumn,
        Transaction, TransactionColumn, TransactionKind, line_item, person, product, transaction,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{Condition, Order, PaginatorTrait, QueryOrder, QuerySelect, Select, prelude::*};
use serde::Serialize;
use std::{
    collections::{BTreeSet, HashMap},
    str::FromStr,
};

/// Page size used when none (or zero) is requested.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Largest page size a caller can ask for.
pub const MAX_PAGE_SIZE: u64 = 100;

/// A line item joined with its product.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemDetails {
    #[serde(flatten)]
    pub line_item: line_item::Model,
    /// None only if the product row vanished after the line was written
    pub product: Option<product::Model>,
}

/// A transaction joined with its person and line items.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetails {
    #[serde(flatten)]
    pub transaction: transaction::Model,
    pub person: Option<person::Model>,
    pub items: Vec<LineItemDetails>,
}

/// Optional filters, combined with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    pub date_range: DateRange,
    pub rut: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub kind: Option<TransactionKind>,
    pub counterparty_id: Option<String>,
}

impl TransactionFilter {
    fn condition(&self) -> Condition {
        let mut condition = self.date_range.condition();
        if let Some(rut) = &self.rut {
            condition = condition.add(TransactionColumn::Rut.eq(rut.as_str()));
        }
        if let Some(method) = self.payment_method {
            condition = condition.add(TransactionColumn::PaymentMethod.eq(method));
        }
        if let Some(kind) = self.kind {
            condition = condition.add(TransactionColumn::Kind.eq(kind));
        }
        if let Some(counterparty_id) = &self.counterparty_id {
            condition = condition.add(TransactionColumn::CounterpartyId.eq(counterparty_id.as_str()));
        }
        condition
    }
}

/// Inclusive bounds on `transaction_date`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Parses optional textual bounds, see [`parse_date_bound`].
    ///
    /// # Errors
    /// Returns [`Error::InvalidValue`] if a bound cannot be parsed.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self> {
        Ok(Self {
            start_date: start.map(|s| parse_date_bound("startDate", s)).transpose()?,
            end_date: end.map(|s| parse_date_bound("endDate", s)).transpose()?,
        })
    }

    /// True when neither bound is set.
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.start_date.is_none() && self.end_date.is_none()
    }

    fn condition(&self) -> Condition {
        let mut condition = Condition::all();
        if let Some(start) = self.start_date {
            condition = condition.add(TransactionColumn::TransactionDate.gte(start));
        }
        if let Some(end) = self.end_date {
            condition = condition.add(TransactionColumn::TransactionDate.lte(end));
        }
        condition
    }
}

/// Parses an RFC 3339 timestamp or a `YYYY-MM-DD` date (midnight UTC).
///
/// # Errors
/// Returns [`Error::InvalidValue`] naming `field` when neither format matches.
pub fn parse_date_bound(field: &'static str, value: &str) -> Result<DateTime<Utc>> {
    let trimmed = value.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| Error::InvalidValue {
            field,
            value: value.to_string(),
        })
}

/// 1-indexed page request. Always holds a page of at least 1 and a size
/// between 1 and [`MAX_PAGE_SIZE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    page_size: u64,
}

impl PageRequest {
    /// Normalises raw values: page defaults to 1, size to [`DEFAULT_PAGE_SIZE`],
    /// and size is capped at [`MAX_PAGE_SIZE`].
    #[must_use]
    pub fn new(page: Option<u64>, page_size: Option<u64>) -> Self {
        let page = page.filter(|p| *p > 0).unwrap_or(1);
        let page_size = page_size
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE);
        Self { page, page_size }
    }

    #[must_use]
    pub const fn page(&self) -> u64 {
        self.page
    }

    #[must_use]
    pub const fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Number of rows skipped before this page.
    ///
    /// Saturates at `i64::MAX`, the largest offset `SQLite` accepts, so a page
    /// far past the end simply comes back empty.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        let offset = (self.page - 1).saturating_mul(self.page_size);
        let max = i64::MAX.unsigned_abs();
        if offset > max { max } else { offset }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Fields a listing may be sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    TransactionDate,
    TotalAmount,
    CreatedAt,
    Id,
}

impl SortField {
    const fn column(self) -> TransactionColumn {
        match self {
            Self::TransactionDate => TransactionColumn::TransactionDate,
            Self::TotalAmount => TransactionColumn::TotalAmount,
            Self::CreatedAt => TransactionColumn::CreatedAt,
            Self::Id => TransactionColumn::Id,
        }
    }
}

impl FromStr for SortField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "transactionDate" | "transaction_date" => Ok(Self::TransactionDate),
            "totalAmount" | "total_amount" => Ok(Self::TotalAmount),
            "createdAt" | "created_at" => Ok(Self::CreatedAt),
            "id" => Ok(Self::Id),
            _ => Err(Error::InvalidValue {
                field: "sortBy",
                value: s.to_string(),
            }),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(Error::InvalidValue {
                field: "orderBy",
                value: s.to_string(),
            }),
        }
    }
}

impl From<SortOrder> for Order {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Asc => Self::Asc,
            SortOrder::Desc => Self::Desc,
        }
    }
}

/// Ordering of a listing. Defaults to newest `transaction_date` first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub order: SortOrder,
}

impl Sort {
    // Ties are broken by id so that pages never overlap.
    fn apply(self, select: Select<Transaction>) -> Select<Transaction> {
        select
            .order_by(self.field.column(), self.order.into())
            .order_by(TransactionColumn::Id, self.order.into())
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub current_page: u64,
    pub total_pages: u64,
    pub page_size: u64,
}

/// Every transaction of one person, unpaginated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonTransactions {
    pub total_transactions: usize,
    pub rut: String,
    pub person_name: String,
    pub transactions: Vec<TransactionDetails>,
}

/// A page of transactions within a date range.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangePage {
    #[serde(flatten)]
    pub range: DateRange,
    #[serde(flatten)]
    pub page: Page<TransactionDetails>,
}

/// A page of one person's transactions within a date range.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRangePage {
    pub rut: String,
    pub person_name: String,
    #[serde(flatten)]
    pub range: DateRange,
    #[serde(flatten)]
    pub page: Page<TransactionDetails>,
}

/// Finds a transaction by id within `scope`.
pub async fn find_transaction<C>(
    db: &C,
    scope: Scope,
    id: i64,
) -> Result<Option<TransactionDetails>>
where
    C: ConnectionTrait,
{
    let Some(model) = Transaction::find_by_id(id)
        .filter(scope.condition())
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    Ok(load_details(db, vec![model]).await?.pop())
}

/// Like [`find_transaction`] but a missing (or out-of-scope) transaction is an error.
///
/// # Errors
/// Returns [`Error::TransactionNotFound`] if no transaction with this id is visible in `scope`.
pub async fn get_transaction<C>(db: &C, scope: Scope, id: i64) -> Result<TransactionDetails>
where
    C: ConnectionTrait,
{
    find_transaction(db, scope, id)
        .await?
        .ok_or(Error::TransactionNotFound { id })
}

/// Lists transactions matching `filter`, one page at a time.
pub async fn list_transactions<C>(
    db: &C,
    scope: Scope,
    filter: &TransactionFilter,
    page: PageRequest,
    sort: Sort,
) -> Result<Page<TransactionDetails>>
where
    C: ConnectionTrait,
{
    let select = Transaction::find()
        .filter(scope.condition())
        .filter(filter.condition());
    fetch_page(db, sort.apply(select), page).await
}

/// All transactions of a person, newest first.
///
/// The person must exist even when they have no transactions.
///
/// # Errors
/// Returns [`Error::PersonNotFound`] if the RUT does not resolve.
pub async fn transactions_by_rut<C>(db: &C, scope: Scope, rut: &str) -> Result<PersonTransactions>
where
    C: ConnectionTrait,
{
    let person = require_person(db, rut.trim()).await?;

    let select = Transaction::find()
        .filter(scope.condition())
        .filter(TransactionColumn::Rut.eq(person.rut.as_str()));
    let models = Sort::default().apply(select).all(db).await?;
    let transactions = load_details(db, models).await?;

    Ok(PersonTransactions {
        total_transactions: transactions.len(),
        person_name: person.display_name(),
        rut: person.rut,
        transactions,
    })
}

/// Transactions within a date range, newest first.
///
/// # Errors
/// Returns [`Error::DateRequired`] if neither bound is set.
pub async fn transactions_by_date_range<C>(
    db: &C,
    scope: Scope,
    range: DateRange,
    page: PageRequest,
) -> Result<DateRangePage>
where
    C: ConnectionTrait,
{
    if range.is_unbounded() {
        return Err(Error::DateRequired);
    }

    let filter = TransactionFilter {
        date_range: range,
        ..Default::default()
    };
    let page = list_transactions(db, scope, &filter, page, Sort::default()).await?;
    Ok(DateRangePage { range, page })
}

/// A person's transactions, optionally within a date range, newest first.
///
/// # Errors
/// - [`Error::RutRequired`] if `rut` is missing or blank
/// - [`Error::PersonNotFound`] if it does not resolve
pub async fn transactions_by_date_range_and_rut<C>(
    db: &C,
    scope: Scope,
    rut: Option<&str>,
    range: DateRange,
    page: PageRequest,
) -> Result<PersonRangePage>
where
    C: ConnectionTrait,
{
    let rut = rut
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or(Error::RutRequired)?;
    let person = require_person(db, rut).await?;

    let filter = TransactionFilter {
        date_range: range,
        rut: Some(person.rut.clone()),
        ..Default::default()
    };
    let page = list_transactions(db, scope, &filter, page, Sort::default()).await?;

    Ok(PersonRangePage {
        person_name: person.display_name(),
        rut: person.rut,
        range,
        page,
    })
}

/// Line items stored for a transaction, in insertion order.
pub async fn line_items_for_transaction<C>(
    db: &C,
    transaction_id: i64,
) -> Result<Vec<line_item::Model>>
where
    C: ConnectionTrait,
{
    LineItem::find()
        .filter(LineItemColumn::TransactionId.eq(transaction_id))
        .order_by_asc(LineItemColumn::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Number of transactions visible in `scope`.
pub async fn count_transactions<C>(db: &C, scope: Scope) -> Result<u64>
where
    C: ConnectionTrait,
{
    Transaction::find()
        .filter(scope.condition())
        .count(db)
        .await
        .map_err(Into::into)
}

async fn fetch_page<C>(
    db: &C,
    select: Select<Transaction>,
    page: PageRequest,
) -> Result<Page<TransactionDetails>>
where
    C: ConnectionTrait,
{
    let total_count = select.clone().count(db).await?;
    let models = select
        .offset(page.offset())
        .limit(page.page_size)
        .all(db)
        .await?;

    Ok(Page {
        items: load_details(db, models).await?,
        total_count,
        current_page: page.page,
        total_pages: total_count.div_ceil(page.page_size),
        page_size: page.page_size,
    })
}

/// Joins persons, line items and products onto `models`, keeping their order.
async fn load_details<C>(
    db: &C,
    models: Vec<transaction::Model>,
) -> Result<Vec<TransactionDetails>>
where
    C: ConnectionTrait,
{
    if models.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i64> = models.iter().map(|m| m.id).collect();
    let ruts: BTreeSet<&str> = models.iter().map(|m| m.rut.as_str()).collect();

    let lines = LineItem::find()
        .filter(LineItemColumn::TransactionId.is_in(ids))
        .order_by_asc(LineItemColumn::Id)
        .all(db)
        .await?;

    let product_ids: BTreeSet<i64> = lines.iter().map(|l| l.product_id).collect();
    let products: HashMap<i64, product::Model> = Product::find()
        .filter(ProductColumn::Id.is_in(product_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let persons: HashMap<String, person::Model> = Person::find()
        .filter(PersonColumn::Rut.is_in(ruts))
        .all(db)
        .await?
        .into_iter()
        .map(|p| (p.rut.clone(), p))
        .collect();

    let mut lines_by_transaction: HashMap<i64, Vec<LineItemDetails>> = HashMap::new();
    for line in lines {
        let product = products.get(&line.product_id).cloned();
        lines_by_transaction
            .entry(line.transaction_id)
            .or_default()
            .push(LineItemDetails {
                line_item: line,
                product,
            });
    }

    Ok(models
        .into_iter()
        .map(|transaction| TransactionDetails {
            person: persons.get(&transaction.rut).cloned(),
            items: lines_by_transaction
                .remove(&transaction.id)
                .unwrap_or_default(),
            transaction,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use chrono::{Duration, TimeZone};

    const SALES: Scope = Scope::Only(TransactionKind::Sale);
    const PURCHASES: Scope = Scope::Only(TransactionKind::Purchase);

    #[test]
    fn test_page_request_normalisation() {
        assert_eq!(PageRequest::default(), PageRequest { page: 1, page_size: 10 });
        assert_eq!(PageRequest::new(Some(0), Some(0)), PageRequest { page: 1, page_size: 10 });
        assert_eq!(PageRequest::new(Some(3), Some(500)).page_size, MAX_PAGE_SIZE);
        assert_eq!(PageRequest::new(Some(3), Some(20)).offset(), 40);
        assert_eq!(PageRequest::new(Some(3), Some(20)).page(), 3);
    }

    #[test]
    fn test_page_request_offset_saturates() {
        let huge = PageRequest::new(Some(u64::MAX), Some(MAX_PAGE_SIZE));
        assert_eq!(huge.offset(), i64::MAX.unsigned_abs());
        assert_eq!(huge.page(), u64::MAX);
    }

    #[tokio::test]
    async fn test_list_huge_page_number_is_empty() -> Result<()> {
        let (db, person, product) = setup_with_catalog().await?;
        create_test_transaction(&db, Scope::Any, &person.rut, &[item(product.id, 1)]).await?;

        let page = list_transactions(
            &db,
            Scope::Any,
            &TransactionFilter::default(),
            PageRequest::new(Some(u64::MAX), Some(10)),
            Sort::default(),
        )
        .await?;

        assert!(page.items.is_empty());
        assert_eq!(page.total_count, 1);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.current_page, u64::MAX);

        Ok(())
    }

    #[tokio::test]
    async fn test_rut_is_trimmed_on_both_person_paths() -> Result<()> {
        let (db, person, product) = setup_with_catalog().await?;
        create_test_transaction(&db, Scope::Any, &person.rut, &[item(product.id, 1)]).await?;
        let padded = format!("  {}  ", person.rut);

        let by_rut = transactions_by_rut(&db, Scope::Any, &padded).await?;
        assert_eq!(by_rut.rut, person.rut);
        assert_eq!(by_rut.total_transactions, 1);

        let by_range = transactions_by_date_range_and_rut(
            &db,
            Scope::Any,
            Some(&padded),
            DateRange::default(),
            PageRequest::default(),
        )
        .await?;
        assert_eq!(by_range.rut, person.rut);
        assert_eq!(by_range.page.total_count, 1);

        Ok(())
    }

    #[test]
    fn test_sort_parsing() {
        assert_eq!("totalAmount".parse::<SortField>().unwrap(), SortField::TotalAmount);
        assert_eq!("created_at".parse::<SortField>().unwrap(), SortField::CreatedAt);
        assert!(matches!(
            "rut".parse::<SortField>(),
            Err(Error::InvalidValue { field: "sortBy", .. })
        ));
        assert_eq!("ASC".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert!("sideways".parse::<SortOrder>().is_err());
        assert_eq!(
            Sort::default(),
            Sort {
                field: SortField::TransactionDate,
                order: SortOrder::Desc
            }
        );
    }

    #[test]
    fn test_parse_date_bound() {
        let date = parse_date_bound("startDate", "2024-03-01").unwrap();
        assert_eq!(date, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());

        let timestamp = parse_date_bound("endDate", "2024-03-01T15:30:00-03:00").unwrap();
        assert_eq!(timestamp, Utc.with_ymd_and_hms(2024, 3, 1, 18, 30, 0).unwrap());

        assert!(matches!(
            parse_date_bound("endDate", "yesterday"),
            Err(Error::InvalidValue { field: "endDate", .. })
        ));
    }

    #[tokio::test]
    async fn test_get_transaction_joins_relations() -> Result<()> {
        let (db, person, product) = setup_with_catalog().await?;
        let created = create_test_transaction(&db, Scope::Any, &person.rut, &[item(product.id, 2)]).await?;

        let found = get_transaction(&db, Scope::Any, created.transaction.id).await?;
        assert_eq!(found.person, Some(person));
        assert_eq!(found.items.len(), 1);
        assert_eq!(found.items[0].line_item.quantity, 2);
        assert_eq!(found.items[0].product, Some(product));

        let missing = get_transaction(&db, Scope::Any, 999).await;
        assert!(matches!(missing, Err(Error::TransactionNotFound { id: 999 })));

        Ok(())
    }

    #[tokio::test]
    async fn test_list_pagination() -> Result<()> {
        let (db, person, product) = setup_with_catalog().await?;
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        for day in 0..5 {
            create_dated_transaction(&db, &person.rut, product.id, base + Duration::days(day)).await?;
        }

        let page = list_transactions(
            &db,
            Scope::Any,
            &TransactionFilter::default(),
            PageRequest::new(Some(2), Some(2)),
            Sort::default(),
        )
        .await?;

        assert_eq!(page.total_count, 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 2);
        assert_eq!(page.items.len(), 2);
        // Newest first: page 2 holds days 2 and 1
        assert_eq!(page.items[0].transaction.transaction_date, base + Duration::days(2));
        assert_eq!(page.items[1].transaction.transaction_date, base + Duration::days(1));

        let past_end = list_transactions(
            &db,
            Scope::Any,
            &TransactionFilter::default(),
            PageRequest::new(Some(10), Some(2)),
            Sort::default(),
        )
        .await?;
        assert!(past_end.items.is_empty());
        assert_eq!(past_end.total_count, 5);

        Ok(())
    }

    #[tokio::test]
    async fn test_list_sorting_by_total_ascending() -> Result<()> {
        let (db, person, product) = setup_with_catalog().await?;
        for quantity in [3, 1, 2] {
            create_test_transaction(&db, Scope::Any, &person.rut, &[item(product.id, quantity)]).await?;
        }

        let page = list_transactions(
            &db,
            Scope::Any,
            &TransactionFilter::default(),
            PageRequest::default(),
            Sort {
                field: SortField::TotalAmount,
                order: SortOrder::Asc,
            },
        )
        .await?;

        let totals: Vec<f64> = page.items.iter().map(|t| t.transaction.total_amount).collect();
        assert_eq!(totals, vec![500.0, 1000.0, 1500.0]);

        Ok(())
    }

    #[tokio::test]
    async fn test_list_filters() -> Result<()> {
        let (db, person, product) = setup_with_catalog().await?;
        let other = create_custom_person(&db, "22222222-2", "Distribuidora Sur").await?;

        let mut fields = sample_fields(&person.rut);
        fields.payment_method = PaymentMethod::Check;
        fields.counterparty_id = Some("SUP001".to_string());
        crate::core::transaction::create_transaction(&db, Scope::Any, fields, vec![item(product.id, 1)]).await?;
        create_test_transaction(&db, Scope::Any, &other.rut, &[item(product.id, 1)]).await?;

        let by_rut = TransactionFilter {
            rut: Some(other.rut.clone()),
            ..Default::default()
        };
        let page = list_transactions(&db, Scope::Any, &by_rut, PageRequest::default(), Sort::default()).await?;
        assert_eq!(page.total_count, 1);
        assert_eq!(page.items[0].transaction.rut, other.rut);

        let by_method = TransactionFilter {
            payment_method: Some(PaymentMethod::Check),
            ..Default::default()
        };
        let page = list_transactions(&db, Scope::Any, &by_method, PageRequest::default(), Sort::default()).await?;
        assert_eq!(page.total_count, 1);
        assert_eq!(page.items[0].transaction.rut, person.rut);

        let by_counterparty = TransactionFilter {
            counterparty_id: Some("SUP001".to_string()),
            rut: Some(other.rut.clone()),
            ..Default::default()
        };
        let page =
            list_transactions(&db, Scope::Any, &by_counterparty, PageRequest::default(), Sort::default()).await?;
        assert_eq!(page.total_count, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_list_is_scoped_by_kind() -> Result<()> {
        let (db, person, product) = setup_with_catalog().await?;
        create_test_transaction(&db, SALES, &person.rut, &[item(product.id, 1)]).await?;
        create_test_transaction(&db, PURCHASES, &person.rut, &[item(product.id, 1)]).await?;
        create_test_transaction(&db, PURCHASES, &person.rut, &[item(product.id, 1)]).await?;

        let all = TransactionFilter::default();
        let sales = list_transactions(&db, SALES, &all, PageRequest::default(), Sort::default()).await?;
        let purchases = list_transactions(&db, PURCHASES, &all, PageRequest::default(), Sort::default()).await?;
        let everything = list_transactions(&db, Scope::Any, &all, PageRequest::default(), Sort::default()).await?;
        assert_eq!(sales.total_count, 1);
        assert_eq!(purchases.total_count, 2);
        assert_eq!(everything.total_count, 3);
        assert!(sales.items.iter().all(|t| t.transaction.kind == TransactionKind::Sale));

        let sales_filter = TransactionFilter {
            kind: Some(TransactionKind::Sale),
            ..Default::default()
        };
        let filtered = list_transactions(&db, Scope::Any, &sales_filter, PageRequest::default(), Sort::default()).await?;
        assert_eq!(filtered.total_count, 1);

        assert_eq!(count_transactions(&db, PURCHASES).await?, 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_transactions_by_rut_with_no_transactions() -> Result<()> {
        let (db, person, _product) = setup_with_catalog().await?;

        let result = transactions_by_rut(&db, Scope::Any, &person.rut).await?;
        assert_eq!(result.total_transactions, 0);
        assert!(result.transactions.is_empty());
        assert_eq!(result.person_name, "Juan Pérez");

        Ok(())
    }

    #[tokio::test]
    async fn test_transactions_by_rut_unknown_person() -> Result<()> {
        let db = setup_test_db().await?;

        let result = transactions_by_rut(&db, Scope::Any, "99999999-9").await;
        assert!(matches!(result, Err(Error::PersonNotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_transactions_by_rut_is_unpaginated() -> Result<()> {
        let (db, person, product) = setup_with_catalog().await?;
        for _ in 0..12 {
            create_test_transaction(&db, Scope::Any, &person.rut, &[item(product.id, 1)]).await?;
        }

        let result = transactions_by_rut(&db, Scope::Any, &person.rut).await?;
        assert_eq!(result.total_transactions, 12);
        assert_eq!(result.transactions.len(), 12);

        Ok(())
    }

    #[tokio::test]
    async fn test_transactions_by_date_range_requires_a_bound() -> Result<()> {
        let db = setup_test_db().await?;

        let result =
            transactions_by_date_range(&db, Scope::Any, DateRange::default(), PageRequest::default()).await;
        assert!(matches!(result, Err(Error::DateRequired)));

        Ok(())
    }

    #[tokio::test]
    async fn test_transactions_by_date_range_bounds_are_inclusive() -> Result<()> {
        let (db, person, product) = setup_with_catalog().await?;
        let jan = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let feb = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let mar = Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap();
        for date in [jan, feb, mar] {
            create_dated_transaction(&db, &person.rut, product.id, date).await?;
        }

        let range = DateRange::parse(Some("2024-02-01"), None)?;
        let result = transactions_by_date_range(&db, Scope::Any, range, PageRequest::default()).await?;
        assert_eq!(result.page.total_count, 2);

        let range = DateRange::parse(None, Some("2024-02-01"))?;
        let result = transactions_by_date_range(&db, Scope::Any, range, PageRequest::default()).await?;
        assert_eq!(result.page.total_count, 2);
        assert_eq!(result.range.end_date, Some(feb));

        let range = DateRange::parse(Some("2024-02-01"), Some("2024-02-01"))?;
        let result = transactions_by_date_range(&db, Scope::Any, range, PageRequest::default()).await?;
        assert_eq!(result.page.total_count, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_transactions_by_date_range_and_rut() -> Result<()> {
        let (db, person, product) = setup_with_catalog().await?;
        let other = create_custom_person(&db, "22222222-2", "Distribuidora Sur").await?;
        let date = Utc.with_ymd_and_hms(2024, 5, 10, 0, 0, 0).unwrap();
        create_dated_transaction(&db, &person.rut, product.id, date).await?;
        create_dated_transaction(&db, &other.rut, product.id, date).await?;

        let missing = transactions_by_date_range_and_rut(
            &db,
            Scope::Any,
            None,
            DateRange::default(),
            PageRequest::default(),
        )
        .await;
        assert!(matches!(missing, Err(Error::RutRequired)));

        let blank = transactions_by_date_range_and_rut(
            &db,
            Scope::Any,
            Some("  "),
            DateRange::default(),
            PageRequest::default(),
        )
        .await;
        assert!(matches!(blank, Err(Error::RutRequired)));

        let unknown = transactions_by_date_range_and_rut(
            &db,
            Scope::Any,
            Some("99999999-9"),
            DateRange::default(),
            PageRequest::default(),
        )
        .await;
        assert!(matches!(unknown, Err(Error::PersonNotFound { .. })));

        // No dates: every transaction of the person
        let result = transactions_by_date_range_and_rut(
            &db,
            Scope::Any,
            Some(&person.rut),
            DateRange::default(),
            PageRequest::default(),
        )
        .await?;
        assert_eq!(result.page.total_count, 1);
        assert_eq!(result.person_name, "Juan Pérez");

        let range = DateRange::parse(Some("2024-06-01"), None)?;
        let result = transactions_by_date_range_and_rut(
            &db,
            Scope::Any,
            Some(&person.rut),
            range,
            PageRequest::default(),
        )
        .await?;
        assert_eq!(result.page.total_count, 0);

        Ok(())
    }
}
