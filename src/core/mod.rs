/// Catalog seeding from configuration
pub mod catalog;
/// Person lookups
pub mod person;
/// Product lookups and price changes
pub mod product;
/// Transaction reads, filtering, sorting and pagination
pub mod query;
/// Person and product reference checks for writes
pub mod references;
/// Kind scoping (sales, purchases, or both)
pub mod scope;
/// Total computation from line items
pub mod totals;
/// Atomic transaction create, update and delete
pub mod transaction;
