//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod line_item;
pub mod person;
pub mod product;
pub mod transaction;

// Re-export specific types to avoid conflicts
pub use line_item::{Column as LineItemColumn, Entity as LineItem, Model as LineItemModel};
pub use person::{Column as PersonColumn, Entity as Person, Model as PersonModel};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel, PaymentMethod,
    TransactionKind,
};
