//! Product entity - Items that can appear on a transaction line.
//!
//! The live `price` is only read when a line item is created; the line item keeps
//! its own copy so later price changes do not rewrite history.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key, column_name = "productid")]
    pub id: i64,
    /// Name of the product (e.g., "Harina", "Aceite")
    pub name: String,
    /// Optional free-text description
    pub description: Option<String>,
    /// Unit of measure label (e.g., "kg", "unidad")
    pub measure: String,
    /// Category label
    #[sea_orm(column_name = "type")]
    pub product_type: String,
    /// Current unit price in whole currency units
    pub price: i64,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One product appears on many line items
    #[sea_orm(has_many = "super::line_item::Entity")]
    LineItems,
}

impl Related<super::line_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LineItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
