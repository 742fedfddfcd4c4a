//! Person entity - Counterparties of a transaction, keyed by RUT.
//!
//! Persons are maintained outside this service; here they are only looked up
//! (and seeded from the catalog file). A transaction always references one.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Person database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "persons")]
pub struct Model {
    /// National identifier (RUT), used as natural key
    #[sea_orm(primary_key, auto_increment = false)]
    pub rut: String,
    /// First name or company name
    pub name: String,
    /// Optional last name
    #[sea_orm(column_name = "lastname")]
    pub last_name: Option<String>,
    /// Optional beneficiary reference
    #[sea_orm(column_name = "beneficiaryid")]
    pub beneficiary_id: Option<i32>,
}

impl Model {
    /// Name as shown next to a person's transactions, e.g. `"Juan Pérez"`.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.name, self.last_name.as_deref().unwrap_or_default())
            .trim()
            .to_string()
    }
}

/// Defines relationships between Person and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One person takes part in many transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
