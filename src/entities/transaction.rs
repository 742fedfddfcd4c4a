//! Transaction entity - Parent record of a sale or a purchase.
//!
//! Sales and purchases share this table; `kind` tells them apart and is never
//! changed after creation. Line items live in [`super::line_item`].
use crate::errors::Error;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// When the transaction took place
    pub transaction_date: DateTimeUtc,
    /// RUT of the person on the other side of the transaction
    pub rut: String,
    /// How it was paid
    pub payment_method: PaymentMethod,
    /// Total amount, computed from line items unless supplied by the caller
    pub total_amount: f64,
    /// Optional free text, at most 1000 characters
    pub notes: Option<String>,
    /// Sale or purchase
    pub kind: TransactionKind,
    /// Optional external customer/supplier reference
    pub counterparty_id: Option<String>,
    /// When the row was created
    pub created_at: DateTimeUtc,
    /// When the row was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction references one person
    #[sea_orm(
        belongs_to = "super::person::Entity",
        from = "Column::Rut",
        to = "super::person::Column::Rut",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Person,
    /// One transaction has many line items
    #[sea_orm(has_many = "super::line_item::Entity")]
    LineItems,
}

impl Related<super::person::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Person.def()
    }
}

impl Related<super::line_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LineItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Discriminator between the two flavours of transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Goods leaving the inventory
    #[sea_orm(string_value = "sale")]
    Sale,
    /// Goods entering the inventory
    #[sea_orm(string_value = "purchase")]
    Purchase,
}

/// Accepted payment methods.
///
/// `DebitCard` and `DigitalWallet` are only valid on sales, see
/// [`PaymentMethod::is_allowed_for`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash
    #[sea_orm(string_value = "cash")]
    Cash,
    /// Credit card
    #[sea_orm(string_value = "credit_card")]
    CreditCard,
    /// Bank transfer
    #[sea_orm(string_value = "bank_transfer")]
    BankTransfer,
    /// Cheque
    #[sea_orm(string_value = "check")]
    Check,
    /// Store credit line
    #[sea_orm(string_value = "credit_line")]
    CreditLine,
    /// Debit card (sales only)
    #[sea_orm(string_value = "debit_card")]
    DebitCard,
    /// Digital wallet (sales only)
    #[sea_orm(string_value = "digital_wallet")]
    DigitalWallet,
}

impl PaymentMethod {
    /// Whether this method can be used on a transaction of the given kind.
    #[must_use]
    pub const fn is_allowed_for(self, kind: TransactionKind) -> bool {
        match self {
            Self::DebitCard | Self::DigitalWallet => matches!(kind, TransactionKind::Sale),
            Self::Cash | Self::CreditCard | Self::BankTransfer | Self::Check | Self::CreditLine => {
                true
            }
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_value())
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_value())
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from_value(&s.to_string()).map_err(|_| Error::InvalidValue {
            field: "kind",
            value: s.to_string(),
        })
    }
}

impl FromStr for PaymentMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from_value(&s.to_string()).map_err(|_| Error::InvalidValue {
            field: "paymentMethod",
            value: s.to_string(),
        })
    }
}
