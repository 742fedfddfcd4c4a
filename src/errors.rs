use crate::entities::{PaymentMethod, TransactionKind};
use sea_orm::DbErr;
use thiserror::Error;

/// Message returned to callers for failures they cannot act on.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum Error {
    #[error("Person with RUT {rut} not found")]
    PersonNotFound { rut: String },

    #[error("Product with ID {product_id} not found")]
    ProductNotFound { product_id: i64 },

    #[error("Transaction with ID {id} not found")]
    TransactionNotFound { id: i64 },

    #[error("At least one of startDate or endDate is required")]
    DateRequired,

    #[error("The rut parameter is required")]
    RutRequired,

    #[error("At least one product is required")]
    EmptyItems,

    #[error("Quantity for product {product_id} must be a positive integer, got {quantity}")]
    InvalidQuantity { product_id: i64, quantity: i32 },

    #[error("Invalid amount: {amount}")]
    InvalidAmount { amount: f64 },

    #[error("Payment method {method} is not accepted for a {kind}")]
    PaymentMethodNotAllowed {
        method: PaymentMethod,
        kind: TransactionKind,
    },

    #[error("Notes must be at most {max} characters, got {len}")]
    NotesTooLong { max: usize, len: usize },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// How a failure should be reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced record does not exist
    NotFound,
    /// The request itself is wrong and retrying it unchanged will not help
    InvalidInput,
    /// Store, configuration or I/O failure
    Internal,
}

impl Error {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::PersonNotFound { .. }
            | Self::ProductNotFound { .. }
            | Self::TransactionNotFound { .. } => ErrorKind::NotFound,
            Self::DateRequired
            | Self::RutRequired
            | Self::EmptyItems
            | Self::InvalidQuantity { .. }
            | Self::InvalidAmount { .. }
            | Self::PaymentMethodNotAllowed { .. }
            | Self::NotesTooLong { .. }
            | Self::InvalidValue { .. } => ErrorKind::InvalidInput,
            Self::Config { .. } | Self::Database(_) | Self::Io(_) => ErrorKind::Internal,
        }
    }

    /// Text safe to hand back to a client. Internal failures never expose their cause.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self.kind() {
            ErrorKind::Internal => INTERNAL_ERROR_MESSAGE.to_string(),
            ErrorKind::NotFound | ErrorKind::InvalidInput => self.to_string(),
        }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
