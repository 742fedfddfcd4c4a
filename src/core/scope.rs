//! Kind scoping for reads and writes on the shared transactions table.

use crate::entities::{TransactionColumn, TransactionKind};
use sea_orm::{Condition, prelude::*};

/// Which transactions an operation may see and which kind it writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Every transaction; the kind is chosen by the caller at creation time.
    Any,
    /// Only transactions of one kind; creation always stamps this kind.
    Only(TransactionKind),
}

impl Scope {
    /// Kind stamped when none is requested in [`Scope::Any`].
    pub const DEFAULT_KIND: TransactionKind = TransactionKind::Purchase;

    /// Kind to stamp on a new transaction. A requested kind is ignored in a
    /// kind-bound scope.
    #[must_use]
    pub fn kind_for_create(self, requested: Option<TransactionKind>) -> TransactionKind {
        match self {
            Self::Any => requested.unwrap_or(Self::DEFAULT_KIND),
            Self::Only(kind) => kind,
        }
    }

    /// Query condition restricting rows to this scope.
    #[must_use]
    pub fn condition(self) -> Condition {
        match self {
            Self::Any => Condition::all(),
            Self::Only(kind) => Condition::all().add(TransactionColumn::Kind.eq(kind)),
        }
    }
}
