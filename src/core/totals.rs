//! Transaction totals.
//!
//! A transaction's total is the sum of `quantity × unit_price` over its line
//! items, using the prices stored on the lines. A total supplied by the caller
//! wins, including an explicit zero.

use crate::{
    entities::line_item,
    errors::{Error, Result},
};

/// Sum of line subtotals.
///
/// # Errors
/// Returns [`Error::InvalidAmount`] if a subtotal or the sum overflows an `i64`.
pub fn compute_total(lines: &[line_item::Model]) -> Result<i64> {
    lines
        .iter()
        .try_fold(0_i64, |total, line| {
            line.subtotal().and_then(|subtotal| total.checked_add(subtotal))
        })
        .ok_or_else(|| Error::InvalidAmount {
            amount: approximate_total(lines),
        })
}

/// Total to store: the caller's value when present, the computed sum otherwise.
///
/// # Errors
/// Returns [`Error::InvalidAmount`] if the sum has to be computed and overflows.
#[allow(clippy::cast_precision_loss)]
pub fn resolve_total(supplied: Option<f64>, lines: &[line_item::Model]) -> Result<f64> {
    match supplied {
        Some(total) => Ok(total),
        None => compute_total(lines).map(|total| total as f64),
    }
}

#[allow(clippy::cast_precision_loss)]
fn approximate_total(lines: &[line_item::Model]) -> f64 {
    lines
        .iter()
        .map(|line| f64::from(line.quantity) * line.unit_price as f64)
        .sum()
}

/// Rejects caller-supplied totals that are negative or not finite.
///
/// # Errors
/// Returns [`Error::InvalidAmount`] for a bad total.
pub fn check_supplied_total(supplied: Option<f64>) -> Result<()> {
    match supplied {
        Some(amount) if !amount.is_finite() || amount < 0.0 => {
            Err(Error::InvalidAmount { amount })
        }
        _ => Ok(()),
    }
}
