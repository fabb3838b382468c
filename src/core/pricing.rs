//! Pricing engine - Turns a cart subtotal into tax and a grand total.
//!
//! This is the one place money arithmetic happens, so every caller agrees on
//! the same rounding rule. Amounts are `rust_decimal::Decimal`; tax is rounded
//! to cents with the half-to-even rule before it enters the total, which keeps
//! the stored tax amount and the stored grand total consistent with each other
//! no matter who computes them. The functions are pure so checkout previews,
//! the commit step, and the sales report all price identically.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Tax and grand total computed for one checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Totals {
    /// Sales tax on the subtotal, rounded to cents
    pub tax: Decimal,
    /// subtotal + tax + shipping, rounded to cents
    pub total: Decimal,
}

/// Rounds a dollar amount to cents, half-to-even.
#[must_use]
pub fn round2(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

/// Prices one checkout.
///
/// Tax is `round2(subtotal * tax_rate)`; the grand total is
/// `round2(subtotal + tax + shipping_cost)`. The already rounded tax feeds the
/// total, so `total - shipping_cost - subtotal` always equals the tax a caller
/// was shown.
#[must_use]
pub fn compute_totals(subtotal: Decimal, shipping_cost: Decimal, tax_rate: Decimal) -> Totals {
    let tax = round2(subtotal * tax_rate);
    let total = round2(subtotal + tax + shipping_cost);
    Totals { tax, total }
}
