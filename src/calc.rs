// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Pure arithmetic shared by the ledger commands. Every operation is checked;
//! overflow surfaces as `WalletError::OutOfRange` instead of a panic.

use rust_decimal::Decimal;

use crate::error::WalletError;

/// `a + b` for money.
pub fn add_amount(a: Decimal, b: Decimal) -> Result<Decimal, WalletError> {
    a.checked_add(b).ok_or(WalletError::OutOfRange("amount"))
}

/// `a + b` for unit counts.
pub fn add_units(a: i64, b: i64) -> Result<i64, WalletError> {
    a.checked_add(b).ok_or(WalletError::OutOfRange("quantity"))
}

/// Unit price times quantity.
pub fn line_total(unit_price: Decimal, quantity: i64) -> Result<Decimal, WalletError> {
    unit_price
        .checked_mul(Decimal::from(quantity))
        .ok_or(WalletError::OutOfRange("line total"))
}

/// Blends existing stock value with a new delivery:
/// `(Q*C + q*c) / (Q+q)`. With no stock on either side the old cost stands.
pub fn weighted_average_cost(
    old_qty: i64,
    old_cost: Decimal,
    new_qty: i64,
    new_cost: Decimal,
) -> Result<Decimal, WalletError> {
    let total_qty = add_units(old_qty, new_qty)?;
    if total_qty <= 0 {
        return Ok(old_cost);
    }
    let value = add_amount(line_total(old_cost, old_qty)?, line_total(new_cost, new_qty)?)?;
    value
        .checked_div(Decimal::from(total_qty))
        .map(|c| c.normalize())
        .ok_or(WalletError::OutOfRange("average cost"))
}

pub fn sale_profit(
    selling_price: Decimal,
    cost_price: Decimal,
    quantity: i64,
) -> Result<Decimal, WalletError> {
    let margin = selling_price
        .checked_sub(cost_price)
        .ok_or(WalletError::OutOfRange("profit"))?;
    line_total(margin, quantity)
}
