// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::LedgerError;

/// Result of deriving tax from a base amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxBreakdown {
    pub tax: Decimal,
    pub total: Decimal,
}

/// Derive `tax` and `total` from a base amount and a percentage rate.
///
/// `tax = round2(base * rate / 100)`, `total = round2(base + tax)`.
/// Rounding is half-away-from-zero at two decimal places (currency
/// granularity). A negative base is a correction entry and propagates its
/// sign. A negative rate is rejected, and so is a base whose scaled
/// product or grossed-up total has no `Decimal` representation; both
/// report `INVALID_INPUT`. Pure function, no side effects.
pub fn compute(base: Decimal, rate_percent: Decimal) -> Result<TaxBreakdown, LedgerError> {
    if rate_percent < Decimal::ZERO {
        return Err(LedgerError::InvalidInput {
            field: "rate_percent",
            reason: format!("rate must not be negative, got {rate_percent}"),
        });
    }
    let overflow = || LedgerError::InvalidInput {
        field: "base",
        reason: format!("amount {base} overflows at rate {rate_percent}"),
    };
    let scaled = base.checked_mul(rate_percent).ok_or_else(overflow)?;
    let tax = round2(scaled / Decimal::ONE_HUNDRED);
    let total = round2(base.checked_add(tax).ok_or_else(overflow)?);
    Ok(TaxBreakdown { tax, total })
}

/// Round to currency granularity, keeping exactly two fractional digits
/// so the stored text form is stable ("150.00", not "150").
pub fn round2(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}
