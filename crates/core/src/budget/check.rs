//! Budget limit check.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Snapshot of a candidate amount against a policy limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetCheck {
    /// Approved spend already in the window.
    pub current_spent: Decimal,
    /// Policy limit for the window.
    pub limit: Decimal,
    /// Amount being checked.
    pub amount: Decimal,
}

impl BudgetCheck {
    /// Creates a new check.
    #[must_use]
    pub const fn new(current_spent: Decimal, limit: Decimal, amount: Decimal) -> Self {
        Self {
            current_spent,
            limit,
            amount,
        }
    }

    /// Spend in the window if the amount were approved; `None` on overflow.
    #[must_use]
    pub fn projected(&self) -> Option<Decimal> {
        self.current_spent.checked_add(self.amount)
    }

    /// Returns true if the projected spend stays within the limit (inclusive).
    ///
    /// A projection too large to represent is over any limit.
    #[must_use]
    pub fn is_within(&self) -> bool {
        self.projected().is_some_and(|projected| projected <= self.limit)
    }

    /// Remaining headroom before the amount is applied; never negative.
    #[must_use]
    pub fn remaining(&self) -> Decimal {
        self.limit
            .checked_sub(self.current_spent)
            .unwrap_or(Decimal::ZERO)
            .max(Decimal::ZERO)
    }
}

/// Decimal places an amount column keeps (`NUMERIC(19,4)`).
pub const AMOUNT_SCALE: u32 = 4;

/// Largest value an amount column holds: fifteen integer digits, four decimals.
#[must_use]
pub fn max_amount() -> Decimal {
    Decimal::from_i128_with_scale(9_999_999_999_999_999_999, AMOUNT_SCALE)
}

/// Returns true if the amount is positive and is stored without rounding.
///
/// Trailing zeros beyond four places are accepted (`1.50000`); significant
/// digits beyond them are not (`500.00004`).
#[must_use]
pub fn is_storable_amount(amount: Decimal) -> bool {
    amount > Decimal::ZERO && amount.normalize().scale() <= AMOUNT_SCALE && amount <= max_amount()
}
