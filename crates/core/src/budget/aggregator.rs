//! Approved-spend aggregation over a spend window.

use chrono::{DateTime, Utc};
use expensa_shared::types::{CategoryId, ExpenseId, OrganizationId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::period::{SpendPeriod, SpendWindow};
use crate::ports::{ExpenseStore, StoreError};

/// The owner/category/organization triple spend accumulates under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpendKey {
    /// Expense owner.
    pub user_id: UserId,
    /// Expense category.
    pub category_id: CategoryId,
    /// Organization.
    pub organization_id: OrganizationId,
}

/// Query for the sum of approved expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpendFilter {
    /// Whose spend, in which category and organization.
    pub key: SpendKey,
    /// Inclusive window on the expense date.
    pub window: SpendWindow,
    /// Expense to leave out (the one being re-validated).
    pub exclude: Option<ExpenseId>,
}

impl SpendFilter {
    /// Returns true if an approved expense with these attributes is counted.
    #[must_use]
    pub fn matches(&self, id: ExpenseId, key: &SpendKey, date: DateTime<Utc>) -> bool {
        self.exclude != Some(id) && self.key == *key && self.window.contains(date)
    }
}

/// Sums previously approved spend for a policy window.
pub struct BudgetAggregator;

impl BudgetAggregator {
    /// Total approved spend for `key` in the `period` window around `anchor`.
    ///
    /// `PerExpense` never accumulates and returns zero without touching the
    /// store. An empty window sums to zero.
    pub async fn total_approved_spend<S>(
        store: &S,
        key: SpendKey,
        anchor: DateTime<Utc>,
        period: SpendPeriod,
        exclude: Option<ExpenseId>,
    ) -> Result<Decimal, StoreError>
    where
        S: ExpenseStore + ?Sized,
    {
        if !period.accumulates() {
            return Ok(Decimal::ZERO);
        }

        let filter = SpendFilter {
            key,
            window: SpendWindow::compute(anchor, period),
            exclude,
        };

        store.sum_approved(&filter).await
    }
}
