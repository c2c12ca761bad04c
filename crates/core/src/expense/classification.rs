//! Initial status decision for a submitted expense.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::budget::BudgetCheck;
use crate::expense::types::ExpenseStatus;
use crate::policy::Policy;

/// Why a submission received its initial status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Classification {
    /// No policy governs the category; queued for manual review.
    NoPolicy,
    /// The amount would push spend over the limit.
    OverBudget(BudgetCheck),
    /// Within the limit but the policy asks for review.
    RequiresReview(BudgetCheck),
    /// Within the limit, approved automatically.
    WithinBudget(BudgetCheck),
}

impl Classification {
    /// Returns the status the expense is stored with.
    #[must_use]
    pub const fn status(&self) -> ExpenseStatus {
        match self {
            Self::NoPolicy | Self::RequiresReview(_) => ExpenseStatus::Pending,
            Self::OverBudget(_) => ExpenseStatus::Rejected,
            Self::WithinBudget(_) => ExpenseStatus::Approved,
        }
    }

    /// Returns the budget snapshot, if a policy was applied.
    #[must_use]
    pub const fn budget(&self) -> Option<&BudgetCheck> {
        match self {
            Self::NoPolicy => None,
            Self::OverBudget(check) | Self::RequiresReview(check) | Self::WithinBudget(check) => {
                Some(check)
            }
        }
    }
}

/// Stateless classification rules.
pub struct ClassificationService;

impl ClassificationService {
    /// Classifies an amount against the resolved policy and prior spend.
    ///
    /// Over-budget wins over review: an expense that would exceed the limit is
    /// rejected even when the policy requires review.
    #[must_use]
    pub fn classify(policy: Option<&Policy>, current_spent: Decimal, amount: Decimal) -> Classification {
        let Some(policy) = policy else {
            return Classification::NoPolicy;
        };

        let check = BudgetCheck::new(current_spent, policy.max_amount, amount);
        if !check.is_within() {
            Classification::OverBudget(check)
        } else if policy.requires_review {
            Classification::RequiresReview(check)
        } else {
            Classification::WithinBudget(check)
        }
    }
}
