//! Review transitions for pending expenses.
//!
//! Pure state-machine checks; the caller supplies the budget snapshot taken
//! inside the same store session.

use chrono::Utc;
use expensa_shared::types::UserId;

use crate::budget::BudgetCheck;
use crate::expense::error::ExpenseError;
use crate::expense::types::{ExpenseStatus, ReviewAction};

/// Stateless service for review transitions.
pub struct ReviewService;

impl ReviewService {
    /// Fails unless the expense is still pending.
    pub fn ensure_pending(current: ExpenseStatus, target: ExpenseStatus) -> Result<(), ExpenseError> {
        if Self::is_valid_transition(current, target) {
            Ok(())
        } else {
            Err(ExpenseError::InvalidStateTransition {
                from: current,
                to: target,
            })
        }
    }

    /// Approve a pending expense.
    ///
    /// # Arguments
    /// * `current` - The current status of the expense
    /// * `reviewed_by` - The approving administrator
    /// * `budget` - Re-validated budget snapshot, or `None` when no policy applies
    ///
    /// # Returns
    /// * `Ok(ReviewAction::Approve)` if the transition is valid
    /// * `Err(ExpenseError::InvalidStateTransition)` if not pending
    /// * `Err(ExpenseError::BudgetExceeded)` if approval would overspend
    pub fn approve(
        current: ExpenseStatus,
        reviewed_by: UserId,
        budget: Option<&BudgetCheck>,
    ) -> Result<ReviewAction, ExpenseError> {
        Self::ensure_pending(current, ExpenseStatus::Approved)?;

        if let Some(check) = budget
            && !check.is_within()
        {
            return Err(ExpenseError::BudgetExceeded {
                current_spent: check.current_spent,
                limit: check.limit,
                amount: check.amount,
            });
        }

        Ok(ReviewAction::Approve {
            reviewed_by,
            reviewed_at: Utc::now(),
        })
    }

    /// Reject a pending expense. Blank comments are dropped.
    pub fn reject(
        current: ExpenseStatus,
        reviewed_by: UserId,
        comment: Option<String>,
    ) -> Result<ReviewAction, ExpenseError> {
        Self::ensure_pending(current, ExpenseStatus::Rejected)?;

        Ok(ReviewAction::Reject {
            reviewed_by,
            reviewed_at: Utc::now(),
            comment: comment
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
        })
    }

    /// Returns true if `from` may move to `to` by review.
    #[must_use]
    pub const fn is_valid_transition(from: ExpenseStatus, to: ExpenseStatus) -> bool {
        matches!(
            (from, to),
            (
                ExpenseStatus::Pending,
                ExpenseStatus::Approved | ExpenseStatus::Rejected
            )
        )
    }
}
