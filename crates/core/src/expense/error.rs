//! Expense operation errors.

use expensa_shared::types::{CategoryId, ExpenseId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::expense::types::ExpenseStatus;
use crate::ports::StoreError;

/// Errors that can occur while submitting or reviewing expenses.
#[derive(Debug, Error)]
pub enum ExpenseError {
    /// Attempted an invalid status transition.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidStateTransition {
        /// The current status.
        from: ExpenseStatus,
        /// The attempted target status.
        to: ExpenseStatus,
    },

    /// Approving would push the owner's spend over the policy limit.
    #[error("Budget exceeded: {current_spent} already spent, limit {limit}, expense {amount}")]
    BudgetExceeded {
        /// Approved spend already in the window.
        current_spent: Decimal,
        /// Policy limit.
        limit: Decimal,
        /// The expense amount.
        amount: Decimal,
    },

    /// The category does not belong to the organization.
    #[error("Category {0} not found in this organization")]
    CategoryNotInOrganization(CategoryId),

    /// Expense not found.
    #[error("Expense {0} not found")]
    NotFound(ExpenseId),

    /// The actor is not a member of the organization.
    #[error("Not a member of this organization")]
    NotMember,

    /// The actor is not an administrator of the organization.
    #[error("Only admins can review expenses")]
    NotAdmin,

    /// Amount must be positive.
    #[error("Amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    /// Description must not be blank.
    #[error("Description is required")]
    DescriptionRequired,

    /// Storage failure.
    #[error("Database error: {0}")]
    Store(String),
}

impl ExpenseError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidStateTransition { .. }
            | Self::InvalidAmount(_)
            | Self::DescriptionRequired => 400,
            Self::NotMember | Self::NotAdmin => 403,
            Self::CategoryNotInOrganization(_) | Self::NotFound(_) => 404,
            Self::BudgetExceeded { .. } => 422,
            Self::Store(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidStateTransition { .. } => "INVALID_STATE_TRANSITION",
            Self::BudgetExceeded { .. } => "BUDGET_EXCEEDED",
            Self::CategoryNotInOrganization(_) => "CATEGORY_NOT_IN_ORGANIZATION",
            Self::NotFound(_) => "EXPENSE_NOT_FOUND",
            Self::NotMember => "NOT_A_MEMBER",
            Self::NotAdmin => "ADMIN_REQUIRED",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::DescriptionRequired => "DESCRIPTION_REQUIRED",
            Self::Store(_) => "DATABASE_ERROR",
        }
    }
}

impl From<StoreError> for ExpenseError {
    fn from(err: StoreError) -> Self {
        Self::Store(err.to_string())
    }
}
