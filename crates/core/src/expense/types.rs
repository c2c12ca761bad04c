//! Expense domain types.

use chrono::{DateTime, Utc};
use expensa_shared::types::{CategoryId, ExpenseId, OrganizationId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::budget::SpendKey;

/// Expense status in the review lifecycle.
///
/// Submission assigns the initial status. The only transitions afterwards are:
/// - Pending → Approved (approve)
/// - Pending → Rejected (reject)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseStatus {
    /// Waiting for an administrator.
    Pending,
    /// Counts toward the owner's spend (terminal).
    Approved,
    /// Never counts toward spend (terminal).
    Rejected,
}

impl ExpenseStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns true if no further transition is possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A submitted expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// Expense ID.
    pub id: ExpenseId,
    /// Organization the expense was submitted to.
    pub organization_id: OrganizationId,
    /// Expense category.
    pub category_id: CategoryId,
    /// Submitting member.
    pub user_id: UserId,
    /// Positive amount.
    pub amount: Decimal,
    /// When the expense was incurred; anchors the spend window.
    pub date: DateTime<Utc>,
    /// Free-text description.
    pub description: String,
    /// Current status.
    pub status: ExpenseStatus,
    /// Reviewing administrator.
    pub reviewed_by: Option<UserId>,
    /// Review timestamp.
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Optional rejection comment.
    pub review_comment: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Returns the owner/category/organization triple spend is tracked by.
    #[must_use]
    pub const fn spend_key(&self) -> SpendKey {
        SpendKey {
            user_id: self.user_id,
            category_id: self.category_id,
            organization_id: self.organization_id,
        }
    }
}

/// A submission request from a member.
#[derive(Debug, Clone)]
pub struct Submission {
    /// Target organization.
    pub organization_id: OrganizationId,
    /// Expense category.
    pub category_id: CategoryId,
    /// Claimed amount.
    pub amount: Decimal,
    /// When the expense was incurred.
    pub date: DateTime<Utc>,
    /// Description.
    pub description: String,
}

/// An expense ready to be stored with its decided status.
#[derive(Debug, Clone)]
pub struct NewExpense {
    /// Owner, category and organization.
    pub key: SpendKey,
    /// Amount.
    pub amount: Decimal,
    /// Incurred date.
    pub date: DateTime<Utc>,
    /// Description.
    pub description: String,
    /// Status decided at submission.
    pub status: ExpenseStatus,
}

/// Review decision with audit data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewAction {
    /// Approve a pending expense.
    Approve {
        /// The approving administrator.
        reviewed_by: UserId,
        /// When the expense was approved.
        reviewed_at: DateTime<Utc>,
    },
    /// Reject a pending expense.
    Reject {
        /// The rejecting administrator.
        reviewed_by: UserId,
        /// When the expense was rejected.
        reviewed_at: DateTime<Utc>,
        /// Optional explanation.
        comment: Option<String>,
    },
}

impl ReviewAction {
    /// Returns the status resulting from this action.
    #[must_use]
    pub const fn new_status(&self) -> ExpenseStatus {
        match self {
            Self::Approve { .. } => ExpenseStatus::Approved,
            Self::Reject { .. } => ExpenseStatus::Rejected,
        }
    }

    /// Returns the reviewing administrator.
    #[must_use]
    pub const fn reviewed_by(&self) -> UserId {
        match self {
            Self::Approve { reviewed_by, .. } | Self::Reject { reviewed_by, .. } => *reviewed_by,
        }
    }

    /// Returns the review timestamp.
    #[must_use]
    pub const fn reviewed_at(&self) -> DateTime<Utc> {
        match self {
            Self::Approve { reviewed_at, .. } | Self::Reject { reviewed_at, .. } => *reviewed_at,
        }
    }

    /// Returns the review comment, if any.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        match self {
            Self::Approve { .. } => None,
            Self::Reject { comment, .. } => comment.as_deref(),
        }
    }
}
