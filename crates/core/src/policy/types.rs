//! Policy domain types.

use chrono::{DateTime, Utc};
use expensa_shared::types::{CategoryId, OrganizationId, PolicyId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::period::SpendPeriod;

/// Who a policy applies to within its organization and category.
///
/// At most one policy exists per (organization, category, scope).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "user_id", rename_all = "snake_case")]
pub enum PolicyScope {
    /// Applies to every member submitting in the category.
    OrganizationWide,
    /// Applies to exactly one member; takes precedence over the org-wide policy.
    User(UserId),
}

impl PolicyScope {
    /// Builds a scope from an optional user.
    #[must_use]
    pub const fn from_user(user_id: Option<UserId>) -> Self {
        match user_id {
            Some(user_id) => Self::User(user_id),
            None => Self::OrganizationWide,
        }
    }

    /// Returns the scoped user, if any.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        match self {
            Self::OrganizationWide => None,
            Self::User(user_id) => Some(*user_id),
        }
    }

    /// Returns true for a user-specific scope.
    #[must_use]
    pub const fn is_user_specific(&self) -> bool {
        matches!(self, Self::User(_))
    }
}

/// A rule capping spend for a category, optionally narrowed to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Policy ID.
    pub id: PolicyId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Category the limit applies to.
    pub category_id: CategoryId,
    /// Org-wide or user-specific.
    pub scope: PolicyScope,
    /// Spend limit within one period; always positive.
    pub max_amount: Decimal,
    /// Whether within-limit expenses still go to manual review.
    pub requires_review: bool,
    /// Accounting window for the limit.
    pub spend_period: SpendPeriod,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a policy.
#[derive(Debug, Clone)]
pub struct NewPolicy {
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Category the limit applies to.
    pub category_id: CategoryId,
    /// Org-wide or user-specific.
    pub scope: PolicyScope,
    /// Spend limit.
    pub max_amount: Decimal,
    /// Manual review flag.
    pub requires_review: bool,
    /// Accounting window.
    pub spend_period: SpendPeriod,
}

/// Changes to a policy. Identity (organization, category, scope) is immutable.
#[derive(Debug, Clone, Default)]
pub struct PolicyChanges {
    /// New spend limit.
    pub max_amount: Option<Decimal>,
    /// New manual review flag.
    pub requires_review: Option<bool>,
    /// New accounting window.
    pub spend_period: Option<SpendPeriod>,
}

impl PolicyChanges {
    /// Returns true if nothing would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.max_amount.is_none() && self.requires_review.is_none() && self.spend_period.is_none()
    }
}
