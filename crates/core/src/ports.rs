//! Store interfaces the engine runs against.
//!
//! The database layer implements these over a single connection or
//! transaction so that a resolve → aggregate → write sequence observes one
//! consistent snapshot.

use async_trait::async_trait;
use expensa_shared::types::{CategoryId, ExpenseId, OrganizationId, PolicyId, UserId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::budget::SpendFilter;
use crate::expense::{Expense, NewExpense, ReviewAction};
use crate::policy::{NewPolicy, Policy, PolicyChanges, PolicyScope};

/// Errors reported by a store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Any other storage failure; treated as fatal.
    #[error("Storage error: {0}")]
    Backend(String),
}

/// Policy persistence.
#[async_trait]
pub trait PolicyStore: Send + Sync {
    /// Finds the policy at exactly this specificity level.
    async fn find_policy(
        &self,
        organization_id: OrganizationId,
        category_id: CategoryId,
        scope: PolicyScope,
    ) -> Result<Option<Policy>, StoreError>;

    /// Finds a policy by ID.
    async fn find_policy_by_id(&self, id: PolicyId) -> Result<Option<Policy>, StoreError>;

    /// Inserts a policy. Reports `UniqueViolation` when the scope is taken.
    async fn insert_policy(&self, policy: NewPolicy) -> Result<Policy, StoreError>;

    /// Applies mutable-field changes to an existing policy.
    async fn update_policy(&self, id: PolicyId, changes: PolicyChanges)
    -> Result<Policy, StoreError>;

    /// Deletes a policy.
    async fn delete_policy(&self, id: PolicyId) -> Result<(), StoreError>;

    /// Lists an organization's policies by category, org-wide first.
    async fn list_policies(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<Policy>, StoreError>;
}

/// Expense persistence and aggregation.
#[async_trait]
pub trait ExpenseStore: Send + Sync {
    /// Sums the amounts of APPROVED expenses matching the filter; zero when none match.
    async fn sum_approved(&self, filter: &SpendFilter) -> Result<Decimal, StoreError>;

    /// Inserts an expense with its decided status.
    async fn insert_expense(&self, expense: NewExpense) -> Result<Expense, StoreError>;

    /// Finds an expense by ID.
    async fn find_expense(&self, id: ExpenseId) -> Result<Option<Expense>, StoreError>;

    /// Records a review decision on an expense.
    async fn record_review(
        &self,
        id: ExpenseId,
        action: &ReviewAction,
    ) -> Result<Expense, StoreError>;

    /// Lists a member's expenses in an organization, newest first.
    async fn list_user_expenses(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> Result<Vec<Expense>, StoreError>;

    /// Lists an organization's pending expenses, oldest first.
    async fn list_pending_expenses(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<Expense>, StoreError>;
}

/// Membership and category lookups owned by the organization layer.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Returns true if the user belongs to the organization.
    async fn is_member(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> Result<bool, StoreError>;

    /// Returns true if the user is an administrator of the organization.
    async fn is_admin(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> Result<bool, StoreError>;

    /// Returns true if the category exists and belongs to the organization.
    async fn category_belongs_to_org(
        &self,
        category_id: CategoryId,
        organization_id: OrganizationId,
    ) -> Result<bool, StoreError>;
}
