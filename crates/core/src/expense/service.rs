//! Expense orchestration over the store ports.
//!
//! Every operation reads and writes through one store handle. The database
//! layer binds that handle to a single transaction so the resolve →
//! aggregate → write sequence sees one snapshot.

use chrono::{DateTime, Utc};
use expensa_shared::types::{ExpenseId, OrganizationId, PolicyId, UserId};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::budget::{BudgetAggregator, BudgetCheck, SpendKey, is_storable_amount};
use crate::expense::classification::{Classification, ClassificationService};
use crate::expense::error::ExpenseError;
use crate::expense::review::ReviewService;
use crate::expense::types::{Expense, ExpenseStatus, NewExpense, Submission};
use crate::policy::{Policy, PolicyResolver};
use crate::ports::{Directory, ExpenseStore, PolicyStore};

/// A stored expense together with the decision that produced its status.
#[derive(Debug, Clone, Serialize)]
pub struct SubmittedExpense {
    /// The persisted expense.
    pub expense: Expense,
    /// Policy applied at submission, if any.
    pub policy_id: Option<PolicyId>,
    /// Classification outcome.
    pub classification: Classification,
}

/// Submission, review and listing of expenses on behalf of an acting user.
pub struct ExpenseService<S> {
    store: S,
}

impl<S> ExpenseService<S>
where
    S: PolicyStore + ExpenseStore + Directory,
{
    /// Creates a service over the given store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Submits an expense and stores it with its classified status.
    ///
    /// An over-budget submission is not an error: it is stored as rejected.
    ///
    /// # Errors
    ///
    /// - `NotMember` if the actor does not belong to the organization
    /// - `InvalidAmount` if the amount is not positive, has more than four
    ///   significant decimal places, or exceeds the storable maximum
    /// - `DescriptionRequired` if the description is blank
    /// - `CategoryNotInOrganization` if the category belongs elsewhere
    pub async fn submit(
        &self,
        actor: UserId,
        submission: Submission,
    ) -> Result<SubmittedExpense, ExpenseError> {
        let organization_id = submission.organization_id;
        self.require_member(actor, organization_id).await?;

        if !is_storable_amount(submission.amount) {
            return Err(ExpenseError::InvalidAmount(submission.amount));
        }
        let description = submission.description.trim();
        if description.is_empty() {
            return Err(ExpenseError::DescriptionRequired);
        }

        if !self
            .store
            .category_belongs_to_org(submission.category_id, organization_id)
            .await?
        {
            return Err(ExpenseError::CategoryNotInOrganization(
                submission.category_id,
            ));
        }

        let key = SpendKey {
            user_id: actor,
            category_id: submission.category_id,
            organization_id,
        };
        let (policy, classification) = self
            .classify(key, submission.amount, submission.date)
            .await?;

        let expense = self
            .store
            .insert_expense(NewExpense {
                key,
                amount: submission.amount,
                date: submission.date,
                description: description.to_string(),
                status: classification.status(),
            })
            .await?;

        Ok(SubmittedExpense {
            expense,
            policy_id: policy.map(|p| p.id),
            classification,
        })
    }

    /// Classifies a prospective expense without storing it.
    ///
    /// Returns the resolved policy alongside the outcome.
    pub async fn classify(
        &self,
        key: SpendKey,
        amount: Decimal,
        date: DateTime<Utc>,
    ) -> Result<(Option<Policy>, Classification), ExpenseError> {
        let policy = PolicyResolver::resolve(
            &self.store,
            key.organization_id,
            key.category_id,
            key.user_id,
        )
        .await?;

        let current_spent = match &policy {
            Some(policy) => {
                BudgetAggregator::total_approved_spend(
                    &self.store,
                    key,
                    date,
                    policy.spend_period,
                    None,
                )
                .await?
            }
            None => Decimal::ZERO,
        };

        let classification = ClassificationService::classify(policy.as_ref(), current_spent, amount);
        Ok((policy, classification))
    }

    /// Approves a pending expense after re-validating the owner's budget.
    ///
    /// The expense being approved is excluded from the aggregate; it is
    /// not yet approved and must not count against itself.
    ///
    /// # Errors
    ///
    /// - `NotAdmin` if the actor does not administer the organization
    /// - `NotFound` if the expense does not exist in this organization
    /// - `InvalidStateTransition` if the expense is not pending
    /// - `BudgetExceeded` if approval would overspend; nothing is written
    pub async fn approve(
        &self,
        actor: UserId,
        organization_id: OrganizationId,
        expense_id: ExpenseId,
    ) -> Result<Expense, ExpenseError> {
        self.require_admin(actor, organization_id).await?;
        let expense = self.load(organization_id, expense_id).await?;
        ReviewService::ensure_pending(expense.status, ExpenseStatus::Approved)?;

        let budget = self.revalidate(&expense).await?;
        let action = ReviewService::approve(expense.status, actor, budget.as_ref())?;

        Ok(self.store.record_review(expense.id, &action).await?)
    }

    /// Rejects a pending expense. No budget check is involved.
    ///
    /// # Errors
    ///
    /// - `NotAdmin` if the actor does not administer the organization
    /// - `NotFound` if the expense does not exist in this organization
    /// - `InvalidStateTransition` if the expense is not pending
    pub async fn reject(
        &self,
        actor: UserId,
        organization_id: OrganizationId,
        expense_id: ExpenseId,
        comment: Option<String>,
    ) -> Result<Expense, ExpenseError> {
        self.require_admin(actor, organization_id).await?;
        let expense = self.load(organization_id, expense_id).await?;

        let action = ReviewService::reject(expense.status, actor, comment)?;
        Ok(self.store.record_review(expense.id, &action).await?)
    }

    /// Lists the actor's own expenses in an organization, newest first.
    pub async fn list_mine(
        &self,
        actor: UserId,
        organization_id: OrganizationId,
    ) -> Result<Vec<Expense>, ExpenseError> {
        self.require_member(actor, organization_id).await?;
        Ok(self
            .store
            .list_user_expenses(organization_id, actor)
            .await?)
    }

    /// Lists an organization's pending expenses, oldest first. Admins only.
    pub async fn list_pending(
        &self,
        actor: UserId,
        organization_id: OrganizationId,
    ) -> Result<Vec<Expense>, ExpenseError> {
        self.require_admin(actor, organization_id).await?;
        Ok(self.store.list_pending_expenses(organization_id).await?)
    }

    async fn revalidate(&self, expense: &Expense) -> Result<Option<BudgetCheck>, ExpenseError> {
        let key = expense.spend_key();
        let Some(policy) =
            PolicyResolver::resolve(&self.store, key.organization_id, key.category_id, key.user_id)
                .await?
        else {
            return Ok(None);
        };

        let current_spent = BudgetAggregator::total_approved_spend(
            &self.store,
            key,
            expense.date,
            policy.spend_period,
            Some(expense.id),
        )
        .await?;

        Ok(Some(BudgetCheck::new(
            current_spent,
            policy.max_amount,
            expense.amount,
        )))
    }

    async fn load(
        &self,
        organization_id: OrganizationId,
        expense_id: ExpenseId,
    ) -> Result<Expense, ExpenseError> {
        self.store
            .find_expense(expense_id)
            .await?
            .filter(|e| e.organization_id == organization_id)
            .ok_or(ExpenseError::NotFound(expense_id))
    }

    async fn require_member(
        &self,
        actor: UserId,
        organization_id: OrganizationId,
    ) -> Result<(), ExpenseError> {
        if self.store.is_member(actor, organization_id).await? {
            Ok(())
        } else {
            Err(ExpenseError::NotMember)
        }
    }

    async fn require_admin(
        &self,
        actor: UserId,
        organization_id: OrganizationId,
    ) -> Result<(), ExpenseError> {
        if self.store.is_admin(actor, organization_id).await? {
            Ok(())
        } else {
            Err(ExpenseError::NotAdmin)
        }
    }
}
