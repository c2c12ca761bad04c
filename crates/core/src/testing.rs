//! In-memory store for engine tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use expensa_shared::types::{CategoryId, ExpenseId, OrganizationId, PolicyId, UserId};
use rust_decimal::Decimal;

use crate::budget::{SpendFilter, SpendKey};
use crate::expense::{Expense, ExpenseStatus, NewExpense, ReviewAction};
use crate::period::SpendPeriod;
use crate::policy::{NewPolicy, Policy, PolicyChanges, PolicyScope};
use crate::ports::{Directory, ExpenseStore, PolicyStore, StoreError};

#[derive(Default)]
struct State {
    policies: Vec<Policy>,
    expenses: Vec<Expense>,
    /// (organization, user) → is admin
    members: HashMap<(OrganizationId, UserId), bool>,
    categories: HashMap<CategoryId, OrganizationId>,
}

/// Shared, cloneable in-memory implementation of every port.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

/// An organization with one admin, one member and one category.
#[derive(Debug, Clone, Copy)]
pub struct OrgFixture {
    pub org: OrganizationId,
    pub admin: UserId,
    pub member: UserId,
    pub category: CategoryId,
}

impl OrgFixture {
    /// Spend key for the plain member in the fixture category.
    pub const fn member_key(&self) -> SpendKey {
        SpendKey {
            user_id: self.member,
            category_id: self.category,
            organization_id: self.org,
        }
    }
}

impl MemoryStore {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn org_fixture(&self) -> OrgFixture {
        let fx = OrgFixture {
            org: OrganizationId::new(),
            admin: UserId::new(),
            member: UserId::new(),
            category: CategoryId::new(),
        };
        let mut state = self.state();
        state.members.insert((fx.org, fx.admin), true);
        state.members.insert((fx.org, fx.member), false);
        state.categories.insert(fx.category, fx.org);
        fx
    }

    pub fn seed_policy(
        &self,
        organization_id: OrganizationId,
        category_id: CategoryId,
        scope: PolicyScope,
        max_amount: Decimal,
    ) -> Policy {
        self.push_policy(NewPolicy {
            organization_id,
            category_id,
            scope,
            max_amount,
            requires_review: false,
            spend_period: SpendPeriod::PerExpense,
        })
    }

    pub fn add_policy(
        &self,
        fx: &OrgFixture,
        scope: PolicyScope,
        max_amount: Decimal,
        requires_review: bool,
        spend_period: SpendPeriod,
    ) -> Policy {
        self.push_policy(NewPolicy {
            organization_id: fx.org,
            category_id: fx.category,
            scope,
            max_amount,
            requires_review,
            spend_period,
        })
    }

    pub fn seed_expense(
        &self,
        key: SpendKey,
        amount: Decimal,
        date: DateTime<Utc>,
        status: ExpenseStatus,
    ) -> Expense {
        self.push_expense(NewExpense {
            key,
            amount,
            date,
            description: "seeded".to_string(),
            status,
        })
    }

    pub fn expense(&self, id: ExpenseId) -> Expense {
        self.state()
            .expenses
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .unwrap()
    }

    fn push_policy(&self, input: NewPolicy) -> Policy {
        let now = Utc::now();
        let policy = Policy {
            id: PolicyId::new(),
            organization_id: input.organization_id,
            category_id: input.category_id,
            scope: input.scope,
            max_amount: input.max_amount,
            requires_review: input.requires_review,
            spend_period: input.spend_period,
            created_at: now,
            updated_at: now,
        };
        self.state().policies.push(policy.clone());
        policy
    }

    fn push_expense(&self, input: NewExpense) -> Expense {
        let now = Utc::now();
        let expense = Expense {
            id: ExpenseId::new(),
            organization_id: input.key.organization_id,
            category_id: input.key.category_id,
            user_id: input.key.user_id,
            amount: input.amount,
            date: input.date,
            description: input.description,
            status: input.status,
            reviewed_by: None,
            reviewed_at: None,
            review_comment: None,
            created_at: now,
            updated_at: now,
        };
        self.state().expenses.push(expense.clone());
        expense
    }
}

#[async_trait]
impl PolicyStore for MemoryStore {
    async fn find_policy(
        &self,
        organization_id: OrganizationId,
        category_id: CategoryId,
        scope: PolicyScope,
    ) -> Result<Option<Policy>, StoreError> {
        Ok(self
            .state()
            .policies
            .iter()
            .find(|p| {
                p.organization_id == organization_id
                    && p.category_id == category_id
                    && p.scope == scope
            })
            .cloned())
    }

    async fn find_policy_by_id(&self, id: PolicyId) -> Result<Option<Policy>, StoreError> {
        Ok(self.state().policies.iter().find(|p| p.id == id).cloned())
    }

    async fn insert_policy(&self, policy: NewPolicy) -> Result<Policy, StoreError> {
        let taken = self.state().policies.iter().any(|p| {
            p.organization_id == policy.organization_id
                && p.category_id == policy.category_id
                && p.scope == policy.scope
        });
        if taken {
            return Err(StoreError::UniqueViolation("policies_scope".into()));
        }
        Ok(self.push_policy(policy))
    }

    async fn update_policy(
        &self,
        id: PolicyId,
        changes: PolicyChanges,
    ) -> Result<Policy, StoreError> {
        let mut state = self.state();
        let policy = state
            .policies
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::Backend(format!("policy {id} vanished")))?;
        if let Some(max_amount) = changes.max_amount {
            policy.max_amount = max_amount;
        }
        if let Some(requires_review) = changes.requires_review {
            policy.requires_review = requires_review;
        }
        if let Some(spend_period) = changes.spend_period {
            policy.spend_period = spend_period;
        }
        policy.updated_at = Utc::now();
        Ok(policy.clone())
    }

    async fn delete_policy(&self, id: PolicyId) -> Result<(), StoreError> {
        self.state().policies.retain(|p| p.id != id);
        Ok(())
    }

    async fn list_policies(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<Policy>, StoreError> {
        let mut policies: Vec<Policy> = self
            .state()
            .policies
            .iter()
            .filter(|p| p.organization_id == organization_id)
            .cloned()
            .collect();
        policies.sort_by_key(|p| (p.category_id, p.scope.user_id()));
        Ok(policies)
    }
}

#[async_trait]
impl ExpenseStore for MemoryStore {
    async fn sum_approved(&self, filter: &SpendFilter) -> Result<Decimal, StoreError> {
        Ok(self
            .state()
            .expenses
            .iter()
            .filter(|e| e.status == ExpenseStatus::Approved)
            .filter(|e| filter.matches(e.id, &e.spend_key(), e.date))
            .map(|e| e.amount)
            .sum())
    }

    async fn insert_expense(&self, expense: NewExpense) -> Result<Expense, StoreError> {
        Ok(self.push_expense(expense))
    }

    async fn find_expense(&self, id: ExpenseId) -> Result<Option<Expense>, StoreError> {
        Ok(self.state().expenses.iter().find(|e| e.id == id).cloned())
    }

    async fn record_review(
        &self,
        id: ExpenseId,
        action: &ReviewAction,
    ) -> Result<Expense, StoreError> {
        let mut state = self.state();
        let expense = state
            .expenses
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| StoreError::Backend(format!("expense {id} vanished")))?;
        expense.status = action.new_status();
        expense.reviewed_by = Some(action.reviewed_by());
        expense.reviewed_at = Some(action.reviewed_at());
        expense.review_comment = action.comment().map(str::to_string);
        expense.updated_at = Utc::now();
        Ok(expense.clone())
    }

    async fn list_user_expenses(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> Result<Vec<Expense>, StoreError> {
        let mut expenses: Vec<Expense> = self
            .state()
            .expenses
            .iter()
            .filter(|e| e.organization_id == organization_id && e.user_id == user_id)
            .cloned()
            .collect();
        expenses.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(expenses)
    }

    async fn list_pending_expenses(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<Expense>, StoreError> {
        Ok(self
            .state()
            .expenses
            .iter()
            .filter(|e| {
                e.organization_id == organization_id && e.status == ExpenseStatus::Pending
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl Directory for MemoryStore {
    async fn is_member(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> Result<bool, StoreError> {
        Ok(self
            .state()
            .members
            .contains_key(&(organization_id, user_id)))
    }

    async fn is_admin(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> Result<bool, StoreError> {
        Ok(self
            .state()
            .members
            .get(&(organization_id, user_id))
            .copied()
            .unwrap_or(false))
    }

    async fn category_belongs_to_org(
        &self,
        category_id: CategoryId,
        organization_id: OrganizationId,
    ) -> Result<bool, StoreError> {
        Ok(self.state().categories.get(&category_id) == Some(&organization_id))
    }
}
