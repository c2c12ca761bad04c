//! Transactional expense workflow.
//!
//! Submission and approval both read policy and approved spend, then write.
//! Each runs in one SERIALIZABLE transaction so two concurrent requests for
//! the same owner and window cannot both see the same headroom; the loser
//! fails at commit with a serialization error instead of overspending.

use expensa_core::expense::{Expense, ExpenseError, ExpenseService, Submission, SubmittedExpense};
use expensa_shared::types::{ExpenseId, OrganizationId, UserId};
use sea_orm::{DatabaseConnection, DatabaseTransaction, IsolationLevel, TransactionTrait};

use crate::store::SeaOrmStore;

/// Runs expense operations against the database.
#[derive(Debug, Clone)]
pub struct ExpenseWorkflowRepository {
    db: DatabaseConnection,
}

impl ExpenseWorkflowRepository {
    /// Creates a new expense workflow repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Submits an expense; classification and insert share one transaction.
    ///
    /// # Errors
    ///
    /// Returns the engine's validation errors, or `Store` if the database
    /// fails (including a serialization failure at commit).
    pub async fn submit(
        &self,
        actor: UserId,
        submission: Submission,
    ) -> Result<SubmittedExpense, ExpenseError> {
        let txn = self.begin().await?;
        let result = ExpenseService::new(SeaOrmStore::new(&txn))
            .submit(actor, submission)
            .await;
        let submitted = finish(txn, result).await?;

        tracing::info!(
            expense_id = %submitted.expense.id,
            org_id = %submitted.expense.organization_id,
            user_id = %actor,
            status = %submitted.expense.status,
            "Expense submitted"
        );
        Ok(submitted)
    }

    /// Approves a pending expense after re-validating the owner's budget.
    ///
    /// # Errors
    ///
    /// - `NotFound`, `NotAdmin`, `InvalidStateTransition`
    /// - `BudgetExceeded` carrying current spend and limit; nothing is written
    /// - `Store` on database failure
    pub async fn approve(
        &self,
        actor: UserId,
        organization_id: OrganizationId,
        expense_id: ExpenseId,
    ) -> Result<Expense, ExpenseError> {
        let txn = self.begin().await?;
        let result = ExpenseService::new(SeaOrmStore::new(&txn))
            .approve(actor, organization_id, expense_id)
            .await;

        match finish(txn, result).await {
            Ok(expense) => {
                tracing::info!(expense_id = %expense_id, reviewed_by = %actor, "Expense approved");
                Ok(expense)
            }
            Err(err @ ExpenseError::BudgetExceeded { .. }) => {
                tracing::info!(expense_id = %expense_id, error = %err, "Approval denied");
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Rejects a pending expense.
    ///
    /// # Errors
    ///
    /// - `NotFound`, `NotAdmin`, `InvalidStateTransition`
    /// - `Store` on database failure
    pub async fn reject(
        &self,
        actor: UserId,
        organization_id: OrganizationId,
        expense_id: ExpenseId,
        comment: Option<String>,
    ) -> Result<Expense, ExpenseError> {
        let txn = self.begin().await?;
        let result = ExpenseService::new(SeaOrmStore::new(&txn))
            .reject(actor, organization_id, expense_id, comment)
            .await;
        let expense = finish(txn, result).await?;

        tracing::info!(expense_id = %expense_id, reviewed_by = %actor, "Expense rejected");
        Ok(expense)
    }

    /// Lists the actor's expenses in an organization, newest first.
    ///
    /// # Errors
    ///
    /// Returns `NotMember` or `Store`.
    pub async fn list_mine(
        &self,
        actor: UserId,
        organization_id: OrganizationId,
    ) -> Result<Vec<Expense>, ExpenseError> {
        ExpenseService::new(SeaOrmStore::new(&self.db))
            .list_mine(actor, organization_id)
            .await
    }

    /// Lists an organization's pending expenses, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `NotAdmin` or `Store`.
    pub async fn list_pending(
        &self,
        actor: UserId,
        organization_id: OrganizationId,
    ) -> Result<Vec<Expense>, ExpenseError> {
        ExpenseService::new(SeaOrmStore::new(&self.db))
            .list_pending(actor, organization_id)
            .await
    }

    async fn begin(&self) -> Result<DatabaseTransaction, ExpenseError> {
        self.db
            .begin_with_config(Some(IsolationLevel::Serializable), None)
            .await
            .map_err(|e| ExpenseError::Store(e.to_string()))
    }
}

/// Commits on success, rolls back on failure.
async fn finish<T>(
    txn: DatabaseTransaction,
    result: Result<T, ExpenseError>,
) -> Result<T, ExpenseError> {
    match result {
        Ok(value) => {
            txn.commit()
                .await
                .map_err(|e| ExpenseError::Store(e.to_string()))?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::warn!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}
