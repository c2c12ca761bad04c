//! Expense persistence and approved-spend aggregation.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use expensa_core::budget::SpendFilter;
use expensa_core::expense::{Expense, ExpenseStatus, NewExpense, ReviewAction};
use expensa_core::ports::{ExpenseStore, StoreError};
use expensa_shared::types::{CategoryId, ExpenseId, OrganizationId, UserId};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::entities::{expenses, sea_orm_active_enums::ExpenseStatus as DbExpenseStatus};
use crate::store::{SeaOrmStore, store_error};

#[async_trait]
impl<C> ExpenseStore for SeaOrmStore<'_, C>
where
    C: ConnectionTrait + Send + Sync,
{
    async fn sum_approved(&self, filter: &SpendFilter) -> Result<Decimal, StoreError> {
        let start: DateTime<FixedOffset> = filter.window.start.into();
        let end: DateTime<FixedOffset> = filter.window.end.into();

        let mut query = expenses::Entity::find()
            .select_only()
            .column_as(expenses::Column::Amount.sum(), "total")
            .filter(expenses::Column::UserId.eq(filter.key.user_id.0))
            .filter(expenses::Column::CategoryId.eq(filter.key.category_id.0))
            .filter(expenses::Column::OrganizationId.eq(filter.key.organization_id.0))
            .filter(expenses::Column::Status.eq(DbExpenseStatus::Approved))
            .filter(expenses::Column::Date.gte(start))
            .filter(expenses::Column::Date.lte(end));

        if let Some(excluded) = filter.exclude {
            query = query.filter(expenses::Column::Id.ne(excluded.0));
        }

        // SUM over zero rows is NULL.
        let total: Option<Option<Decimal>> = query
            .into_tuple()
            .one(self.db)
            .await
            .map_err(store_error)?;

        Ok(total.flatten().unwrap_or(Decimal::ZERO))
    }

    async fn insert_expense(&self, expense: NewExpense) -> Result<Expense, StoreError> {
        let now = Utc::now().into();

        let model = expenses::ActiveModel {
            id: Set(Uuid::now_v7()),
            organization_id: Set(expense.key.organization_id.0),
            category_id: Set(expense.key.category_id.0),
            user_id: Set(expense.key.user_id.0),
            amount: Set(expense.amount),
            date: Set(expense.date.into()),
            description: Set(expense.description),
            status: Set(core_status_to_db(expense.status)),
            reviewed_by: Set(None),
            reviewed_at: Set(None),
            review_comment: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = model.insert(self.db).await.map_err(store_error)?;
        Ok(expense_from_model(inserted))
    }

    async fn find_expense(&self, id: ExpenseId) -> Result<Option<Expense>, StoreError> {
        expenses::Entity::find_by_id(id.0)
            .one(self.db)
            .await
            .map(|model| model.map(expense_from_model))
            .map_err(store_error)
    }

    async fn record_review(
        &self,
        id: ExpenseId,
        action: &ReviewAction,
    ) -> Result<Expense, StoreError> {
        let existing = expenses::Entity::find_by_id(id.0)
            .one(self.db)
            .await
            .map_err(store_error)?
            .ok_or_else(|| StoreError::Backend(format!("Expense {id} disappeared during review")))?;

        let mut active: expenses::ActiveModel = existing.into();
        active.status = Set(core_status_to_db(action.new_status()));
        active.reviewed_by = Set(Some(action.reviewed_by().0));
        active.reviewed_at = Set(Some(action.reviewed_at().into()));
        active.review_comment = Set(action.comment().map(str::to_string));
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(self.db).await.map_err(store_error)?;
        Ok(expense_from_model(updated))
    }

    async fn list_user_expenses(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> Result<Vec<Expense>, StoreError> {
        expenses::Entity::find()
            .filter(expenses::Column::OrganizationId.eq(organization_id.0))
            .filter(expenses::Column::UserId.eq(user_id.0))
            .order_by_desc(expenses::Column::Date)
            .order_by_desc(expenses::Column::CreatedAt)
            .all(self.db)
            .await
            .map(|models| models.into_iter().map(expense_from_model).collect())
            .map_err(store_error)
    }

    async fn list_pending_expenses(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<Expense>, StoreError> {
        expenses::Entity::find()
            .filter(expenses::Column::OrganizationId.eq(organization_id.0))
            .filter(expenses::Column::Status.eq(DbExpenseStatus::Pending))
            .order_by_asc(expenses::Column::CreatedAt)
            .all(self.db)
            .await
            .map(|models| models.into_iter().map(expense_from_model).collect())
            .map_err(store_error)
    }
}

/// Converts an expense row into the engine's expense.
pub(crate) fn expense_from_model(model: expenses::Model) -> Expense {
    Expense {
        id: ExpenseId(model.id),
        organization_id: OrganizationId(model.organization_id),
        category_id: CategoryId(model.category_id),
        user_id: UserId(model.user_id),
        amount: model.amount,
        date: model.date.with_timezone(&Utc),
        description: model.description,
        status: db_status_to_core(model.status),
        reviewed_by: model.reviewed_by.map(UserId),
        reviewed_at: model.reviewed_at.map(|at| at.with_timezone(&Utc)),
        review_comment: model.review_comment,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

/// Converts DB expense status to core status.
pub(crate) const fn db_status_to_core(status: DbExpenseStatus) -> ExpenseStatus {
    match status {
        DbExpenseStatus::Pending => ExpenseStatus::Pending,
        DbExpenseStatus::Approved => ExpenseStatus::Approved,
        DbExpenseStatus::Rejected => ExpenseStatus::Rejected,
    }
}

/// Converts core expense status to DB status.
pub(crate) const fn core_status_to_db(status: ExpenseStatus) -> DbExpenseStatus {
    match status {
        ExpenseStatus::Pending => DbExpenseStatus::Pending,
        ExpenseStatus::Approved => DbExpenseStatus::Approved,
        ExpenseStatus::Rejected => DbExpenseStatus::Rejected,
    }
}
