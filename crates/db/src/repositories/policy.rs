//! Policy persistence.

use async_trait::async_trait;
use chrono::Utc;
use expensa_core::period::SpendPeriod;
use expensa_core::policy::{NewPolicy, Policy, PolicyChanges, PolicyScope};
use expensa_core::ports::{PolicyStore, StoreError};
use expensa_shared::types::{CategoryId, OrganizationId, PolicyId};
use sea_orm::sea_query::NullOrdering;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, Order, QueryFilter, QueryOrder,
    Set,
};
use uuid::Uuid;

use crate::entities::{policies, sea_orm_active_enums::SpendPeriod as DbSpendPeriod};
use crate::store::{SeaOrmStore, store_error};

#[async_trait]
impl<C> PolicyStore for SeaOrmStore<'_, C>
where
    C: ConnectionTrait + Send + Sync,
{
    async fn find_policy(
        &self,
        organization_id: OrganizationId,
        category_id: CategoryId,
        scope: PolicyScope,
    ) -> Result<Option<Policy>, StoreError> {
        let user_filter = match scope.user_id() {
            Some(user_id) => policies::Column::UserId.eq(user_id.0),
            None => policies::Column::UserId.is_null(),
        };

        policies::Entity::find()
            .filter(policies::Column::OrganizationId.eq(organization_id.0))
            .filter(policies::Column::CategoryId.eq(category_id.0))
            .filter(user_filter)
            .one(self.db)
            .await
            .map(|model| model.map(policy_from_model))
            .map_err(store_error)
    }

    async fn find_policy_by_id(&self, id: PolicyId) -> Result<Option<Policy>, StoreError> {
        policies::Entity::find_by_id(id.0)
            .one(self.db)
            .await
            .map(|model| model.map(policy_from_model))
            .map_err(store_error)
    }

    async fn insert_policy(&self, policy: NewPolicy) -> Result<Policy, StoreError> {
        let now = Utc::now().into();

        let model = policies::ActiveModel {
            id: Set(Uuid::now_v7()),
            organization_id: Set(policy.organization_id.0),
            category_id: Set(policy.category_id.0),
            user_id: Set(policy.scope.user_id().map(|id| id.0)),
            max_amount: Set(policy.max_amount),
            requires_review: Set(policy.requires_review),
            spend_period: Set(core_period_to_db(policy.spend_period)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = model.insert(self.db).await.map_err(store_error)?;
        tracing::info!(
            policy_id = %inserted.id,
            org_id = %inserted.organization_id,
            category_id = %inserted.category_id,
            "Policy created"
        );
        Ok(policy_from_model(inserted))
    }

    async fn update_policy(
        &self,
        id: PolicyId,
        changes: PolicyChanges,
    ) -> Result<Policy, StoreError> {
        let existing = policies::Entity::find_by_id(id.0)
            .one(self.db)
            .await
            .map_err(store_error)?
            .ok_or_else(|| StoreError::Backend(format!("Policy {id} disappeared during update")))?;

        let mut active: policies::ActiveModel = existing.into();
        if let Some(max_amount) = changes.max_amount {
            active.max_amount = Set(max_amount);
        }
        if let Some(requires_review) = changes.requires_review {
            active.requires_review = Set(requires_review);
        }
        if let Some(spend_period) = changes.spend_period {
            active.spend_period = Set(core_period_to_db(spend_period));
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(self.db).await.map_err(store_error)?;
        tracing::info!(policy_id = %updated.id, "Policy updated");
        Ok(policy_from_model(updated))
    }

    async fn delete_policy(&self, id: PolicyId) -> Result<(), StoreError> {
        policies::Entity::delete_by_id(id.0)
            .exec(self.db)
            .await
            .map_err(store_error)?;
        tracing::info!(policy_id = %id, "Policy deleted");
        Ok(())
    }

    async fn list_policies(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<Policy>, StoreError> {
        policies::Entity::find()
            .filter(policies::Column::OrganizationId.eq(organization_id.0))
            .order_by_asc(policies::Column::CategoryId)
            .order_by_with_nulls(policies::Column::UserId, Order::Asc, NullOrdering::First)
            .all(self.db)
            .await
            .map(|models| models.into_iter().map(policy_from_model).collect())
            .map_err(store_error)
    }
}

/// Converts a policy row into the engine's policy.
pub(crate) fn policy_from_model(model: policies::Model) -> Policy {
    Policy {
        id: PolicyId(model.id),
        organization_id: OrganizationId(model.organization_id),
        category_id: CategoryId(model.category_id),
        scope: PolicyScope::from_user(model.user_id.map(Into::into)),
        max_amount: model.max_amount,
        requires_review: model.requires_review,
        spend_period: db_period_to_core(model.spend_period),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

/// Converts the database spend period to the engine's.
pub(crate) const fn db_period_to_core(period: DbSpendPeriod) -> SpendPeriod {
    match period {
        DbSpendPeriod::PerExpense => SpendPeriod::PerExpense,
        DbSpendPeriod::Daily => SpendPeriod::Daily,
        DbSpendPeriod::Weekly => SpendPeriod::Weekly,
        DbSpendPeriod::Monthly => SpendPeriod::Monthly,
        DbSpendPeriod::Yearly => SpendPeriod::Yearly,
    }
}

/// Converts the engine's spend period to the database enum.
pub(crate) const fn core_period_to_db(period: SpendPeriod) -> DbSpendPeriod {
    match period {
        SpendPeriod::PerExpense => DbSpendPeriod::PerExpense,
        SpendPeriod::Daily => DbSpendPeriod::Daily,
        SpendPeriod::Weekly => DbSpendPeriod::Weekly,
        SpendPeriod::Monthly => DbSpendPeriod::Monthly,
        SpendPeriod::Yearly => DbSpendPeriod::Yearly,
    }
}
