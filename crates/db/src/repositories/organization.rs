//! Organization directory: membership, roles, and categories.

use async_trait::async_trait;
use chrono::Utc;
use expensa_core::ports::{Directory, StoreError};
use expensa_shared::types::{CategoryId, OrganizationId, UserId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{
    expense_categories, organization_members, organizations, sea_orm_active_enums::MemberRole,
    users,
};
use crate::store::{SeaOrmStore, store_error};

#[async_trait]
impl<C> Directory for SeaOrmStore<'_, C>
where
    C: ConnectionTrait + Send + Sync,
{
    async fn is_member(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> Result<bool, StoreError> {
        membership(self.db, organization_id.0, user_id.0)
            .await
            .map(|m| m.is_some())
            .map_err(store_error)
    }

    async fn is_admin(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> Result<bool, StoreError> {
        membership(self.db, organization_id.0, user_id.0)
            .await
            .map(|m| m.is_some_and(|m| m.role == MemberRole::Admin))
            .map_err(store_error)
    }

    async fn category_belongs_to_org(
        &self,
        category_id: CategoryId,
        organization_id: OrganizationId,
    ) -> Result<bool, StoreError> {
        let count = expense_categories::Entity::find()
            .filter(expense_categories::Column::Id.eq(category_id.0))
            .filter(expense_categories::Column::OrganizationId.eq(organization_id.0))
            .count(self.db)
            .await
            .map_err(store_error)?;

        Ok(count > 0)
    }
}

async fn membership<C: ConnectionTrait>(
    db: &C,
    org_id: Uuid,
    user_id: Uuid,
) -> Result<Option<organization_members::Model>, DbErr> {
    organization_members::Entity::find_by_id((user_id, org_id))
        .one(db)
        .await
}

/// Organization repository for directory writes.
///
/// Organization, member, and category CRUD belong to a separate admin
/// surface; this repository covers what seeding and tests need.
#[derive(Debug, Clone)]
pub struct OrganizationRepository {
    db: DatabaseConnection,
}

impl OrganizationRepository {
    /// Creates a new organization repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create_user(&self, email: &str, full_name: &str) -> Result<users::Model, DbErr> {
        let now = Utc::now().into();

        users::ActiveModel {
            id: Set(Uuid::now_v7()),
            email: Set(email.to_lowercase()),
            full_name: Set(full_name.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
    }

    /// Finds a user by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email.to_lowercase()))
            .one(&self.db)
            .await
    }

    /// Finds an organization by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<organizations::Model>, DbErr> {
        organizations::Entity::find_by_id(id).one(&self.db).await
    }

    /// Creates a new organization with the creator as admin.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create_with_admin(
        &self,
        name: &str,
        admin_id: Uuid,
    ) -> Result<organizations::Model, DbErr> {
        let txn = self.db.begin().await?;

        let now = Utc::now().into();
        let org_id = Uuid::now_v7();

        let org = organizations::ActiveModel {
            id: Set(org_id),
            name: Set(name.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        organization_members::ActiveModel {
            user_id: Set(admin_id),
            organization_id: Set(org_id),
            role: Set(MemberRole::Admin),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        tracing::info!(org_id = %org.id, admin_id = %admin_id, "Organization created");
        Ok(org)
    }

    /// Adds a user to an organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn add_member(
        &self,
        org_id: Uuid,
        user_id: Uuid,
        role: MemberRole,
    ) -> Result<organization_members::Model, DbErr> {
        organization_members::ActiveModel {
            user_id: Set(user_id),
            organization_id: Set(org_id),
            role: Set(role),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await
    }

    /// Gets a user's membership in an organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_membership(
        &self,
        org_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<organization_members::Model>, DbErr> {
        membership(&self.db, org_id, user_id).await
    }

    /// Creates an expense category in an organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails, including a duplicate name.
    pub async fn create_category(
        &self,
        org_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<expense_categories::Model, DbErr> {
        let now = Utc::now().into();

        expense_categories::ActiveModel {
            id: Set(Uuid::now_v7()),
            organization_id: Set(org_id),
            name: Set(name.to_string()),
            description: Set(description.map(str::to_string)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
    }
}
