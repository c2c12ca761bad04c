//! Policy administration.

use expensa_shared::types::{CategoryId, OrganizationId, PolicyId, UserId};
use rust_decimal::Decimal;

use crate::budget::is_storable_amount;
use crate::policy::error::PolicyError;
use crate::policy::resolver::PolicyResolver;
use crate::policy::types::{NewPolicy, Policy, PolicyChanges, PolicyScope};
use crate::ports::{Directory, PolicyStore};

/// Policy management on behalf of an acting user.
///
/// Creation, update and deletion require the actor to administer the
/// policy's organization; listing and resolution only require membership.
pub struct PolicyService<S> {
    store: S,
}

impl<S> PolicyService<S>
where
    S: PolicyStore + Directory,
{
    /// Creates a service over the given store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates a policy.
    ///
    /// # Errors
    ///
    /// - `NotAdmin` if the actor does not administer the organization
    /// - `CategoryNotInOrganization` if the category belongs elsewhere
    /// - `MemberNotInOrganization` if the scoped user is not a member
    /// - `InvalidAmount` if the limit is not a storable positive amount
    /// - `Conflict` if a policy already exists at this specificity level
    pub async fn create(&self, actor: UserId, input: NewPolicy) -> Result<Policy, PolicyError> {
        self.require_admin(actor, input.organization_id).await?;
        self.require_category(input.category_id, input.organization_id)
            .await?;

        if let PolicyScope::User(user_id) = input.scope
            && !self.store.is_member(user_id, input.organization_id).await?
        {
            return Err(PolicyError::MemberNotInOrganization(user_id));
        }

        Self::validate_amount(input.max_amount)?;

        // The unique index still guards the race between this check and the insert.
        if self
            .store
            .find_policy(input.organization_id, input.category_id, input.scope)
            .await?
            .is_some()
        {
            return Err(PolicyError::Conflict);
        }

        Ok(self.store.insert_policy(input).await?)
    }

    /// Lists an organization's policies.
    ///
    /// # Errors
    ///
    /// Returns `NotMember` if the actor is not a member.
    pub async fn list(
        &self,
        actor: UserId,
        organization_id: OrganizationId,
    ) -> Result<Vec<Policy>, PolicyError> {
        self.require_member(actor, organization_id).await?;
        Ok(self.store.list_policies(organization_id).await?)
    }

    /// Updates the mutable fields of a policy.
    ///
    /// # Errors
    ///
    /// - `NotAdmin` if the actor does not administer the organization
    /// - `NotFound` if the policy does not exist in this organization
    /// - `InvalidAmount` if a new limit is not a storable positive amount
    pub async fn update(
        &self,
        actor: UserId,
        organization_id: OrganizationId,
        policy_id: PolicyId,
        changes: PolicyChanges,
    ) -> Result<Policy, PolicyError> {
        self.require_admin(actor, organization_id).await?;
        let policy = self.load(organization_id, policy_id).await?;

        if let Some(max_amount) = changes.max_amount {
            Self::validate_amount(max_amount)?;
        }

        if changes.is_empty() {
            return Ok(policy);
        }

        Ok(self.store.update_policy(policy_id, changes).await?)
    }

    /// Deletes a policy.
    ///
    /// # Errors
    ///
    /// - `NotAdmin` if the actor does not administer the organization
    /// - `NotFound` if the policy does not exist in this organization
    pub async fn delete(
        &self,
        actor: UserId,
        organization_id: OrganizationId,
        policy_id: PolicyId,
    ) -> Result<Policy, PolicyError> {
        self.require_admin(actor, organization_id).await?;
        let policy = self.load(organization_id, policy_id).await?;
        self.store.delete_policy(policy_id).await?;
        Ok(policy)
    }

    /// Resolves the policy that governs `user_id` in a category.
    ///
    /// # Errors
    ///
    /// Returns `NotMember` if the actor is not a member.
    pub async fn resolve(
        &self,
        actor: UserId,
        organization_id: OrganizationId,
        category_id: CategoryId,
        user_id: UserId,
    ) -> Result<Option<Policy>, PolicyError> {
        self.require_member(actor, organization_id).await?;
        Ok(PolicyResolver::resolve(&self.store, organization_id, category_id, user_id).await?)
    }

    async fn load(
        &self,
        organization_id: OrganizationId,
        policy_id: PolicyId,
    ) -> Result<Policy, PolicyError> {
        self.store
            .find_policy_by_id(policy_id)
            .await?
            .filter(|p| p.organization_id == organization_id)
            .ok_or(PolicyError::NotFound(policy_id))
    }

    async fn require_member(
        &self,
        actor: UserId,
        organization_id: OrganizationId,
    ) -> Result<(), PolicyError> {
        if self.store.is_member(actor, organization_id).await? {
            Ok(())
        } else {
            Err(PolicyError::NotMember)
        }
    }

    async fn require_admin(
        &self,
        actor: UserId,
        organization_id: OrganizationId,
    ) -> Result<(), PolicyError> {
        if self.store.is_admin(actor, organization_id).await? {
            Ok(())
        } else {
            Err(PolicyError::NotAdmin)
        }
    }

    async fn require_category(
        &self,
        category_id: CategoryId,
        organization_id: OrganizationId,
    ) -> Result<(), PolicyError> {
        if self
            .store
            .category_belongs_to_org(category_id, organization_id)
            .await?
        {
            Ok(())
        } else {
            Err(PolicyError::CategoryNotInOrganization(category_id))
        }
    }

    fn validate_amount(amount: Decimal) -> Result<(), PolicyError> {
        if is_storable_amount(amount) {
            Ok(())
        } else {
            Err(PolicyError::InvalidAmount(amount))
        }
    }
}
