//! Policy resolution by specificity.

use expensa_shared::types::{CategoryId, OrganizationId, UserId};

use crate::policy::types::{Policy, PolicyScope};
use crate::ports::{PolicyStore, StoreError};

/// Selects the single policy governing a member's spend in a category.
pub struct PolicyResolver;

impl PolicyResolver {
    /// Resolves the applicable policy.
    ///
    /// A policy scoped to `user_id` wins over the organization-wide policy;
    /// the org-wide lookup only happens when no user-specific policy exists.
    /// Returns `None` when neither exists.
    pub async fn resolve<S>(
        store: &S,
        organization_id: OrganizationId,
        category_id: CategoryId,
        user_id: UserId,
    ) -> Result<Option<Policy>, StoreError>
    where
        S: PolicyStore + ?Sized,
    {
        if let Some(policy) = store
            .find_policy(organization_id, category_id, PolicyScope::User(user_id))
            .await?
        {
            return Ok(Some(policy));
        }

        store
            .find_policy(organization_id, category_id, PolicyScope::OrganizationWide)
            .await
    }
}
