//! Spending policy routes.
//!
//! Policies cap what a member may spend in a category per period. Admins
//! manage them; any member may list them or ask which one applies.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::error::policy_error_response;
use crate::middleware::AuthUser;
use crate::routes::{parse_amount, parse_spend_period};
use crate::AppState;
use expensa_core::period::SpendPeriod;
use expensa_core::policy::{NewPolicy, Policy, PolicyChanges, PolicyScope, PolicyService};
use expensa_db::SeaOrmStore;
use expensa_shared::types::{CategoryId, OrganizationId, PolicyId, UserId};

/// Creates policy routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/organizations/{org_id}/policies",
            get(list_policies).post(create_policy),
        )
        .route(
            "/organizations/{org_id}/policies/resolve",
            get(resolve_policy),
        )
        .route(
            "/organizations/{org_id}/policies/{policy_id}",
            patch(update_policy).delete(delete_policy),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a policy.
#[derive(Debug, Deserialize)]
pub struct CreatePolicyRequest {
    /// Category the policy governs.
    pub category_id: Uuid,
    /// Member the policy is scoped to; absent for an organization-wide policy.
    pub user_id: Option<Uuid>,
    /// Limit as a decimal string.
    pub max_amount: String,
    /// Whether in-budget expenses still need an admin.
    #[serde(default)]
    pub requires_review: bool,
    /// Accumulation window (`per_expense`, `daily`, `weekly`, `monthly`, `yearly`).
    pub spend_period: Option<String>,
}

/// Request body for updating a policy.
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePolicyRequest {
    /// New limit.
    pub max_amount: Option<String>,
    /// New review flag.
    pub requires_review: Option<bool>,
    /// New accumulation window.
    pub spend_period: Option<String>,
}

/// Query for resolving the applicable policy.
#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    /// Category to resolve for.
    pub category_id: Uuid,
    /// Member to resolve for; defaults to the caller.
    pub user_id: Option<Uuid>,
}

/// Response for a policy.
#[derive(Debug, Serialize)]
pub struct PolicyResponse {
    /// Policy ID.
    pub id: Uuid,
    /// Organization ID.
    pub organization_id: Uuid,
    /// Category ID.
    pub category_id: Uuid,
    /// Scoped member, or null for organization-wide.
    pub user_id: Option<Uuid>,
    /// Limit.
    pub max_amount: String,
    /// Review flag.
    pub requires_review: bool,
    /// Accumulation window.
    pub spend_period: &'static str,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

impl From<Policy> for PolicyResponse {
    fn from(policy: Policy) -> Self {
        Self {
            id: policy.id.into_inner(),
            organization_id: policy.organization_id.into_inner(),
            category_id: policy.category_id.into_inner(),
            user_id: policy.scope.user_id().map(UserId::into_inner),
            max_amount: policy.max_amount.to_string(),
            requires_review: policy.requires_review,
            spend_period: policy.spend_period.as_str(),
            created_at: policy.created_at.to_rfc3339(),
            updated_at: policy.updated_at.to_rfc3339(),
        }
    }
}

impl UpdatePolicyRequest {
    fn into_changes(self) -> Result<PolicyChanges, Response> {
        Ok(PolicyChanges {
            max_amount: self
                .max_amount
                .as_deref()
                .map(|raw| parse_amount("max_amount", raw))
                .transpose()?,
            requires_review: self.requires_review,
            spend_period: self
                .spend_period
                .as_deref()
                .map(parse_spend_period)
                .transpose()?,
        })
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/organizations/{org_id}/policies` - List policies.
async fn list_policies(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> Response {
    let service = PolicyService::new(SeaOrmStore::new(state.db.as_ref()));

    match service
        .list(auth.user_id(), OrganizationId::from_uuid(org_id))
        .await
    {
        Ok(policies) => {
            let items: Vec<PolicyResponse> =
                policies.into_iter().map(PolicyResponse::from).collect();
            (StatusCode::OK, Json(json!({ "data": items }))).into_response()
        }
        Err(e) => policy_error_response(&e),
    }
}

/// POST `/organizations/{org_id}/policies` - Create policy.
async fn create_policy(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(payload): Json<CreatePolicyRequest>,
) -> Response {
    let max_amount = match parse_amount("max_amount", &payload.max_amount) {
        Ok(amount) => amount,
        Err(response) => return response,
    };
    let spend_period = match payload.spend_period.as_deref() {
        Some(raw) => match parse_spend_period(raw) {
            Ok(period) => period,
            Err(response) => return response,
        },
        None => SpendPeriod::PerExpense,
    };

    let input = NewPolicy {
        organization_id: OrganizationId::from_uuid(org_id),
        category_id: CategoryId::from_uuid(payload.category_id),
        scope: PolicyScope::from_user(payload.user_id.map(UserId::from_uuid)),
        max_amount,
        requires_review: payload.requires_review,
        spend_period,
    };

    let service = PolicyService::new(SeaOrmStore::new(state.db.as_ref()));
    match service.create(auth.user_id(), input).await {
        Ok(policy) => {
            info!(policy_id = %policy.id, org_id = %org_id, "Policy created via API");
            (
                StatusCode::CREATED,
                Json(json!({ "data": PolicyResponse::from(policy) })),
            )
                .into_response()
        }
        Err(e) => policy_error_response(&e),
    }
}

/// GET `/organizations/{org_id}/policies/resolve` - Resolve the applicable policy.
///
/// Returns `{"data": null}` when no policy governs the category.
async fn resolve_policy(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Query(query): Query<ResolveQuery>,
) -> Response {
    let actor = auth.user_id();
    let user_id = query.user_id.map_or(actor, UserId::from_uuid);
    let service = PolicyService::new(SeaOrmStore::new(state.db.as_ref()));

    match service
        .resolve(
            actor,
            OrganizationId::from_uuid(org_id),
            CategoryId::from_uuid(query.category_id),
            user_id,
        )
        .await
    {
        Ok(policy) => (
            StatusCode::OK,
            Json(json!({ "data": policy.map(PolicyResponse::from) })),
        )
            .into_response(),
        Err(e) => policy_error_response(&e),
    }
}

/// PATCH `/organizations/{org_id}/policies/{policy_id}` - Update policy.
async fn update_policy(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, policy_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdatePolicyRequest>,
) -> Response {
    let changes = match payload.into_changes() {
        Ok(changes) => changes,
        Err(response) => return response,
    };

    let service = PolicyService::new(SeaOrmStore::new(state.db.as_ref()));
    match service
        .update(
            auth.user_id(),
            OrganizationId::from_uuid(org_id),
            PolicyId::from_uuid(policy_id),
            changes,
        )
        .await
    {
        Ok(policy) => (
            StatusCode::OK,
            Json(json!({ "data": PolicyResponse::from(policy) })),
        )
            .into_response(),
        Err(e) => policy_error_response(&e),
    }
}

/// DELETE `/organizations/{org_id}/policies/{policy_id}` - Delete policy.
async fn delete_policy(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, policy_id)): Path<(Uuid, Uuid)>,
) -> Response {
    let service = PolicyService::new(SeaOrmStore::new(state.db.as_ref()));

    match service
        .delete(
            auth.user_id(),
            OrganizationId::from_uuid(org_id),
            PolicyId::from_uuid(policy_id),
        )
        .await
    {
        Ok(policy) => {
            info!(policy_id = %policy.id, org_id = %org_id, "Policy deleted via API");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => policy_error_response(&e),
    }
}
