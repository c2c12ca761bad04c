//! Expense submission and review routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::error::expense_error_response;
use crate::middleware::AuthUser;
use crate::routes::{parse_amount, parse_expense_date};
use crate::AppState;
use expensa_core::expense::{Classification, Expense, Submission, SubmittedExpense};
use expensa_db::ExpenseWorkflowRepository;
use expensa_shared::types::{CategoryId, ExpenseId, OrganizationId, PolicyId, UserId};

/// Creates expense routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/organizations/{org_id}/expenses",
            get(list_my_expenses).post(submit_expense),
        )
        .route(
            "/organizations/{org_id}/expenses/pending",
            get(list_pending_expenses),
        )
        .route(
            "/organizations/{org_id}/expenses/{expense_id}/approve",
            post(approve_expense),
        )
        .route(
            "/organizations/{org_id}/expenses/{expense_id}/reject",
            post(reject_expense),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for submitting an expense.
#[derive(Debug, Deserialize)]
pub struct SubmitExpenseRequest {
    /// Expense category.
    pub category_id: Uuid,
    /// Amount as a decimal string.
    pub amount: String,
    /// Incurred date, RFC 3339 or `YYYY-MM-DD`.
    pub date: String,
    /// What the money was spent on.
    pub description: String,
}

/// Request body for rejecting an expense.
#[derive(Debug, Default, Deserialize)]
pub struct RejectExpenseRequest {
    /// Optional explanation for the submitter.
    #[serde(default)]
    pub comment: Option<String>,
}

/// Response for an expense.
#[derive(Debug, Serialize)]
pub struct ExpenseResponse {
    /// Expense ID.
    pub id: Uuid,
    /// Organization ID.
    pub organization_id: Uuid,
    /// Category ID.
    pub category_id: Uuid,
    /// Submitting member.
    pub user_id: Uuid,
    /// Amount.
    pub amount: String,
    /// Incurred date.
    pub date: String,
    /// Description.
    pub description: String,
    /// Status (`pending`, `approved`, `rejected`).
    pub status: &'static str,
    /// Reviewing admin.
    pub reviewed_by: Option<Uuid>,
    /// Review timestamp.
    pub reviewed_at: Option<String>,
    /// Rejection comment.
    pub review_comment: Option<String>,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

impl From<Expense> for ExpenseResponse {
    fn from(expense: Expense) -> Self {
        Self {
            id: expense.id.into_inner(),
            organization_id: expense.organization_id.into_inner(),
            category_id: expense.category_id.into_inner(),
            user_id: expense.user_id.into_inner(),
            amount: expense.amount.to_string(),
            date: expense.date.to_rfc3339(),
            description: expense.description,
            status: expense.status.as_str(),
            reviewed_by: expense.reviewed_by.map(UserId::into_inner),
            reviewed_at: expense.reviewed_at.map(|at| at.to_rfc3339()),
            review_comment: expense.review_comment,
            created_at: expense.created_at.to_rfc3339(),
            updated_at: expense.updated_at.to_rfc3339(),
        }
    }
}

/// How a submission's status was decided.
#[derive(Debug, Serialize)]
pub struct DecisionResponse {
    /// `no_policy`, `over_budget`, `requires_review` or `within_budget`.
    pub outcome: &'static str,
    /// Policy that governed the decision.
    pub policy_id: Option<Uuid>,
    /// Approved spend in the window before this expense.
    pub current_spent: Option<String>,
    /// Policy limit.
    pub limit: Option<String>,
}

impl DecisionResponse {
    fn new(policy_id: Option<PolicyId>, classification: &Classification) -> Self {
        let outcome = match classification {
            Classification::NoPolicy => "no_policy",
            Classification::OverBudget(_) => "over_budget",
            Classification::RequiresReview(_) => "requires_review",
            Classification::WithinBudget(_) => "within_budget",
        };
        let budget = classification.budget();
        Self {
            outcome,
            policy_id: policy_id.map(PolicyId::into_inner),
            current_spent: budget.map(|b| b.current_spent.to_string()),
            limit: budget.map(|b| b.limit.to_string()),
        }
    }
}

/// Response for a submission.
#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    /// The stored expense.
    pub expense: ExpenseResponse,
    /// Decision detail.
    pub decision: DecisionResponse,
}

impl From<SubmittedExpense> for SubmissionResponse {
    fn from(submitted: SubmittedExpense) -> Self {
        let decision = DecisionResponse::new(submitted.policy_id, &submitted.classification);
        Self {
            expense: ExpenseResponse::from(submitted.expense),
            decision,
        }
    }
}

fn expense_list(expenses: Vec<Expense>) -> Response {
    let items: Vec<ExpenseResponse> = expenses.into_iter().map(ExpenseResponse::from).collect();
    (StatusCode::OK, Json(json!({ "data": items }))).into_response()
}

fn expense_ok(expense: Expense) -> Response {
    (
        StatusCode::OK,
        Json(json!({ "data": ExpenseResponse::from(expense) })),
    )
        .into_response()
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/organizations/{org_id}/expenses` - Submit expense.
///
/// The response carries the stored status: approved, rejected as over
/// budget, or pending review.
async fn submit_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(payload): Json<SubmitExpenseRequest>,
) -> Response {
    let amount = match parse_amount("amount", &payload.amount) {
        Ok(amount) => amount,
        Err(response) => return response,
    };
    let date = match parse_expense_date(&payload.date) {
        Ok(date) => date,
        Err(response) => return response,
    };

    let submission = Submission {
        organization_id: OrganizationId::from_uuid(org_id),
        category_id: CategoryId::from_uuid(payload.category_id),
        amount,
        date,
        description: payload.description,
    };

    let repo = ExpenseWorkflowRepository::new((*state.db).clone());
    match repo.submit(auth.user_id(), submission).await {
        Ok(submitted) => (
            StatusCode::CREATED,
            Json(json!({ "data": SubmissionResponse::from(submitted) })),
        )
            .into_response(),
        Err(e) => expense_error_response(&e),
    }
}

/// GET `/organizations/{org_id}/expenses` - List the caller's expenses.
async fn list_my_expenses(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> Response {
    let repo = ExpenseWorkflowRepository::new((*state.db).clone());
    match repo
        .list_mine(auth.user_id(), OrganizationId::from_uuid(org_id))
        .await
    {
        Ok(expenses) => expense_list(expenses),
        Err(e) => expense_error_response(&e),
    }
}

/// GET `/organizations/{org_id}/expenses/pending` - List the review queue.
async fn list_pending_expenses(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> Response {
    let repo = ExpenseWorkflowRepository::new((*state.db).clone());
    match repo
        .list_pending(auth.user_id(), OrganizationId::from_uuid(org_id))
        .await
    {
        Ok(expenses) => expense_list(expenses),
        Err(e) => expense_error_response(&e),
    }
}

/// POST `/organizations/{org_id}/expenses/{expense_id}/approve` - Approve expense.
///
/// Fails with 422 when the owner's approved spend plus this amount would
/// exceed the current limit.
async fn approve_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, expense_id)): Path<(Uuid, Uuid)>,
) -> Response {
    let repo = ExpenseWorkflowRepository::new((*state.db).clone());
    match repo
        .approve(
            auth.user_id(),
            OrganizationId::from_uuid(org_id),
            ExpenseId::from_uuid(expense_id),
        )
        .await
    {
        Ok(expense) => expense_ok(expense),
        Err(e) => expense_error_response(&e),
    }
}

/// POST `/organizations/{org_id}/expenses/{expense_id}/reject` - Reject expense.
async fn reject_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, expense_id)): Path<(Uuid, Uuid)>,
    payload: Option<Json<RejectExpenseRequest>>,
) -> Response {
    let comment = payload.and_then(|Json(body)| body.comment);

    let repo = ExpenseWorkflowRepository::new((*state.db).clone());
    match repo
        .reject(
            auth.user_id(),
            OrganizationId::from_uuid(org_id),
            ExpenseId::from_uuid(expense_id),
            comment,
        )
        .await
    {
        Ok(expense) => expense_ok(expense),
        Err(e) => expense_error_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use expensa_core::budget::BudgetCheck;
    use expensa_core::expense::ExpenseStatus;
    use rust_decimal::Decimal;

    fn expense(status: ExpenseStatus) -> Expense {
        let now = Utc::now();
        Expense {
            id: ExpenseId::new(),
            organization_id: OrganizationId::new(),
            category_id: CategoryId::new(),
            user_id: UserId::new(),
            amount: Decimal::new(4250, 2),
            date: Utc.with_ymd_and_hms(2025, 3, 15, 0, 0, 0).unwrap(),
            description: "Team lunch".to_string(),
            status,
            reviewed_by: None,
            reviewed_at: None,
            review_comment: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_expense_response_shape() {
        let response = ExpenseResponse::from(expense(ExpenseStatus::Pending));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["amount"], "42.50");
        assert_eq!(value["status"], "pending");
        assert_eq!(value["date"], "2025-03-15T00:00:00+00:00");
        assert!(value["reviewed_by"].is_null());
    }

    #[test]
    fn test_submission_response_reports_decision() {
        let policy_id = PolicyId::new();
        let submitted = SubmittedExpense {
            expense: expense(ExpenseStatus::Rejected),
            policy_id: Some(policy_id),
            classification: Classification::OverBudget(BudgetCheck::new(
                Decimal::from(980),
                Decimal::from(1000),
                Decimal::new(4250, 2),
            )),
        };

        let value = serde_json::to_value(SubmissionResponse::from(submitted)).unwrap();
        assert_eq!(value["expense"]["status"], "rejected");
        assert_eq!(value["decision"]["outcome"], "over_budget");
        assert_eq!(value["decision"]["policy_id"], policy_id.to_string());
        assert_eq!(value["decision"]["current_spent"], "980");
        assert_eq!(value["decision"]["limit"], "1000");
    }

    #[test]
    fn test_no_policy_decision_has_no_budget() {
        let decision = DecisionResponse::new(None, &Classification::NoPolicy);
        assert_eq!(decision.outcome, "no_policy");
        assert!(decision.policy_id.is_none());
        assert!(decision.current_spent.is_none());
    }

    #[test]
    fn test_reject_body_comment_is_optional() {
        let body: RejectExpenseRequest = serde_json::from_str("{}").unwrap();
        assert!(body.comment.is_none());
        let body: RejectExpenseRequest =
            serde_json::from_str(r#"{"comment":"missing receipt"}"#).unwrap();
        assert_eq!(body.comment.as_deref(), Some("missing receipt"));
    }
}
