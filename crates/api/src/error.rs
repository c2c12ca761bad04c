//! JSON error responses.
//!
//! Every failure leaves the API as `{"error": CODE, "message": text}` with the
//! status code the domain error declares. Store failures are logged here and
//! reported without their internals.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use expensa_core::expense::ExpenseError;
use expensa_core::policy::PolicyError;
use expensa_shared::AppError;

fn status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn error_body(status_code: StatusCode, code: &str, message: String) -> Response {
    (
        status_code,
        Json(json!({ "error": code, "message": message })),
    )
        .into_response()
}

/// Converts a policy error into an HTTP response.
pub fn policy_error_response(err: &PolicyError) -> Response {
    let message = match err {
        PolicyError::Store(detail) => {
            tracing::error!(error = %detail, "Policy store failure");
            "An internal error occurred".to_string()
        }
        other => other.to_string(),
    };
    error_body(status(err.status_code()), err.error_code(), message)
}

/// Converts an expense error into an HTTP response.
///
/// A budget denial also reports the spend figures it was decided on.
pub fn expense_error_response(err: &ExpenseError) -> Response {
    match err {
        ExpenseError::BudgetExceeded {
            current_spent,
            limit,
            amount,
        } => (
            status(err.status_code()),
            Json(json!({
                "error": err.error_code(),
                "message": err.to_string(),
                "current_spent": current_spent.to_string(),
                "limit": limit.to_string(),
                "amount": amount.to_string(),
            })),
        )
            .into_response(),
        ExpenseError::Store(detail) => {
            tracing::error!(error = %detail, "Expense store failure");
            error_body(
                status(err.status_code()),
                err.error_code(),
                "An internal error occurred".to_string(),
            )
        }
        other => error_body(status(other.status_code()), other.error_code(), other.to_string()),
    }
}

/// Converts a request-level error into an HTTP response.
pub fn app_error_response(err: &AppError) -> Response {
    error_body(status(err.status_code()), err.error_code(), err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use expensa_core::expense::ExpenseStatus;
    use expensa_shared::types::PolicyId;
    use http_body_util::BodyExt;
    use rust_decimal::Decimal;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_budget_exceeded_reports_spend() {
        let err = ExpenseError::BudgetExceeded {
            current_spent: Decimal::new(75000, 2),
            limit: Decimal::from(1000),
            amount: Decimal::from(300),
        };
        let response = expense_error_response(&err);
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["error"], "BUDGET_EXCEEDED");
        assert_eq!(body["current_spent"], "750.00");
        assert_eq!(body["limit"], "1000");
        assert_eq!(body["amount"], "300");
    }

    #[tokio::test]
    async fn test_invalid_transition_is_bad_request() {
        let err = ExpenseError::InvalidStateTransition {
            from: ExpenseStatus::Approved,
            to: ExpenseStatus::Rejected,
        };
        let response = expense_error_response(&err);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "INVALID_STATE_TRANSITION");
    }

    #[tokio::test]
    async fn test_store_detail_is_hidden() {
        let err = PolicyError::Store("password authentication failed".into());
        let response = policy_error_response(&err);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "DATABASE_ERROR");
        assert_eq!(body["message"], "An internal error occurred");
    }

    #[tokio::test]
    async fn test_policy_not_found() {
        let response = policy_error_response(&PolicyError::NotFound(PolicyId::new()));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "POLICY_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_validation_error() {
        let response = app_error_response(&AppError::Validation("bad amount".into()));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "VALIDATION_ERROR");
    }
}
