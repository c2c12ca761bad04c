//! API route definitions.

use std::str::FromStr;

use axum::{Router, middleware, response::Response};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;

use crate::{AppState, error::app_error_response, middleware::auth_middleware};
use expensa_core::period::SpendPeriod;
use expensa_shared::AppError;

pub mod expenses;
pub mod health;
pub mod policies;

/// Creates the API router; everything except health checks requires a bearer token.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(policies::routes())
        .merge(expenses::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(protected_routes)
}

/// Parses a decimal amount sent as a string.
///
/// Positivity is enforced by the domain services; this only rejects text
/// that is not a number.
pub(crate) fn parse_amount(field: &str, raw: &str) -> Result<Decimal, Response> {
    Decimal::from_str(raw.trim()).map_err(|_| {
        app_error_response(&AppError::Validation(format!(
            "{field} must be a decimal string, got {raw:?}"
        )))
    })
}

/// Parses a spend period name.
pub(crate) fn parse_spend_period(raw: &str) -> Result<SpendPeriod, Response> {
    SpendPeriod::parse(raw).ok_or_else(|| {
        app_error_response(&AppError::Validation(format!(
            "Unknown spend_period {raw:?}; expected per_expense, daily, weekly, monthly or yearly"
        )))
    })
}

/// Parses an expense date: RFC 3339, or a bare `YYYY-MM-DD` taken as midnight UTC.
pub(crate) fn parse_expense_date(raw: &str) -> Result<DateTime<Utc>, Response> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        .map_err(|_| {
            app_error_response(&AppError::Validation(format!(
                "date must be RFC 3339 or YYYY-MM-DD, got {raw:?}"
            )))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case("100", Decimal::from(100))]
    #[case(" 12.50 ", Decimal::new(1250, 2))]
    #[case("-3", Decimal::from(-3))]
    fn test_parse_amount(#[case] raw: &str, #[case] expected: Decimal) {
        assert_eq!(parse_amount("amount", raw).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("ten")]
    #[case("1,000")]
    fn test_parse_amount_rejects_garbage(#[case] raw: &str) {
        let response = parse_amount("amount", raw).unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_parse_spend_period() {
        assert_eq!(parse_spend_period("monthly").unwrap(), SpendPeriod::Monthly);
        assert_eq!(
            parse_spend_period("per_expense").unwrap(),
            SpendPeriod::PerExpense
        );
        assert!(parse_spend_period("biweekly").is_err());
    }

    #[test]
    fn test_parse_expense_date_bare_date_is_midnight_utc() {
        assert_eq!(
            parse_expense_date("2025-03-15").unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 15, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_expense_date_normalizes_offset() {
        assert_eq!(
            parse_expense_date("2025-03-15T01:30:00+02:00").unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 14, 23, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_expense_date_rejects_garbage() {
        assert!(parse_expense_date("15/03/2025").is_err());
    }
}
