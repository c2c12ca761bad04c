//! Integration tests for the transactional expense workflow.
//!
//! Require a running Postgres; run with `cargo test -- --ignored`.

mod common;

use chrono::{TimeZone, Utc};
use expensa_core::expense::{ExpenseError, ExpenseStatus, Submission};
use expensa_core::period::SpendPeriod;
use expensa_core::policy::PolicyScope;
use expensa_db::ExpenseWorkflowRepository;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use common::{Fixture, connect, fixture, insert_policy};

fn submission(fx: &Fixture, amount: Decimal, day: u32) -> Submission {
    Submission {
        organization_id: fx.org,
        category_id: fx.category,
        amount,
        date: Utc.with_ymd_and_hms(2025, 3, day, 10, 0, 0).unwrap(),
        description: "Client visit".to_string(),
    }
}

#[tokio::test]
#[ignore = "requires Postgres (DATABASE_URL)"]
async fn test_cumulative_monthly_budget() {
    let db = connect().await;
    let fx = fixture(&db).await;
    insert_policy(&db, &fx, PolicyScope::OrganizationWide, dec!(1000), false, SpendPeriod::Monthly)
        .await;
    let workflow = ExpenseWorkflowRepository::new(db);

    let first = workflow.submit(fx.member, submission(&fx, dec!(700), 3)).await.unwrap();
    assert_eq!(first.expense.status, ExpenseStatus::Approved);

    let over = workflow.submit(fx.member, submission(&fx, dec!(400), 20)).await.unwrap();
    assert_eq!(over.expense.status, ExpenseStatus::Rejected);

    let fits = workflow.submit(fx.member, submission(&fx, dec!(250), 20)).await.unwrap();
    assert_eq!(fits.expense.status, ExpenseStatus::Approved);
}

#[tokio::test]
#[ignore = "requires Postgres (DATABASE_URL)"]
async fn test_approval_revalidates_budget() {
    let db = connect().await;
    let fx = fixture(&db).await;
    insert_policy(&db, &fx, PolicyScope::OrganizationWide, dec!(500), true, SpendPeriod::Weekly)
        .await;
    let workflow = ExpenseWorkflowRepository::new(db);

    let first = workflow.submit(fx.member, submission(&fx, dec!(300), 10)).await.unwrap();
    assert_eq!(first.expense.status, ExpenseStatus::Pending);
    workflow.approve(fx.admin, fx.org, first.expense.id).await.unwrap();

    let too_big = workflow.submit(fx.member, submission(&fx, dec!(250), 12)).await.unwrap();
    let fits = workflow.submit(fx.member, submission(&fx, dec!(150), 13)).await.unwrap();

    let err = workflow
        .approve(fx.admin, fx.org, too_big.expense.id)
        .await
        .unwrap_err();
    match err {
        ExpenseError::BudgetExceeded { current_spent, limit, .. } => {
            assert_eq!(current_spent, dec!(300));
            assert_eq!(limit, dec!(500));
        }
        other => panic!("expected BudgetExceeded, got {other:?}"),
    }

    let approved = workflow.approve(fx.admin, fx.org, fits.expense.id).await.unwrap();
    assert_eq!(approved.status, ExpenseStatus::Approved);
    assert_eq!(approved.reviewed_by, Some(fx.admin));

    let pending = workflow.list_pending(fx.admin, fx.org).await.unwrap();
    assert_eq!(pending.iter().map(|e| e.id).collect::<Vec<_>>(), vec![too_big.expense.id]);
}

#[tokio::test]
#[ignore = "requires Postgres (DATABASE_URL)"]
async fn test_terminal_states_are_final() {
    let db = connect().await;
    let fx = fixture(&db).await;
    let workflow = ExpenseWorkflowRepository::new(db);

    let submitted = workflow.submit(fx.member, submission(&fx, dec!(80), 5)).await.unwrap();
    assert_eq!(submitted.expense.status, ExpenseStatus::Pending);

    let rejected = workflow
        .reject(fx.admin, fx.org, submitted.expense.id, Some("No receipt".into()))
        .await
        .unwrap();
    assert_eq!(rejected.status, ExpenseStatus::Rejected);
    assert_eq!(rejected.review_comment.as_deref(), Some("No receipt"));

    let err = workflow
        .approve(fx.admin, fx.org, submitted.expense.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ExpenseError::InvalidStateTransition { .. }));

    let mine = workflow.list_mine(fx.member, fx.org).await.unwrap();
    assert_eq!(mine[0], rejected);
}
