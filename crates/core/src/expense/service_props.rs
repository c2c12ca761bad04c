//! Property-based tests for expense submission and review.

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::expense::error::ExpenseError;
use crate::expense::service::ExpenseService;
use crate::expense::types::{ExpenseStatus, Submission};
use crate::period::SpendPeriod;
use crate::policy::PolicyScope;
use crate::testing::MemoryStore;

/// Amounts between 0.01 and 500.00.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..=50_000).prop_map(|cents| Decimal::new(cents, 2))
}

/// Days within March 2025.
fn arb_march_day() -> impl Strategy<Value = DateTime<Utc>> {
    (1u32..=31).prop_map(|d| Utc.with_ymd_and_hms(2025, 3, d, 12, 0, 0).unwrap())
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Auto-approval never pushes the monthly approved total past the limit.
    #[test]
    fn prop_auto_approval_respects_monthly_limit(
        limit in 100i64..2_000,
        submissions in prop::collection::vec((arb_amount(), arb_march_day()), 1..20),
    ) {
        let limit = Decimal::from(limit);
        let store = MemoryStore::default();
        let fx = store.org_fixture();
        store.add_policy(&fx, PolicyScope::OrganizationWide, limit, false, SpendPeriod::Monthly);
        let service = ExpenseService::new(store.clone());

        let approved_total = block_on(async {
            let mut total = Decimal::ZERO;
            for (amount, date) in submissions {
                let result = service
                    .submit(fx.member, Submission {
                        organization_id: fx.org,
                        category_id: fx.category,
                        amount,
                        date,
                        description: "Taxi".to_string(),
                    })
                    .await
                    .unwrap();
                match result.expense.status {
                    ExpenseStatus::Approved => total += amount,
                    ExpenseStatus::Rejected => assert!(total + amount > limit),
                    ExpenseStatus::Pending => unreachable!("policy does not require review"),
                }
            }
            total
        });

        prop_assert!(approved_total <= limit);
    }

    /// Approving queued expenses one by one never overspends the weekly limit.
    #[test]
    fn prop_review_approval_respects_limit(
        limit in 100i64..1_000,
        amounts in prop::collection::vec(arb_amount(), 1..12),
    ) {
        let limit = Decimal::from(limit);
        let store = MemoryStore::default();
        let fx = store.org_fixture();
        store.add_policy(&fx, PolicyScope::OrganizationWide, limit, true, SpendPeriod::Weekly);
        let service = ExpenseService::new(store.clone());
        let day = Utc.with_ymd_and_hms(2025, 3, 12, 12, 0, 0).unwrap();

        let approved_total = block_on(async {
            let mut total = Decimal::ZERO;
            for amount in amounts {
                let pending = store.seed_expense(fx.member_key(), amount, day, ExpenseStatus::Pending);
                match service.approve(fx.admin, fx.org, pending.id).await {
                    Ok(expense) => {
                        assert_eq!(expense.status, ExpenseStatus::Approved);
                        total += amount;
                    }
                    Err(ExpenseError::BudgetExceeded { current_spent, .. }) => {
                        assert_eq!(current_spent, total);
                        assert_eq!(store.expense(pending.id).status, ExpenseStatus::Pending);
                    }
                    Err(other) => panic!("unexpected error: {other:?}"),
                }
            }
            total
        });

        prop_assert!(approved_total <= limit);
    }
}
