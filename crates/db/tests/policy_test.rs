//! Integration tests for policy persistence and resolution.
//!
//! Require a running Postgres; run with `cargo test -- --ignored`.

mod common;

use expensa_core::period::SpendPeriod;
use expensa_core::policy::{
    NewPolicy, PolicyChanges, PolicyError, PolicyResolver, PolicyScope, PolicyService,
};
use expensa_core::ports::{PolicyStore, StoreError};
use expensa_db::SeaOrmStore;
use rust_decimal_macros::dec;

use common::{connect, fixture, insert_policy};

#[tokio::test]
#[ignore = "requires Postgres (DATABASE_URL)"]
async fn test_org_wide_policy_unique_despite_null_user() {
    let db = connect().await;
    let fx = fixture(&db).await;

    insert_policy(&db, &fx, PolicyScope::OrganizationWide, dec!(500), false, SpendPeriod::PerExpense)
        .await;

    let err = SeaOrmStore::new(&db)
        .insert_policy(NewPolicy {
            organization_id: fx.org,
            category_id: fx.category,
            scope: PolicyScope::OrganizationWide,
            max_amount: dec!(900),
            requires_review: true,
            spend_period: SpendPeriod::Monthly,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::UniqueViolation(_)), "got {err:?}");
}

#[tokio::test]
#[ignore = "requires Postgres (DATABASE_URL)"]
async fn test_service_reports_conflict_for_duplicate_user_policy() {
    let db = connect().await;
    let fx = fixture(&db).await;
    let service = PolicyService::new(SeaOrmStore::new(&db));

    let input = NewPolicy {
        organization_id: fx.org,
        category_id: fx.category,
        scope: PolicyScope::User(fx.member),
        max_amount: dec!(500),
        requires_review: false,
        spend_period: SpendPeriod::PerExpense,
    };
    service.create(fx.admin, input.clone()).await.unwrap();

    let err = service.create(fx.admin, input).await.unwrap_err();
    assert!(matches!(err, PolicyError::Conflict));
}

#[tokio::test]
#[ignore = "requires Postgres (DATABASE_URL)"]
async fn test_resolution_prefers_user_policy() {
    let db = connect().await;
    let fx = fixture(&db).await;

    let org_wide = insert_policy(
        &db,
        &fx,
        PolicyScope::OrganizationWide,
        dec!(100),
        false,
        SpendPeriod::PerExpense,
    )
    .await;
    let specific = insert_policy(
        &db,
        &fx,
        PolicyScope::User(fx.member),
        dec!(1000),
        false,
        SpendPeriod::Monthly,
    )
    .await;

    let store = SeaOrmStore::new(&db);
    let for_member = PolicyResolver::resolve(&store, fx.org, fx.category, fx.member)
        .await
        .unwrap();
    let for_admin = PolicyResolver::resolve(&store, fx.org, fx.category, fx.admin)
        .await
        .unwrap();

    assert_eq!(for_member.map(|p| p.id), Some(specific.id));
    assert_eq!(for_admin.map(|p| p.id), Some(org_wide.id));
}

#[tokio::test]
#[ignore = "requires Postgres (DATABASE_URL)"]
async fn test_list_orders_org_wide_first_and_update_keeps_identity() {
    let db = connect().await;
    let fx = fixture(&db).await;
    let service = PolicyService::new(SeaOrmStore::new(&db));

    let specific = insert_policy(
        &db,
        &fx,
        PolicyScope::User(fx.member),
        dec!(1000),
        false,
        SpendPeriod::Monthly,
    )
    .await;
    insert_policy(&db, &fx, PolicyScope::OrganizationWide, dec!(100), false, SpendPeriod::Daily)
        .await;

    let listed = service.list(fx.member, fx.org).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].scope, PolicyScope::OrganizationWide);

    let updated = service
        .update(
            fx.admin,
            fx.org,
            specific.id,
            PolicyChanges {
                max_amount: Some(dec!(1200)),
                ..PolicyChanges::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.scope, PolicyScope::User(fx.member));
    assert_eq!(updated.max_amount, dec!(1200));
    assert_eq!(updated.spend_period, SpendPeriod::Monthly);
}
