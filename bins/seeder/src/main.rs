//! Database seeder for Expensa development and testing.
//!
//! Seeds a demo organization with an admin, a member, three categories, a
//! mix of organization-wide and member-specific policies, and a few
//! submitted expenses. Prints bearer tokens for both users.
//!
//! Usage: cargo run --bin seeder

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use expensa_core::expense::Submission;
use expensa_core::period::SpendPeriod;
use expensa_core::policy::{NewPolicy, PolicyScope, PolicyService};
use expensa_db::entities::sea_orm_active_enums::MemberRole;
use expensa_db::{ExpenseWorkflowRepository, OrganizationRepository, SeaOrmStore};
use expensa_shared::types::{CategoryId, OrganizationId, UserId};
use expensa_shared::{AppConfig, JwtConfig, JwtService};

const ADMIN_EMAIL: &str = "admin@expensa.dev";
const MEMBER_EMAIL: &str = "member@expensa.dev";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    println!("Connecting to database...");
    let db = expensa_db::connect(&config.database.url).await?;
    let orgs = OrganizationRepository::new(db.clone());

    if let Some(admin) = orgs.find_user_by_email(ADMIN_EMAIL).await? {
        println!("Demo data already present, skipping...");
        let member = orgs.find_user_by_email(MEMBER_EMAIL).await?;
        print_tokens(&config, admin.id, member.map(|m| m.id))?;
        return Ok(());
    }

    println!("Seeding users...");
    let admin = orgs.create_user(ADMIN_EMAIL, "Avery Admin").await?;
    let member = orgs.create_user(MEMBER_EMAIL, "Morgan Member").await?;

    println!("Seeding organization...");
    let org = orgs.create_with_admin("Expensa Demo", admin.id).await?;
    orgs.add_member(org.id, member.id, MemberRole::Member).await?;

    println!("Seeding categories...");
    let travel = orgs
        .create_category(org.id, "Travel", Some("Flights, trains, hotels"))
        .await?;
    let meals = orgs
        .create_category(org.id, "Meals", Some("Client and team meals"))
        .await?;
    let software = orgs
        .create_category(org.id, "Software", Some("Licenses and subscriptions"))
        .await?;

    let org_id = OrganizationId::from_uuid(org.id);
    let admin_id = UserId::from_uuid(admin.id);
    let member_id = UserId::from_uuid(member.id);

    println!("Seeding policies...");
    let policies = PolicyService::new(SeaOrmStore::new(&db));
    let seeds = [
        (travel.id, PolicyScope::OrganizationWide, 2000, false, SpendPeriod::Monthly),
        (travel.id, PolicyScope::User(member_id), 3500, false, SpendPeriod::Monthly),
        (meals.id, PolicyScope::OrganizationWide, 75, false, SpendPeriod::PerExpense),
        (software.id, PolicyScope::OrganizationWide, 1200, true, SpendPeriod::Yearly),
    ];
    for (category_id, scope, max_amount, requires_review, spend_period) in seeds {
        policies
            .create(
                admin_id,
                NewPolicy {
                    organization_id: org_id,
                    category_id: CategoryId::from_uuid(category_id),
                    scope,
                    max_amount: Decimal::from(max_amount),
                    requires_review,
                    spend_period,
                },
            )
            .await?;
    }

    println!("Seeding expenses...");
    let workflow = ExpenseWorkflowRepository::new(db.clone());
    let today = Utc::now();
    let samples = [
        (travel.id, Decimal::new(42_000, 2), 3, "Train to client site"),
        (meals.id, Decimal::new(6_450, 2), 1, "Team lunch"),
        (meals.id, Decimal::new(18_900, 2), 1, "Offsite dinner"),
        (software.id, Decimal::from(299), 0, "IDE license"),
    ];
    for (category_id, amount, days_ago, description) in samples {
        let submitted = workflow
            .submit(
                member_id,
                Submission {
                    organization_id: org_id,
                    category_id: CategoryId::from_uuid(category_id),
                    amount,
                    date: today - Duration::days(days_ago),
                    description: description.to_string(),
                },
            )
            .await?;
        println!(
            "  {description}: {} ({})",
            submitted.expense.amount, submitted.expense.status
        );
    }

    print_tokens(&config, admin.id, Some(member.id))?;
    println!("Seeding complete!");
    Ok(())
}

/// Prints bearer tokens for the demo users.
fn print_tokens(
    config: &AppConfig,
    admin_id: Uuid,
    member_id: Option<Uuid>,
) -> anyhow::Result<()> {
    let jwt = JwtService::new(JwtConfig::from(&config.jwt));
    println!("Admin token:  {}", jwt.generate_access_token(admin_id)?);
    if let Some(member_id) = member_id {
        println!("Member token: {}", jwt.generate_access_token(member_id)?);
    }
    Ok(())
}
