//! Initial database migration.
//!
//! Creates the enums, the organization directory tables, and the policy and
//! expense tables the spending engine runs against.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: DIRECTORY TABLES
        // ============================================================
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(ORGANIZATIONS_SQL).await?;
        db.execute_unprepared(ORGANIZATION_MEMBERS_SQL).await?;
        db.execute_unprepared(EXPENSE_CATEGORIES_SQL).await?;

        // ============================================================
        // PART 3: POLICIES & EXPENSES
        // ============================================================
        db.execute_unprepared(POLICIES_SQL).await?;
        db.execute_unprepared(EXPENSES_SQL).await?;

        // ============================================================
        // PART 4: TRIGGERS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE member_role AS ENUM ('admin', 'member');

CREATE TYPE spend_period AS ENUM (
    'per_expense',
    'daily',
    'weekly',
    'monthly',
    'yearly'
);

CREATE TYPE expense_status AS ENUM ('pending', 'approved', 'rejected');
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    email VARCHAR(255) NOT NULL UNIQUE,
    full_name VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const ORGANIZATIONS_SQL: &str = r"
CREATE TABLE organizations (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const ORGANIZATION_MEMBERS_SQL: &str = r"
CREATE TABLE organization_members (
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    role member_role NOT NULL DEFAULT 'member',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (user_id, organization_id)
);

CREATE INDEX idx_org_members_org ON organization_members(organization_id);
";

const EXPENSE_CATEGORIES_SQL: &str = r"
CREATE TABLE expense_categories (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    name VARCHAR(100) NOT NULL,
    description TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_category_name UNIQUE (organization_id, name)
);
";

const POLICIES_SQL: &str = r"
CREATE TABLE policies (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    category_id UUID NOT NULL REFERENCES expense_categories(id) ON DELETE CASCADE,
    user_id UUID REFERENCES users(id) ON DELETE CASCADE,
    max_amount NUMERIC(19, 4) NOT NULL,
    requires_review BOOLEAN NOT NULL DEFAULT false,
    spend_period spend_period NOT NULL DEFAULT 'per_expense',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_policy_max_amount_positive CHECK (max_amount > 0)
);

-- One user-specific policy per (organization, category, user)
CREATE UNIQUE INDEX uq_policies_user_scope
    ON policies(organization_id, category_id, user_id)
    WHERE user_id IS NOT NULL;

-- One org-wide policy per (organization, category); NULLs never collide in a plain unique index
CREATE UNIQUE INDEX uq_policies_org_scope
    ON policies(organization_id, category_id)
    WHERE user_id IS NULL;
";

const EXPENSES_SQL: &str = r"
CREATE TABLE expenses (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    category_id UUID NOT NULL REFERENCES expense_categories(id),
    user_id UUID NOT NULL REFERENCES users(id),
    amount NUMERIC(19, 4) NOT NULL,
    date TIMESTAMPTZ NOT NULL,
    description TEXT NOT NULL,
    status expense_status NOT NULL DEFAULT 'pending',
    reviewed_by UUID REFERENCES users(id),
    reviewed_at TIMESTAMPTZ,
    review_comment TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_expense_amount_positive CHECK (amount > 0),
    CONSTRAINT chk_review_fields CHECK (
        (status = 'pending' AND reviewed_by IS NULL AND reviewed_at IS NULL)
        OR status <> 'pending'
    )
);

-- Approved-spend aggregation
CREATE INDEX idx_expenses_spend
    ON expenses(user_id, category_id, organization_id, status, date);

-- Review queue
CREATE INDEX idx_expenses_pending
    ON expenses(organization_id, created_at)
    WHERE status = 'pending';
";

const TRIGGERS_SQL: &str = r"
CREATE OR REPLACE FUNCTION set_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = now();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_users_updated_at BEFORE UPDATE ON users
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_organizations_updated_at BEFORE UPDATE ON organizations
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_expense_categories_updated_at BEFORE UPDATE ON expense_categories
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_policies_updated_at BEFORE UPDATE ON policies
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_expenses_updated_at BEFORE UPDATE ON expenses
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS expenses CASCADE;
DROP TABLE IF EXISTS policies CASCADE;
DROP TABLE IF EXISTS expense_categories CASCADE;
DROP TABLE IF EXISTS organization_members CASCADE;
DROP TABLE IF EXISTS organizations CASCADE;
DROP TABLE IF EXISTS users CASCADE;
DROP FUNCTION IF EXISTS set_updated_at() CASCADE;
DROP TYPE IF EXISTS expense_status;
DROP TYPE IF EXISTS spend_period;
DROP TYPE IF EXISTS member_role;
";
