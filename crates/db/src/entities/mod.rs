//! `SeaORM` entities.

pub mod expense_categories;
pub mod expenses;
pub mod organization_members;
pub mod organizations;
pub mod policies;
pub mod sea_orm_active_enums;
pub mod users;
