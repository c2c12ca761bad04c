//! Approved-spend aggregation and limit checks.

pub mod aggregator;
pub mod check;

pub use aggregator::{BudgetAggregator, SpendFilter, SpendKey};
pub use check::{AMOUNT_SCALE, BudgetCheck, is_storable_amount, max_amount};
