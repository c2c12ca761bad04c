//! Expense submission and review.
//!
//! # Modules
//!
//! - `types` - Expense, status, and review action types
//! - `error` - Expense operation errors
//! - `classification` - Initial status decision at submission
//! - `review` - Pending → approved/rejected transitions
//! - `service` - Orchestration over the store ports

pub mod classification;
pub mod error;
pub mod review;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use classification::{Classification, ClassificationService};
pub use error::ExpenseError;
pub use review::ReviewService;
pub use service::{ExpenseService, SubmittedExpense};
pub use types::{Expense, ExpenseStatus, NewExpense, ReviewAction, Submission};
