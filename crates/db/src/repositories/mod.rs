//! Repository abstractions for data access.
//!
//! `policy`, `expense`, and `organization` implement the engine's store
//! ports for [`crate::SeaOrmStore`]; `workflow` wraps the expense engine in
//! database transactions.

pub mod expense;
pub mod organization;
pub mod policy;
pub mod workflow;

pub use organization::OrganizationRepository;
pub use workflow::ExpenseWorkflowRepository;
