//! Spending policy engine for Expensa.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Persistence is reached only through the async traits in [`ports`].
//!
//! # Modules
//!
//! - `period` - Spend-period window arithmetic
//! - `budget` - Approved-spend aggregation and limit checks
//! - `policy` - Policy types, precedence resolution, and administration
//! - `expense` - Submission classification and the review state machine
//! - `ports` - Store interfaces implemented by the database layer

pub mod budget;
pub mod expense;
pub mod period;
pub mod policy;
pub mod ports;

#[cfg(test)]
mod testing;
