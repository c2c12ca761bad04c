//! Spending policies.
//!
//! # Modules
//!
//! - `types` - Policy, scope, and change types
//! - `error` - Policy administration errors
//! - `resolver` - Specificity precedence (user-specific over org-wide)
//! - `service` - Admin-only policy management

pub mod error;
pub mod resolver;
pub mod service;
pub mod types;

pub use error::PolicyError;
pub use resolver::PolicyResolver;
pub use service::PolicyService;
pub use types::{NewPolicy, Policy, PolicyChanges, PolicyScope};
