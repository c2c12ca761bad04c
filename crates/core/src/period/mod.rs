//! Spend-period window arithmetic.
//!
//! A spend period is the recurring accounting window over which approved
//! spend accumulates against a policy limit. Windows are derived values and
//! are never stored.

pub mod window;

#[cfg(test)]
mod window_props;

pub use window::{SpendPeriod, SpendWindow};
