//! Policy administration errors.

use expensa_shared::types::{CategoryId, PolicyId, UserId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::ports::StoreError;

/// Errors that can occur while managing or resolving policies.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// A policy already exists at this specificity level.
    #[error("A policy already exists for this category and user combination")]
    Conflict,

    /// The category does not belong to the organization.
    #[error("Category {0} not found in this organization")]
    CategoryNotInOrganization(CategoryId),

    /// The scoped user is not a member of the organization.
    #[error("User {0} is not a member of this organization")]
    MemberNotInOrganization(UserId),

    /// Policy not found.
    #[error("Policy {0} not found")]
    NotFound(PolicyId),

    /// The actor is not a member of the organization.
    #[error("Not a member of this organization")]
    NotMember,

    /// The actor is not an administrator of the organization.
    #[error("Only admins can manage policies")]
    NotAdmin,

    /// Limit must be positive.
    #[error("Max amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    /// Storage failure.
    #[error("Database error: {0}")]
    Store(String),
}

impl PolicyError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidAmount(_) => 400,
            Self::NotMember | Self::NotAdmin => 403,
            Self::CategoryNotInOrganization(_)
            | Self::MemberNotInOrganization(_)
            | Self::NotFound(_) => 404,
            Self::Conflict => 409,
            Self::Store(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Conflict => "POLICY_CONFLICT",
            Self::CategoryNotInOrganization(_) => "CATEGORY_NOT_IN_ORGANIZATION",
            Self::MemberNotInOrganization(_) => "MEMBER_NOT_IN_ORGANIZATION",
            Self::NotFound(_) => "POLICY_NOT_FOUND",
            Self::NotMember => "NOT_A_MEMBER",
            Self::NotAdmin => "ADMIN_REQUIRED",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::Store(_) => "DATABASE_ERROR",
        }
    }
}

impl From<StoreError> for PolicyError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(_) => Self::Conflict,
            StoreError::Backend(msg) => Self::Store(msg),
        }
    }
}
