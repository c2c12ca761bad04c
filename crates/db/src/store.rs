//! `SeaORM` implementation of the engine's store ports.
//!
//! [`SeaOrmStore`] borrows any [`ConnectionTrait`]: the pool for plain reads,
//! or a [`sea_orm::DatabaseTransaction`] so that a whole submission or review
//! runs against one snapshot. The port implementations live next to the
//! entity they query in [`crate::repositories`].

use expensa_core::ports::StoreError;
use sea_orm::{ConnectionTrait, DbErr, SqlErr};

/// Store ports over a borrowed connection or transaction.
#[derive(Debug)]
pub struct SeaOrmStore<'c, C> {
    pub(crate) db: &'c C,
}

impl<C> Clone for SeaOrmStore<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for SeaOrmStore<'_, C> {}

impl<'c, C> SeaOrmStore<'c, C>
where
    C: ConnectionTrait,
{
    /// Creates a store bound to the given connection.
    #[must_use]
    pub const fn new(db: &'c C) -> Self {
        Self { db }
    }
}

/// Maps a database error onto the engine's store error.
///
/// Unique violations stay distinguishable so callers can report conflicts.
pub(crate) fn store_error(err: DbErr) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(constraint)) => {
            StoreError::UniqueViolation(constraint)
        }
        _ => StoreError::Backend(err.to_string()),
    }
}
