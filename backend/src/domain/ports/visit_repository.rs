//! Port for visit record persistence.
//!
//! Rows are addressed by their (user, distillery) pair rather than by row id,
//! which is what keeps the one-visit-per-pair invariant enforceable from the
//! client side.

use async_trait::async_trait;

use crate::domain::{DistilleryId, NewVisit, UserId, UserVisit, VisitDetails};

use super::define_port_error;

define_port_error! {
    /// Errors raised by visit repository adapters.
    pub enum VisitRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "visit repository connection failed: {message}",
        /// The store did not answer in time.
        Timeout { message: String } =>
            "visit repository timed out: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "visit repository query failed: {message}",
        /// An insert collided with an existing (user, distillery) record.
        Conflict { message: String } =>
            "visit already recorded: {message}",
        /// An update found no record for the (user, distillery) pair.
        NotFound { message: String } =>
            "visit not found: {message}",
    }
}

/// Port for the `user_visits` table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VisitRepository: Send + Sync {
    /// Fetch the visit for this (user, distillery) pair.
    async fn find(
        &self,
        user_id: &UserId,
        distillery_id: DistilleryId,
    ) -> Result<Option<UserVisit>, VisitRepositoryError>;

    /// Insert a fresh record and return it as stored.
    ///
    /// Fails with [`VisitRepositoryError::Conflict`] when the pair already
    /// has a record.
    async fn insert(&self, visit: &NewVisit) -> Result<UserVisit, VisitRepositoryError>;

    /// Overwrite the date and notes of the pair's record in place.
    ///
    /// Fails with [`VisitRepositoryError::NotFound`] when the pair has no
    /// record.
    async fn update(
        &self,
        user_id: &UserId,
        distillery_id: DistilleryId,
        details: &VisitDetails,
    ) -> Result<(), VisitRepositoryError>;

    /// Delete the pair's record. Deleting nothing is not an error.
    async fn delete(
        &self,
        user_id: &UserId,
        distillery_id: DistilleryId,
    ) -> Result<(), VisitRepositoryError>;
}
