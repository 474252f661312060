//! Port for bottle status persistence.

use async_trait::async_trait;

use crate::domain::BottleStatusUpdate;

use super::define_port_error;

define_port_error! {
    /// Errors raised by bottle repository adapters.
    pub enum BottleRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "bottle repository connection failed: {message}",
        /// The store did not answer in time.
        Timeout { message: String } =>
            "bottle repository timed out: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "bottle repository query failed: {message}",
        /// No bottle row matched the update.
        NotFound { message: String } =>
            "bottle not found: {message}",
    }
}

/// Port for writing bottle status columns.
///
/// Each call writes exactly one bottle. Bottles are never grouped into a
/// transaction; concurrent writers to the same row resolve as last writer
/// wins in the store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BottleRepository: Send + Sync {
    /// Persist `status` and `tasting_date` for the bottle keyed by
    /// `update.bottle_id`.
    ///
    /// Fails with [`BottleRepositoryError::NotFound`] when no row has that id.
    async fn update_status(
        &self,
        update: &BottleStatusUpdate,
    ) -> Result<(), BottleRepositoryError>;
}
