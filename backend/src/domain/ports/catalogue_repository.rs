//! Port for reading the distillery catalogue.

use async_trait::async_trait;

use crate::domain::{Bottle, Distillery, UserVisit};

use super::define_port_error;

define_port_error! {
    /// Errors raised by catalogue repository adapters.
    pub enum CatalogueRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "catalogue repository connection failed: {message}",
        /// The store did not answer in time.
        Timeout { message: String } =>
            "catalogue repository timed out: {message}",
        /// Query failed during execution.
        Query { message: String } =>
            "catalogue repository query failed: {message}",
    }
}

/// One distillery with its nested rows, as read from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogueEntry {
    /// The distillery row.
    pub distillery: Distillery,
    /// Its bottles.
    pub bottles: Vec<Bottle>,
    /// Visit rows visible to the caller. Row-level security normally limits
    /// these to the signed-in user.
    pub visits: Vec<UserVisit>,
}

/// Port for catalogue reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogueRepository: Send + Sync {
    /// Fetch every distillery with its bottles and visible visits.
    async fn fetch_catalogue(&self) -> Result<Vec<CatalogueEntry>, CatalogueRepositoryError>;
}
