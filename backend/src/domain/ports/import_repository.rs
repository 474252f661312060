//! Port used by the CSV importer.

use async_trait::async_trait;

use crate::domain::{BottleId, DistilleryId, NewBottle, NewDistillery, Region};

use super::define_port_error;

define_port_error! {
    /// Errors raised by import repository adapters.
    pub enum ImportRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "import repository connection failed: {message}",
        /// The store did not answer in time.
        Timeout { message: String } =>
            "import repository timed out: {message}",
        /// Query or insert failed during execution.
        Query { message: String } =>
            "import repository query failed: {message}",
    }
}

/// Name and id of an existing distillery, used to join bottle rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistilleryName {
    /// Row identifier.
    pub id: DistilleryId,
    /// Exact distillery name.
    pub name: String,
}

/// Port for the writes and lookups performed by the importer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImportRepository: Send + Sync {
    /// Look a region up by exact name.
    async fn find_region_by_name(
        &self,
        name: &str,
    ) -> Result<Option<Region>, ImportRepositoryError>;

    /// Insert one distillery row.
    async fn insert_distillery(
        &self,
        distillery: &NewDistillery,
    ) -> Result<DistilleryId, ImportRepositoryError>;

    /// List the names of all existing distilleries.
    async fn distillery_names(&self) -> Result<Vec<DistilleryName>, ImportRepositoryError>;

    /// Insert one bottle row.
    async fn insert_bottle(&self, bottle: &NewBottle) -> Result<BottleId, ImportRepositoryError>;
}
