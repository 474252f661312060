//! Catalogue read service.
//!
//! Turns the raw catalogue rows into [`DistilleryOverview`] values: bottles
//! stay in store order, the tasted counter is derived, and only the acting
//! user's visit is attached.

use std::sync::Arc;

use tracing::{debug, error};

use crate::domain::ports::{CatalogueEntry, CatalogueRepository, CatalogueRepositoryError};
use crate::domain::{DistilleryId, DistilleryOverview, Error, Session};

/// Read service backing the map and list views.
#[derive(Clone)]
pub struct CatalogueService<C> {
    repo: Arc<C>,
}

impl<C> CatalogueService<C> {
    /// Create a service over `repo`.
    pub fn new(repo: Arc<C>) -> Self {
        Self { repo }
    }
}

impl<C> CatalogueService<C>
where
    C: CatalogueRepository,
{
    fn map_repository_error(error: CatalogueRepositoryError) -> Error {
        error!(%error, "catalogue read failed");
        match error {
            CatalogueRepositoryError::Connection { message } => {
                Error::backend(format!("catalogue repository unavailable: {message}"))
            }
            CatalogueRepositoryError::Timeout { message } => {
                Error::backend(format!("catalogue repository timed out: {message}"))
            }
            CatalogueRepositoryError::Query { message } => {
                Error::backend(format!("catalogue repository error: {message}"))
            }
        }
    }

    fn into_overview(entry: CatalogueEntry, session: &Session) -> DistilleryOverview {
        let CatalogueEntry {
            distillery,
            bottles,
            visits,
        } = entry;
        let visit = session.user_id().and_then(|user_id| {
            visits
                .into_iter()
                .find(|visit| &visit.user_id == user_id)
        });
        DistilleryOverview::new(distillery, bottles, visit)
    }

    /// Every distillery with bottles, derived counter, and the session's
    /// visit. Anonymous sessions see no visits.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` when the store read fails.
    pub async fn fetch_overviews(
        &self,
        session: &Session,
    ) -> Result<Vec<DistilleryOverview>, Error> {
        let entries = self
            .repo
            .fetch_catalogue()
            .await
            .map_err(Self::map_repository_error)?;
        debug!(distilleries = entries.len(), "catalogue fetched");
        Ok(entries
            .into_iter()
            .map(|entry| Self::into_overview(entry, session))
            .collect())
    }

    /// One distillery's overview.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the distillery is absent and `BackendError`
    /// when the store read fails.
    pub async fn fetch_overview(
        &self,
        session: &Session,
        distillery_id: DistilleryId,
    ) -> Result<DistilleryOverview, Error> {
        self.fetch_overviews(session)
            .await?
            .into_iter()
            .find(|overview| overview.distillery.id == distillery_id)
            .ok_or_else(|| Error::not_found(format!("distillery {distillery_id} not found")))
    }
}
