//! REST-backed `CatalogueRepository` implementation.

use async_trait::async_trait;
use tracing::debug;

use super::client::RestClient;
use super::dto::CatalogueRowDto;
use super::error_mapping::map_rest_error;
use crate::domain::ports::{CatalogueEntry, CatalogueRepository, CatalogueRepositoryError};

const CATALOGUE_SELECT: &str = "*,bottles(*),user_visits(*)";

/// Reads distilleries with nested bottles and visits in one request.
#[derive(Debug, Clone)]
pub struct RestCatalogueRepository {
    client: RestClient,
}

impl RestCatalogueRepository {
    /// Create a repository using the shared client.
    pub const fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CatalogueRepository for RestCatalogueRepository {
    async fn fetch_catalogue(&self) -> Result<Vec<CatalogueEntry>, CatalogueRepositoryError> {
        let rows: Vec<CatalogueRowDto> = self
            .client
            .select("distilleries", CATALOGUE_SELECT, &[])
            .await
            .map_err(map_rest_error::<CatalogueRepositoryError>)?;
        debug!(rows = rows.len(), "catalogue rows decoded");
        rows.into_iter()
            .map(CatalogueRowDto::into_domain)
            .collect::<Result<Vec<_>, _>>()
            .map_err(CatalogueRepositoryError::query)
    }
}
