//! REST-backed `BottleRepository` implementation.

use async_trait::async_trait;
use uuid::Uuid;

use super::client::{Filter, RestClient};
use super::dto::{IdRowDto, StatusPatchDto};
use super::error_mapping::map_rest_error;
use crate::domain::BottleStatusUpdate;
use crate::domain::ports::{BottleRepository, BottleRepositoryError};

/// Writes bottle status columns to the `bottles` table.
#[derive(Debug, Clone)]
pub struct RestBottleRepository {
    client: RestClient,
}

impl RestBottleRepository {
    /// Create a repository using the shared client.
    pub const fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BottleRepository for RestBottleRepository {
    async fn update_status(
        &self,
        update: &BottleStatusUpdate,
    ) -> Result<(), BottleRepositoryError> {
        let patch = StatusPatchDto {
            status: update.status,
            tasting_date: update.tasting_date,
        };
        let rows: Vec<IdRowDto<Uuid>> = self
            .client
            .update("bottles", "id", &[Filter::equals("id", update.bottle_id)], &patch)
            .await
            .map_err(map_rest_error::<BottleRepositoryError>)?;
        if rows.is_empty() {
            return Err(BottleRepositoryError::not_found(update.bottle_id.to_string()));
        }
        Ok(())
    }
}
