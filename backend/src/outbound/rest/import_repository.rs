//! REST-backed `ImportRepository` implementation.

use async_trait::async_trait;
use uuid::Uuid;

use super::client::{Filter, RestClient};
use super::dto::{DistilleryNameDto, IdRowDto, RegionRowDto};
use super::error_mapping::map_rest_error;
use crate::domain::ports::{DistilleryName, ImportRepository, ImportRepositoryError};
use crate::domain::{BottleId, DistilleryId, NewBottle, NewDistillery, Region};

/// Lookups and inserts used by the CSV importer.
#[derive(Debug, Clone)]
pub struct RestImportRepository {
    client: RestClient,
}

impl RestImportRepository {
    /// Create a repository using the shared client.
    pub const fn new(client: RestClient) -> Self {
        Self { client }
    }

    async fn insert_returning_id<B>(
        &self,
        table: &str,
        row: &B,
    ) -> Result<Uuid, ImportRepositoryError>
    where
        B: serde::Serialize + Sync,
    {
        let rows: Vec<IdRowDto<Uuid>> = self
            .client
            .insert(table, row)
            .await
            .map_err(map_rest_error::<ImportRepositoryError>)?;
        rows.into_iter()
            .next()
            .map(|row| row.id)
            .ok_or_else(|| {
                ImportRepositoryError::query(format!("insert into {table} returned no row"))
            })
    }
}

#[async_trait]
impl ImportRepository for RestImportRepository {
    async fn find_region_by_name(
        &self,
        name: &str,
    ) -> Result<Option<Region>, ImportRepositoryError> {
        let rows: Vec<RegionRowDto> = self
            .client
            .select("regions", "*", &[Filter::equals("name", name)])
            .await
            .map_err(map_rest_error::<ImportRepositoryError>)?;
        Ok(rows.into_iter().next().map(RegionRowDto::into_domain))
    }

    async fn insert_distillery(
        &self,
        distillery: &NewDistillery,
    ) -> Result<DistilleryId, ImportRepositoryError> {
        self.insert_returning_id("distilleries", distillery)
            .await
            .map(DistilleryId::from_uuid)
    }

    async fn distillery_names(&self) -> Result<Vec<DistilleryName>, ImportRepositoryError> {
        let rows: Vec<DistilleryNameDto> = self
            .client
            .select("distilleries", "id,name", &[])
            .await
            .map_err(map_rest_error::<ImportRepositoryError>)?;
        Ok(rows.into_iter().map(DistilleryNameDto::into_domain).collect())
    }

    async fn insert_bottle(&self, bottle: &NewBottle) -> Result<BottleId, ImportRepositoryError> {
        self.insert_returning_id("bottles", bottle)
            .await
            .map(BottleId::from_uuid)
    }
}
