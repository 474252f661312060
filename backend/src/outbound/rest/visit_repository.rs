//! REST-backed `VisitRepository` implementation.
//!
//! Every statement filters on both `user_id` and `distillery_id`, so rows of
//! other users are never touched even when row-level security is off.

use async_trait::async_trait;
use uuid::Uuid;

use super::client::{Filter, RestClient};
use super::dto::{IdRowDto, UserVisitRowDto, VisitPatchDto};
use super::error_mapping::map_rest_error;
use crate::domain::ports::{VisitRepository, VisitRepositoryError};
use crate::domain::{DistilleryId, NewVisit, UserId, UserVisit, VisitDetails};

const TABLE: &str = "user_visits";

/// Reads and writes the `user_visits` table.
#[derive(Debug, Clone)]
pub struct RestVisitRepository {
    client: RestClient,
}

impl RestVisitRepository {
    /// Create a repository using the shared client.
    pub const fn new(client: RestClient) -> Self {
        Self { client }
    }
}

fn pair_filters(user_id: &UserId, distillery_id: DistilleryId) -> [Filter; 2] {
    [
        Filter::equals("user_id", user_id),
        Filter::equals("distillery_id", distillery_id),
    ]
}

fn first_visit(rows: Vec<UserVisitRowDto>) -> Result<Option<UserVisit>, VisitRepositoryError> {
    rows.into_iter()
        .next()
        .map(UserVisitRowDto::into_domain)
        .transpose()
        .map_err(VisitRepositoryError::query)
}

#[async_trait]
impl VisitRepository for RestVisitRepository {
    async fn find(
        &self,
        user_id: &UserId,
        distillery_id: DistilleryId,
    ) -> Result<Option<UserVisit>, VisitRepositoryError> {
        let rows = self
            .client
            .select(TABLE, "*", &pair_filters(user_id, distillery_id))
            .await
            .map_err(map_rest_error::<VisitRepositoryError>)?;
        first_visit(rows)
    }

    async fn insert(&self, visit: &NewVisit) -> Result<UserVisit, VisitRepositoryError> {
        let rows = self
            .client
            .insert(TABLE, visit)
            .await
            .map_err(map_rest_error::<VisitRepositoryError>)?;
        first_visit(rows)?
            .ok_or_else(|| VisitRepositoryError::query("insert returned no visit row"))
    }

    async fn update(
        &self,
        user_id: &UserId,
        distillery_id: DistilleryId,
        details: &VisitDetails,
    ) -> Result<(), VisitRepositoryError> {
        let patch = VisitPatchDto {
            visit_date: details.visit_date,
            notes: details.notes.as_deref(),
        };
        let rows: Vec<IdRowDto<Uuid>> = self
            .client
            .update(TABLE, "id", &pair_filters(user_id, distillery_id), &patch)
            .await
            .map_err(map_rest_error::<VisitRepositoryError>)?;
        if rows.is_empty() {
            return Err(VisitRepositoryError::not_found(format!(
                "user {user_id} at distillery {distillery_id}"
            )));
        }
        Ok(())
    }

    async fn delete(
        &self,
        user_id: &UserId,
        distillery_id: DistilleryId,
    ) -> Result<(), VisitRepositoryError> {
        self.client
            .delete(TABLE, &pair_filters(user_id, distillery_id))
            .await
            .map_err(map_rest_error)
    }
}
