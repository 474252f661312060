//! Visit record manager.
//!
//! Owns the local [`VisitSlot`] for one (user, distillery) pair and drives
//! the remote `user_visits` row through the [`VisitRepository`] port. The
//! slot only changes after the remote write succeeded; a failed write leaves
//! it exactly as it was.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, info};

use crate::domain::ports::{VisitRepository, VisitRepositoryError};
use crate::domain::{DistilleryId, Error, NewVisit, Session, UserId, VisitDetails, VisitSlot};

/// Manages the visit slot of one distillery for the acting user.
///
/// # Examples
///
/// ```rust,ignore
/// let manager = VisitRecordManager::new(repo, distillery_id, VisitSlot::Absent);
/// let details = VisitDetails::new(date, "Great tour");
/// let slot = manager.mark_visited(&session, details).await?;
/// assert!(slot.is_present());
/// ```
pub struct VisitRecordManager<V> {
    repo: Arc<V>,
    distillery_id: DistilleryId,
    slot: Mutex<VisitSlot>,
}

impl<V> VisitRecordManager<V> {
    /// Create a manager whose slot starts in `initial`.
    pub fn new(repo: Arc<V>, distillery_id: DistilleryId, initial: VisitSlot) -> Self {
        Self {
            repo,
            distillery_id,
            slot: Mutex::new(initial),
        }
    }

    /// Distillery this manager is bound to.
    pub const fn distillery_id(&self) -> DistilleryId {
        self.distillery_id
    }

    /// Snapshot of the local slot.
    pub fn slot(&self) -> VisitSlot {
        self.lock_slot().clone()
    }

    fn lock_slot(&self) -> MutexGuard<'_, VisitSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn commit(&self, next: VisitSlot) -> VisitSlot {
        let mut slot = self.lock_slot();
        *slot = next;
        slot.clone()
    }
}

impl<V> VisitRecordManager<V>
where
    V: VisitRepository,
{
    fn map_repository_error(error: VisitRepositoryError) -> Error {
        match error {
            VisitRepositoryError::Connection { message } => {
                Error::backend(format!("visit repository unavailable: {message}"))
            }
            VisitRepositoryError::Timeout { message } => {
                Error::backend(format!("visit repository timed out: {message}"))
            }
            VisitRepositoryError::Query { message } => {
                Error::backend(format!("visit repository error: {message}"))
            }
            VisitRepositoryError::Conflict { message } => {
                Error::backend(format!("visit write conflicted: {message}"))
            }
            VisitRepositoryError::NotFound { message } => {
                Error::backend(format!("visit missing from store: {message}"))
            }
        }
    }

    fn fail(&self, operation: &'static str, error: VisitRepositoryError) -> Error {
        error!(
            distillery_id = %self.distillery_id,
            operation,
            %error,
            "visit write failed"
        );
        Self::map_repository_error(error)
    }

    /// Record a visit, updating the existing remote row when one is found.
    ///
    /// The remote store is always consulted first so stale local state can
    /// never produce a second row for the pair. An insert that still races
    /// into a uniqueness conflict falls back to an update.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` for anonymous sessions and `BackendError`
    /// when any remote call fails.
    pub async fn mark_visited(
        &self,
        session: &Session,
        details: VisitDetails,
    ) -> Result<VisitSlot, Error> {
        let user_id = session.require_user()?;
        let existing = self
            .repo
            .find(user_id, self.distillery_id)
            .await
            .map_err(|error| self.fail("find", error))?;

        if existing.is_some() {
            debug!(distillery_id = %self.distillery_id, "visit exists remotely, updating");
            self.write_update(user_id, &details).await?;
        } else {
            let visit = NewVisit::new(user_id.clone(), self.distillery_id, details.clone());
            match self.repo.insert(&visit).await {
                Ok(stored) => {
                    debug!(visit_id = %stored.id, "visit inserted");
                }
                Err(VisitRepositoryError::Conflict { message }) => {
                    debug!(%message, "visit insert raced an existing row, updating");
                    self.write_update(user_id, &details).await?;
                }
                Err(error) => return Err(self.fail("insert", error)),
            }
        }

        info!(
            distillery_id = %self.distillery_id,
            visit_date = %details.visit_date,
            "distillery marked visited"
        );
        Ok(self.commit(VisitSlot::Present(details)))
    }

    /// Remove the visit record.
    ///
    /// Unmarking an absent slot makes no remote call and succeeds.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` for anonymous sessions and `BackendError`
    /// when the delete fails.
    pub async fn unmark(&self, session: &Session) -> Result<VisitSlot, Error> {
        let user_id = session.require_user()?;
        let present = self.lock_slot().is_present();
        if !present {
            debug!(distillery_id = %self.distillery_id, "unmark on absent slot ignored");
            return Ok(VisitSlot::Absent);
        }

        self.repo
            .delete(user_id, self.distillery_id)
            .await
            .map_err(|error| self.fail("delete", error))?;

        info!(distillery_id = %self.distillery_id, "distillery visit removed");
        Ok(self.commit(VisitSlot::Absent))
    }

    /// Overwrite date and notes of the recorded visit.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` for anonymous sessions, `InvalidRequest`
    /// when no visit is recorded, and `BackendError` when the update fails.
    pub async fn update_details(
        &self,
        session: &Session,
        details: VisitDetails,
    ) -> Result<VisitSlot, Error> {
        let user_id = session.require_user()?;
        let present = self.lock_slot().is_present();
        if !present {
            return Err(Error::invalid_request(
                "cannot edit details of a visit that is not recorded",
            ));
        }

        self.write_update(user_id, &details).await?;
        info!(distillery_id = %self.distillery_id, "visit details updated");
        Ok(self.commit(VisitSlot::Present(details)))
    }

    /// Flip the slot: unmark when present, otherwise mark with `details`.
    ///
    /// # Errors
    ///
    /// See [`Self::mark_visited`] and [`Self::unmark`].
    pub async fn toggle(
        &self,
        session: &Session,
        details: VisitDetails,
    ) -> Result<VisitSlot, Error> {
        let present = self.lock_slot().is_present();
        if present {
            self.unmark(session).await
        } else {
            self.mark_visited(session, details).await
        }
    }

    async fn write_update(&self, user_id: &UserId, details: &VisitDetails) -> Result<(), Error> {
        self.repo
            .update(user_id, self.distillery_id, details)
            .await
            .map_err(|error| self.fail("update", error))
    }
}
