//! Optimistic bottle status coordinator.
//!
//! A [`BottleListCoordinator`] owns the locally rendered bottles of one
//! distillery. Each status edit runs the same protocol:
//!
//! 1. plan the new status and tasting date from the requested change;
//! 2. apply it to the local list before the remote call starts;
//! 3. write the status columns through the [`BottleRepository`] port;
//! 4. on failure, restore the pre-edit bottle and return the error;
//! 5. clear the in-flight marker and notify the [`StatusEditListener`].
//!
//! The local state sits behind a `std::sync::Mutex` that is never held across
//! an `.await`.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use mockable::Clock;
use tracing::{debug, error, info};

use crate::domain::ports::{BottleRepository, BottleRepositoryError};
use crate::domain::{Bottle, BottleId, BottleStatusUpdate, Error, StatusChange, tasted_count};

/// Scope of the in-flight guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditGuard {
    /// One edit at a time for the whole list.
    #[default]
    PerList,
    /// One edit at a time per bottle; different bottles proceed concurrently.
    PerBottle,
}

/// How a status edit ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The remote write succeeded and the optimistic state stands.
    Committed,
    /// The remote write failed and the bottle was restored.
    RolledBack,
}

/// Receives a callback whenever a status edit settles.
///
/// Parents use it to drop loading indicators and recompute derived fields
/// such as the tasted counter.
pub trait StatusEditListener: Send + Sync {
    /// Called once per accepted edit, after the in-flight marker cleared.
    fn edit_settled(&self, bottle_id: BottleId, outcome: EditOutcome);
}

#[derive(Debug, Default)]
struct ListState {
    bottles: Vec<Bottle>,
    in_flight: HashSet<BottleId>,
}

impl ListState {
    fn bottle_mut(&mut self, bottle_id: BottleId) -> Option<&mut Bottle> {
        self.bottles.iter_mut().find(|bottle| bottle.id == bottle_id)
    }

    fn position(&self, bottle_id: BottleId) -> Option<usize> {
        self.bottles.iter().position(|bottle| bottle.id == bottle_id)
    }
}

/// Clears the in-flight marker when the edit future finishes or is dropped.
struct InFlight<'a> {
    state: &'a Mutex<ListState>,
    bottle_id: BottleId,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.in_flight.remove(&self.bottle_id);
    }
}

/// Applies bottle status edits optimistically for one list of bottles.
pub struct BottleListCoordinator<B> {
    repo: Arc<B>,
    clock: Arc<dyn Clock>,
    guard: EditGuard,
    listener: Option<Arc<dyn StatusEditListener>>,
    state: Mutex<ListState>,
}

impl<B> BottleListCoordinator<B> {
    /// Create a coordinator over `bottles` using the per-list guard.
    pub fn new(repo: Arc<B>, clock: Arc<dyn Clock>, bottles: Vec<Bottle>) -> Self {
        Self {
            repo,
            clock,
            guard: EditGuard::default(),
            listener: None,
            state: Mutex::new(ListState {
                bottles,
                in_flight: HashSet::new(),
            }),
        }
    }

    /// Use `guard` as the in-flight scope.
    #[must_use]
    pub fn with_guard(mut self, guard: EditGuard) -> Self {
        self.guard = guard;
        self
    }

    /// Notify `listener` whenever an edit settles.
    #[must_use]
    pub fn with_listener(mut self, listener: Arc<dyn StatusEditListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Snapshot of the bottles in presentation order.
    pub fn bottles(&self) -> Vec<Bottle> {
        self.lock_state().bottles.clone()
    }

    /// Number of bottles that count towards the tasted badge.
    pub fn tasted_count(&self) -> usize {
        tasted_count(&self.lock_state().bottles)
    }

    /// Whether any edit is in flight.
    pub fn is_busy(&self) -> bool {
        !self.lock_state().in_flight.is_empty()
    }

    /// Whether an edit on `bottle_id` is in flight.
    pub fn is_pending(&self, bottle_id: BottleId) -> bool {
        self.lock_state().in_flight.contains(&bottle_id)
    }

    /// Replace the list after a refetch. Local ordering is discarded.
    pub fn replace_bottles(&self, bottles: Vec<Bottle>) {
        self.lock_state().bottles = bottles;
    }

    /// Move `active` to the position currently held by `over`.
    ///
    /// Returns `false` without changing anything when either id is unknown or
    /// both are the same. Nothing is written remotely.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// // [a, b, c] with move_bottle(a, c) becomes [b, c, a]
    /// assert!(coordinator.move_bottle(a, c));
    /// ```
    pub fn move_bottle(&self, active: BottleId, over: BottleId) -> bool {
        if active == over {
            return false;
        }
        let mut state = self.lock_state();
        let (Some(from), Some(to)) = (state.position(active), state.position(over)) else {
            return false;
        };
        let bottle = state.bottles.remove(from);
        state.bottles.insert(to, bottle);
        debug!(bottle_id = %active, from, to, "bottle reordered locally");
        true
    }

    fn lock_state(&self) -> MutexGuard<'_, ListState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, bottle_id: BottleId, outcome: EditOutcome) {
        if let Some(listener) = &self.listener {
            listener.edit_settled(bottle_id, outcome);
        }
    }

    /// Apply the change locally and mark the bottle in flight.
    ///
    /// Returns the pre-edit snapshot, the optimistic bottle, and the update to
    /// write.
    fn begin(
        &self,
        bottle_id: BottleId,
        change: StatusChange,
    ) -> Result<(Bottle, Bottle, BottleStatusUpdate), Error> {
        let mut state = self.lock_state();
        let rejected = match self.guard {
            EditGuard::PerList => !state.in_flight.is_empty(),
            EditGuard::PerBottle => state.in_flight.contains(&bottle_id),
        };
        if rejected {
            debug!(bottle_id = %bottle_id, guard = ?self.guard, "status edit rejected while busy");
            return Err(Error::busy("a status edit is already in flight"));
        }

        let now = self.clock.utc();
        let Some(bottle) = state.bottle_mut(bottle_id) else {
            return Err(Error::not_found(format!("bottle {bottle_id} is not in this list")));
        };
        let snapshot = bottle.clone();
        let update = snapshot.plan_status_change(change, now);
        *bottle = snapshot.with_update(&update);
        let optimistic = bottle.clone();
        state.in_flight.insert(bottle_id);
        Ok((snapshot, optimistic, update))
    }

    /// Restore `snapshot` unless the bottle changed again since `optimistic`.
    fn roll_back(&self, snapshot: Bottle, optimistic: &Bottle) {
        let mut state = self.lock_state();
        match state.bottle_mut(snapshot.id) {
            Some(current) if current == optimistic => *current = snapshot,
            Some(_) => {
                debug!(bottle_id = %snapshot.id, "bottle replaced during edit, rollback skipped");
            }
            None => debug!(bottle_id = %snapshot.id, "bottle left the list during edit"),
        }
    }
}

impl<B> BottleListCoordinator<B>
where
    B: BottleRepository,
{
    fn map_repository_error(error: BottleRepositoryError) -> Error {
        match error {
            BottleRepositoryError::Connection { message } => {
                Error::backend(format!("bottle repository unavailable: {message}"))
            }
            BottleRepositoryError::Timeout { message } => {
                Error::backend(format!("bottle repository timed out: {message}"))
            }
            BottleRepositoryError::Query { message } => {
                Error::backend(format!("bottle repository error: {message}"))
            }
            BottleRepositoryError::NotFound { message } => {
                Error::backend(format!("bottle missing from store: {message}"))
            }
        }
    }

    /// Apply `change` to `bottle_id` optimistically and persist it.
    ///
    /// # Errors
    ///
    /// - `Busy` when the guard rejects the edit; nothing changes.
    /// - `NotFound` when the bottle is not in this list.
    /// - `BackendError` when the remote write fails; the bottle is restored.
    pub async fn edit(&self, bottle_id: BottleId, change: StatusChange) -> Result<Bottle, Error> {
        let (snapshot, optimistic, update) = self.begin(bottle_id, change)?;
        let in_flight = InFlight {
            state: &self.state,
            bottle_id,
        };

        let result = self.repo.update_status(&update).await;
        let outcome = match result {
            Ok(()) => {
                info!(
                    bottle_id = %bottle_id,
                    status = %update.status,
                    "bottle status saved"
                );
                Ok(optimistic)
            }
            Err(error) => {
                error!(bottle_id = %bottle_id, %error, "bottle status write failed, rolling back");
                self.roll_back(snapshot, &optimistic);
                Err(Self::map_repository_error(error))
            }
        };

        drop(in_flight);
        let settled = if outcome.is_ok() {
            EditOutcome::Committed
        } else {
            EditOutcome::RolledBack
        };
        self.notify(bottle_id, settled);
        outcome
    }

    /// Flip the tasted flag of `bottle_id`.
    ///
    /// # Errors
    ///
    /// See [`Self::edit`].
    pub async fn toggle_tasted(&self, bottle_id: BottleId) -> Result<Bottle, Error> {
        self.edit(bottle_id, StatusChange::ToggleTasted).await
    }

    /// Flip the owned flag of `bottle_id`.
    ///
    /// # Errors
    ///
    /// See [`Self::edit`].
    pub async fn toggle_owned(&self, bottle_id: BottleId) -> Result<Bottle, Error> {
        self.edit(bottle_id, StatusChange::ToggleOwned).await
    }

    /// Set both flags of `bottle_id` explicitly.
    ///
    /// # Errors
    ///
    /// See [`Self::edit`].
    pub async fn set_flags(
        &self,
        bottle_id: BottleId,
        tasted: bool,
        owned: bool,
    ) -> Result<Bottle, Error> {
        self.edit(bottle_id, StatusChange::Set { tasted, owned }).await
    }
}
