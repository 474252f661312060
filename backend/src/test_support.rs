//! Test utilities for the backend crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is only compiled for tests or with the
//! `test-support` feature.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, Utc};
use mockable::Clock;

use crate::domain::ports::{
    BottleRepository, BottleRepositoryError, CatalogueEntry, CatalogueRepository,
    CatalogueRepositoryError, DistilleryName, ImportRepository, ImportRepositoryError,
    VisitRepository, VisitRepositoryError,
};
use crate::domain::{
    Bottle, BottleId, BottleStatus, BottleStatusUpdate, Distillery, DistilleryId, NewBottle,
    NewDistillery, NewVisit, Region, RegionId, UserId, UserVisit, VisitDetails, VisitId,
};

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl FixtureClock {
    /// A clock that always reports `utc_now`.
    pub const fn new(utc_now: DateTime<Utc>) -> Self {
        Self { utc_now }
    }

    /// The clock as the shared trait object services take.
    pub fn shared(self) -> Arc<dyn Clock> {
        Arc::new(self)
    }
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

/// Instant [`InMemoryStore::new`] stamps rows with: 2024-01-01T09:00:00Z.
const SEEDED_AT_SECS: i64 = 1_704_099_600;

/// Store operations that can be counted and failed on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    /// `VisitRepository::find`.
    FindVisit,
    /// `VisitRepository::insert`.
    InsertVisit,
    /// `VisitRepository::update`.
    UpdateVisit,
    /// `VisitRepository::delete`.
    DeleteVisit,
    /// `BottleRepository::update_status`.
    UpdateStatus,
    /// `CatalogueRepository::fetch_catalogue`.
    FetchCatalogue,
    /// `ImportRepository::find_region_by_name`.
    FindRegion,
    /// `ImportRepository::insert_distillery`.
    InsertDistillery,
    /// `ImportRepository::distillery_names`.
    ListDistilleryNames,
    /// `ImportRepository::insert_bottle`.
    InsertBottle,
}

#[derive(Debug, Default)]
struct StoreState {
    regions: Vec<Region>,
    distilleries: Vec<Distillery>,
    bottles: Vec<Bottle>,
    visits: Vec<UserVisit>,
    calls: HashMap<StoreOperation, usize>,
    failing: HashSet<StoreOperation>,
    rejected_names: HashSet<String>,
}

impl StoreState {
    /// Count the call and report whether it should fail.
    fn record(&mut self, operation: StoreOperation) -> bool {
        *self.calls.entry(operation).or_default() += 1;
        self.failing.contains(&operation)
    }
}

/// In-memory stand-in for the hosted store implementing every table port.
///
/// Visits keep the (user, distillery) uniqueness constraint, so a second
/// insert for the same pair fails with a conflict just like the real table.
/// Updates that match no row fail with `NotFound`, as the REST adapters do.
/// Every timestamp the store writes comes from its clock.
pub struct InMemoryStore {
    state: Mutex<StoreState>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// An empty store whose clock is pinned to 2024-01-01T09:00:00Z.
    pub fn new() -> Self {
        let seeded_at = DateTime::from_timestamp(SEEDED_AT_SECS, 0).unwrap_or_default();
        Self::with_clock(FixtureClock::new(seeded_at).shared())
    }

    /// An empty store stamping rows with `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every later call of `operation` fail.
    pub fn fail(&self, operation: StoreOperation) {
        self.lock().failing.insert(operation);
    }

    /// Let `operation` succeed again.
    pub fn recover(&self, operation: StoreOperation) {
        self.lock().failing.remove(&operation);
    }

    /// Reject distillery or bottle inserts whose name is `name`.
    pub fn reject_name(&self, name: &str) {
        self.lock().rejected_names.insert(name.to_owned());
    }

    /// How often `operation` was called.
    pub fn calls(&self, operation: StoreOperation) -> usize {
        self.lock().calls.get(&operation).copied().unwrap_or_default()
    }

    /// Seed a region.
    pub fn add_region(&self, name: &str) -> Region {
        let region = Region {
            id: RegionId::random(),
            name: name.to_owned(),
            description: None,
            created_at: self.clock.utc(),
        };
        self.lock().regions.push(region.clone());
        region
    }

    /// Seed a distillery without region.
    pub fn add_distillery(&self, name: &str) -> Distillery {
        let distillery = Distillery {
            id: DistilleryId::random(),
            name: name.to_owned(),
            region_id: None,
            sub_region_id: None,
            latitude: 35.0,
            longitude: 138.0,
            description: None,
            tours_available: false,
            tour_info: None,
            created_at: self.clock.utc(),
        };
        self.lock().distilleries.push(distillery.clone());
        distillery
    }

    /// Seed a bottle with `status`; tasted statuses get a tasting date.
    pub fn add_bottle(
        &self,
        distillery_id: DistilleryId,
        name: &str,
        status: BottleStatus,
    ) -> Bottle {
        let now = self.clock.utc();
        let bottle = Bottle {
            id: BottleId::random(),
            name: name.to_owned(),
            age_statement: None,
            distillery_id,
            status,
            tasting_date: status.is_tasted().then_some(now),
            created_at: now,
            updated_at: now,
        };
        self.lock().bottles.push(bottle.clone());
        bottle
    }

    /// Seed a visit row directly, bypassing local state.
    pub fn add_visit(
        &self,
        user_id: &UserId,
        distillery_id: DistilleryId,
        visit_date: NaiveDate,
    ) -> UserVisit {
        let visit = UserVisit {
            id: VisitId::random(),
            user_id: user_id.clone(),
            distillery_id,
            visit_date,
            notes: None,
            created_at: self.clock.utc(),
        };
        self.lock().visits.push(visit.clone());
        visit
    }

    /// Stored distilleries.
    pub fn distilleries(&self) -> Vec<Distillery> {
        self.lock().distilleries.clone()
    }

    /// Stored bottles.
    pub fn bottles(&self) -> Vec<Bottle> {
        self.lock().bottles.clone()
    }

    /// Stored bottle by id.
    pub fn bottle(&self, bottle_id: BottleId) -> Option<Bottle> {
        self.lock()
            .bottles
            .iter()
            .find(|bottle| bottle.id == bottle_id)
            .cloned()
    }

    /// Stored visits.
    pub fn visits(&self) -> Vec<UserVisit> {
        self.lock().visits.clone()
    }

    /// Drop a bottle row, as another client deleting it would.
    pub fn remove_bottle(&self, bottle_id: BottleId) {
        self.lock().bottles.retain(|bottle| bottle.id != bottle_id);
    }
}

#[async_trait]
impl BottleRepository for InMemoryStore {
    async fn update_status(
        &self,
        update: &BottleStatusUpdate,
    ) -> Result<(), BottleRepositoryError> {
        let mut state = self.lock();
        if state.record(StoreOperation::UpdateStatus) {
            return Err(BottleRepositoryError::connection("injected update failure"));
        }
        let bottle = state
            .bottles
            .iter_mut()
            .find(|bottle| bottle.id == update.bottle_id)
            .ok_or_else(|| BottleRepositoryError::not_found(update.bottle_id.to_string()))?;
        bottle.status = update.status;
        bottle.tasting_date = update.tasting_date;
        bottle.updated_at = self.clock.utc();
        Ok(())
    }
}

#[async_trait]
impl VisitRepository for InMemoryStore {
    async fn find(
        &self,
        user_id: &UserId,
        distillery_id: DistilleryId,
    ) -> Result<Option<UserVisit>, VisitRepositoryError> {
        let mut state = self.lock();
        if state.record(StoreOperation::FindVisit) {
            return Err(VisitRepositoryError::connection("injected find failure"));
        }
        Ok(state
            .visits
            .iter()
            .find(|visit| &visit.user_id == user_id && visit.distillery_id == distillery_id)
            .cloned())
    }

    async fn insert(&self, visit: &NewVisit) -> Result<UserVisit, VisitRepositoryError> {
        let mut state = self.lock();
        if state.record(StoreOperation::InsertVisit) {
            return Err(VisitRepositoryError::connection("injected insert failure"));
        }
        let duplicate = state.visits.iter().any(|existing| {
            existing.user_id == visit.user_id && existing.distillery_id == visit.distillery_id
        });
        if duplicate {
            return Err(VisitRepositoryError::conflict(
                "duplicate key value violates unique constraint on (user_id, distillery_id)",
            ));
        }
        let stored = UserVisit {
            id: VisitId::random(),
            user_id: visit.user_id.clone(),
            distillery_id: visit.distillery_id,
            visit_date: visit.visit_date,
            notes: visit.notes.clone(),
            created_at: self.clock.utc(),
        };
        state.visits.push(stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        user_id: &UserId,
        distillery_id: DistilleryId,
        details: &VisitDetails,
    ) -> Result<(), VisitRepositoryError> {
        let mut state = self.lock();
        if state.record(StoreOperation::UpdateVisit) {
            return Err(VisitRepositoryError::connection("injected update failure"));
        }
        let visit = state
            .visits
            .iter_mut()
            .find(|visit| &visit.user_id == user_id && visit.distillery_id == distillery_id)
            .ok_or_else(|| {
                VisitRepositoryError::not_found(format!(
                    "user {user_id} at distillery {distillery_id}"
                ))
            })?;
        visit.visit_date = details.visit_date;
        visit.notes.clone_from(&details.notes);
        Ok(())
    }

    async fn delete(
        &self,
        user_id: &UserId,
        distillery_id: DistilleryId,
    ) -> Result<(), VisitRepositoryError> {
        let mut state = self.lock();
        if state.record(StoreOperation::DeleteVisit) {
            return Err(VisitRepositoryError::connection("injected delete failure"));
        }
        state
            .visits
            .retain(|visit| !(&visit.user_id == user_id && visit.distillery_id == distillery_id));
        Ok(())
    }
}

#[async_trait]
impl CatalogueRepository for InMemoryStore {
    async fn fetch_catalogue(&self) -> Result<Vec<CatalogueEntry>, CatalogueRepositoryError> {
        let mut state = self.lock();
        if state.record(StoreOperation::FetchCatalogue) {
            return Err(CatalogueRepositoryError::connection("injected catalogue failure"));
        }
        Ok(state
            .distilleries
            .iter()
            .map(|distillery| CatalogueEntry {
                distillery: distillery.clone(),
                bottles: state
                    .bottles
                    .iter()
                    .filter(|bottle| bottle.distillery_id == distillery.id)
                    .cloned()
                    .collect(),
                visits: state
                    .visits
                    .iter()
                    .filter(|visit| visit.distillery_id == distillery.id)
                    .cloned()
                    .collect(),
            })
            .collect())
    }
}

#[async_trait]
impl ImportRepository for InMemoryStore {
    async fn find_region_by_name(
        &self,
        name: &str,
    ) -> Result<Option<Region>, ImportRepositoryError> {
        let mut state = self.lock();
        if state.record(StoreOperation::FindRegion) {
            return Err(ImportRepositoryError::connection("injected region failure"));
        }
        Ok(state.regions.iter().find(|region| region.name == name).cloned())
    }

    async fn insert_distillery(
        &self,
        distillery: &NewDistillery,
    ) -> Result<DistilleryId, ImportRepositoryError> {
        let mut state = self.lock();
        if state.record(StoreOperation::InsertDistillery)
            || state.rejected_names.contains(&distillery.name)
        {
            return Err(ImportRepositoryError::query(format!(
                "insert of {} rejected",
                distillery.name
            )));
        }
        let id = DistilleryId::random();
        state.distilleries.push(Distillery {
            id,
            name: distillery.name.clone(),
            region_id: Some(distillery.region_id),
            sub_region_id: None,
            latitude: distillery.latitude,
            longitude: distillery.longitude,
            description: distillery.description.clone(),
            tours_available: distillery.tours_available,
            tour_info: distillery.tour_info.clone(),
            created_at: self.clock.utc(),
        });
        Ok(id)
    }

    async fn distillery_names(&self) -> Result<Vec<DistilleryName>, ImportRepositoryError> {
        let mut state = self.lock();
        if state.record(StoreOperation::ListDistilleryNames) {
            return Err(ImportRepositoryError::connection("injected listing failure"));
        }
        Ok(state
            .distilleries
            .iter()
            .map(|distillery| DistilleryName {
                id: distillery.id,
                name: distillery.name.clone(),
            })
            .collect())
    }

    async fn insert_bottle(&self, bottle: &NewBottle) -> Result<BottleId, ImportRepositoryError> {
        let mut state = self.lock();
        if state.record(StoreOperation::InsertBottle)
            || state.rejected_names.contains(&bottle.name)
        {
            return Err(ImportRepositoryError::query(format!(
                "insert of {} rejected",
                bottle.name
            )));
        }
        let now = self.clock.utc();
        let id = BottleId::random();
        state.bottles.push(Bottle {
            id,
            name: bottle.name.clone(),
            age_statement: bottle.age_statement.clone(),
            distillery_id: bottle.distillery_id,
            status: BottleStatus::NotTasted,
            tasting_date: None,
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }
}
