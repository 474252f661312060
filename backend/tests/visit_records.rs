//! Visit record lifecycle against the in-memory store.

use std::sync::Arc;

use chrono::NaiveDate;
use distillery_backend::domain::{
    CatalogueService, Distillery, ErrorCode, Session, UserId, VisitDetails, VisitRecordManager,
    VisitSlot,
};
use distillery_backend::test_support::{InMemoryStore, StoreOperation};
use rstest::{fixture, rstest};

struct World {
    store: Arc<InMemoryStore>,
    distillery: Distillery,
    user: UserId,
}

impl World {
    fn session(&self) -> Session {
        Session::authenticated(self.user.clone())
    }

    fn manager(&self, initial: VisitSlot) -> VisitRecordManager<InMemoryStore> {
        VisitRecordManager::new(Arc::clone(&self.store), self.distillery.id, initial)
    }
}

#[fixture]
fn world() -> World {
    let store = Arc::new(InMemoryStore::new());
    let distillery = store.add_distillery("Yamazaki");
    World {
        store,
        distillery,
        user: UserId::random(),
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

#[rstest]
#[tokio::test]
async fn mark_unmark_and_remark_produce_one_row_at_a_time(world: World) {
    let manager = world.manager(VisitSlot::Absent);
    let session = world.session();

    let slot = manager
        .mark_visited(&session, VisitDetails::new(date(2024, 1, 15), "Great tour"))
        .await
        .expect("mark succeeds");
    assert_eq!(
        slot.details().and_then(|details| details.notes.as_deref()),
        Some("Great tour")
    );
    let first = world.store.visits();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].visit_date, date(2024, 1, 15));

    let slot = manager.unmark(&session).await.expect("unmark succeeds");
    assert_eq!(slot, VisitSlot::Absent);
    assert!(world.store.visits().is_empty());

    manager
        .mark_visited(&session, VisitDetails::new(date(2024, 3, 2), ""))
        .await
        .expect("remark succeeds");
    let second = world.store.visits();
    assert_eq!(second.len(), 1);
    assert_ne!(second[0].id, first[0].id, "a remark creates a fresh row");
    assert_eq!(second[0].notes, None);
}

#[rstest]
#[tokio::test]
async fn stale_local_state_updates_the_existing_row(world: World) {
    world
        .store
        .add_visit(&world.user, world.distillery.id, date(2023, 11, 3));
    let manager = world.manager(VisitSlot::Absent);

    manager
        .mark_visited(&world.session(), VisitDetails::new(date(2024, 1, 15), "Second trip"))
        .await
        .expect("mark succeeds");

    let visits = world.store.visits();
    assert_eq!(visits.len(), 1, "no duplicate row for the pair");
    assert_eq!(visits[0].visit_date, date(2024, 1, 15));
    assert_eq!(visits[0].notes.as_deref(), Some("Second trip"));
    assert_eq!(world.store.calls(StoreOperation::InsertVisit), 0);
    assert_eq!(world.store.calls(StoreOperation::UpdateVisit), 1);
}

#[rstest]
#[tokio::test]
async fn failed_delete_keeps_the_visit(world: World) {
    let manager = world.manager(VisitSlot::Absent);
    let session = world.session();
    manager
        .mark_visited(&session, VisitDetails::new(date(2024, 1, 15), "Great tour"))
        .await
        .expect("mark succeeds");

    world.store.fail(StoreOperation::DeleteVisit);
    let error = manager.unmark(&session).await.expect_err("delete fails");

    assert_eq!(error.code(), ErrorCode::BackendError);
    assert!(manager.slot().is_present());
    assert_eq!(world.store.visits().len(), 1);
}

#[rstest]
#[tokio::test]
async fn editing_a_visit_deleted_elsewhere_fails_without_touching_the_slot(world: World) {
    let recorded = VisitDetails::new(date(2024, 1, 15), "Great tour");
    let manager = world.manager(VisitSlot::Present(recorded.clone()));
    let session = world.session();

    let error = manager
        .update_details(&session, VisitDetails::new(date(2024, 2, 1), "Second tour"))
        .await
        .expect_err("no row to update");

    assert_eq!(error.code(), ErrorCode::BackendError);
    assert!(error.to_string().contains("visit missing from store"));
    assert_eq!(manager.slot(), VisitSlot::Present(recorded));
    assert_eq!(world.store.calls(StoreOperation::UpdateVisit), 1);
    assert!(world.store.visits().is_empty());
}

#[rstest]
#[tokio::test]
async fn anonymous_sessions_cannot_write(world: World) {
    let manager = world.manager(VisitSlot::Absent);

    let error = manager
        .mark_visited(&Session::anonymous(), VisitDetails::new(date(2024, 1, 15), ""))
        .await
        .expect_err("anonymous write rejected");

    assert_eq!(error.code(), ErrorCode::NotAuthenticated);
    assert_eq!(world.store.calls(StoreOperation::FindVisit), 0);
}

#[rstest]
#[tokio::test]
async fn catalogue_reflects_the_session_users_visit(world: World) {
    let other = UserId::random();
    world
        .store
        .add_visit(&other, world.distillery.id, date(2023, 5, 20));
    let catalogue = CatalogueService::new(Arc::clone(&world.store));

    let before = catalogue
        .fetch_overview(&world.session(), world.distillery.id)
        .await
        .expect("overview loads");
    assert!(!before.is_visited(), "another user's visit is not shown");

    let manager = world.manager(VisitSlot::from(before.visit.as_ref()));
    manager
        .mark_visited(&world.session(), VisitDetails::new(date(2024, 1, 15), ""))
        .await
        .expect("mark succeeds");

    let after = catalogue
        .fetch_overview(&world.session(), world.distillery.id)
        .await
        .expect("overview loads");
    assert!(after.is_visited());
    assert_eq!(after.visit.map(|visit| visit.user_id), Some(world.user.clone()));
    assert_eq!(world.store.visits().len(), 2);
}
