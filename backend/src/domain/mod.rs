//! Domain primitives, aggregates, and services.
//!
//! Purpose: Define strongly typed entities for the distillery catalogue and
//! the services that keep bottle status and visit records in step with the
//! hosted store. Types are transport agnostic; adapters in
//! [`crate::outbound`] translate them to and from the wire.
//!
//! Public surface:
//! - Error (alias to `error::Error`) — error payload returned by services.
//! - ErrorCode (alias to `error::ErrorCode`) — stable error identifier.
//! - BottleStatus — the four-valued tasted/owned status.
//! - VisitRecordManager — one (user, distillery) visit slot.
//! - BottleListCoordinator — optimistic status edits for a list of bottles.
//! - CatalogueService — distillery overviews for the map and list views.

pub mod bottle;
pub mod bottle_list;
pub mod catalogue_service;
pub mod distillery;
pub mod error;
pub mod ids;
pub mod ports;
pub mod session;
pub mod status;
pub mod visit;
pub mod visit_service;

pub use self::bottle::{Bottle, BottleStatusUpdate, NewBottle};
pub use self::bottle_list::{BottleListCoordinator, EditGuard, EditOutcome, StatusEditListener};
pub use self::catalogue_service::CatalogueService;
pub use self::distillery::{
    Distillery, DistilleryOverview, MarkerSummary, NewDistillery, Region, tasted_count,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::ids::{BottleId, DistilleryId, IdValidationError, RegionId, UserId, VisitId};
pub use self::session::{Session, resolve_session};
pub use self::status::{BottleStatus, ParseBottleStatusError, StatusChange};
pub use self::visit::{NewVisit, UserVisit, VisitDetails, VisitSlot};
pub use self::visit_service::VisitRecordManager;

/// Convenient service result alias.
///
/// # Examples
/// ```
/// use distillery_backend::domain::{Error, ServiceResult};
///
/// fn lookup() -> ServiceResult<()> {
///     Err(Error::not_found("no such distillery"))
/// }
/// # assert!(lookup().is_err());
/// ```
pub type ServiceResult<T> = Result<T, Error>;
