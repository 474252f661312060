//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (the hosted store's tables and its auth endpoint). Each trait exposes
//! strongly typed errors so adapters map their failures into predictable
//! variants that services translate into [`Error`](super::Error).

mod macros;
pub(crate) use macros::define_port_error;

mod bottle_repository;
mod catalogue_repository;
mod import_repository;
mod session_provider;
mod visit_repository;

#[cfg(test)]
pub use bottle_repository::MockBottleRepository;
pub use bottle_repository::{BottleRepository, BottleRepositoryError};
#[cfg(test)]
pub use catalogue_repository::MockCatalogueRepository;
pub use catalogue_repository::{CatalogueEntry, CatalogueRepository, CatalogueRepositoryError};
#[cfg(test)]
pub use import_repository::MockImportRepository;
pub use import_repository::{DistilleryName, ImportRepository, ImportRepositoryError};
#[cfg(test)]
pub use session_provider::MockSessionProvider;
pub use session_provider::{FixedSessionProvider, SessionProvider, SessionProviderError};
#[cfg(test)]
pub use visit_repository::MockVisitRepository;
pub use visit_repository::{VisitRepository, VisitRepositoryError};
