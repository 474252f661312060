//! Adapters for the hosted store's REST API.
//!
//! One [`RestClient`] is built from the validated
//! [`StoreConnection`](crate::config::StoreConnection) and shared by every
//! adapter; reqwest clients are cheap to clone.

mod bottle_repository;
mod catalogue_repository;
mod client;
mod dto;
mod error_mapping;
mod import_repository;
mod session_provider;
mod visit_repository;

pub use bottle_repository::RestBottleRepository;
pub use catalogue_repository::RestCatalogueRepository;
pub use client::{Filter, RestClient, RestError};
pub use import_repository::RestImportRepository;
pub use session_provider::RestSessionProvider;
pub use visit_repository::RestVisitRepository;
