//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **rest**: reqwest-backed repositories and session provider for the
//!   hosted store's REST and auth endpoints
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod rest;
