//! Backend library for the Japanese whisky distillery map.
//!
//! The crate follows a hexagonal layout: [`domain`] holds the types,
//! services, and ports; [`outbound`] adapts the ports to the hosted store's
//! REST API; [`import`] feeds CSV files through the same ports.

pub mod config;
pub mod domain;
pub mod import;
pub mod logging;
pub mod outbound;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
