//! Unit and integration tests for turso_dbal
//!
//! Submodules follow the library modules: mode resolution and config parsing,
//! connection and transaction behavior against real databases, statements,
//! result projections, SQL helpers and property tests.

mod error_handling_tests;
mod integration_tests;
