//! Database layer
//!
//! This module provides database abstraction for the Furever backend.
//! It supports:
//! - SQLite (default, for single-binary deployment)
//! - MySQL (for larger deployments)
//!
//! The database driver is selected based on configuration. A trait-based
//! abstraction (`DatabasePool`) lets the rest of the application work with
//! either backend without knowing which one is active, and the pool is
//! constructed once at startup and injected into the repositories.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool, DatabasePool, DynDatabasePool};
