//! `SQLite` persistence for podcaster.
//!
//! Implements the `podcaster-core` [`podcaster_core::JobStore`] port over a
//! `(pk, sk)`-addressed key-value table. The schema bootstrap lives in
//! [`setup`]; entry points call [`setup_database`] with a resolved path and
//! hand the pool to [`SqliteJobStore`].

mod repositories;
mod setup;

pub use repositories::SqliteJobStore;
pub use setup::setup_database;

#[cfg(any(test, feature = "test-utils"))]
pub use setup::setup_test_database;
