//! Filesystem side of the crate: the test-data store, its configuration and
//! working-directory copies.

pub mod config;
pub mod store;
pub mod typed;
pub mod workspace;
