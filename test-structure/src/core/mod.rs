//! Deterministic, pure logic shared by the store and the stage runner.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! bytes and strings and return deterministic outputs suitable for tests.

pub mod encoding;
pub mod key;
pub mod skip;
