//! Helpers shared by unit and integration tests.

pub mod common;
pub mod fixtures;
