//! Integration test suite for the storage layer.
//!
//! 1. End-to-end entity lifecycles
//! 2. Persistence across restarts

pub mod end_to_end_tests;
pub mod persistence_tests;
