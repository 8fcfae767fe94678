//! Integration test suite for the HTTP API.
//!
//! Every test spawns its own runtime and server on a free local port.
//! Clients send a placeholder bearer token that the mock authenticator
//! accepts until `auth_mocker.stop()` switches it to real verification.


pub mod persistence_tests;
pub mod record_tests;
pub mod teacher_tests;
pub mod year_tests;
