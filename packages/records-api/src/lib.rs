//! REST API server for the academic records database.
//!
//! Provides HTTP endpoints for student, teacher and year CRUD, per-student
//! academic records, login, and request routing behind a bearer token gate.

pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;
