//! Core storage for the academic records service.
//!
//! Provides the entity model (students, teachers, academic years and
//! per-student records), soft-delete tables, the database container and
//! snapshot persistence.

pub mod config;
pub mod database;
pub mod error;
pub mod model;
pub mod persistence;
pub mod table;

pub use database::{Database, Principal};
pub use error::DbError;
