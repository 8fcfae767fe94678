//! HTTP endpoint implementations for resources, records and login.

mod auth_handlers;
mod crud_handlers;
mod record_handlers;
pub mod request_utils;
pub mod response;

pub use auth_handlers::{health, login, LoginRequest};
pub use crud_handlers::{create, delete, list, patch, read, read_by_email, replace};
pub use record_handlers::{create_record, delete_record, list_records, read_record};
pub use response::{error_response, ErrorResponse};
