//! Single-owner runtime for the records database.
//!
//! The HTTP layer never touches the database directly: it sends an
//! [`ApiRequest`] over a channel and awaits the reply on a oneshot. The
//! [`Runtime`] applies requests one at a time and hands snapshots to a
//! persistence thread between them.

mod api_handlers;
mod api_request;
mod persistence_worker;
mod runtime;

pub use api_handlers::ApiHandlers;
pub use api_request::{ApiRequest, CrudOperation, RecordOperation};
pub use persistence_worker::SnapshotStore;
pub use runtime::{Runtime, RuntimeHandle, RuntimeStats};

use records_core::error::DbError;
use records_core::Principal;
use tokio::sync::oneshot;

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, DbError>;

/// Response sender for API requests
pub type ResponseSender = oneshot::Sender<Result<serde_json::Value>>;

/// Response sender for login requests
pub type LoginSender = oneshot::Sender<Result<Principal>>;
