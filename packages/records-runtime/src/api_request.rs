//! API request types

use records_core::model::Resource;
use records_core::table::ListQuery;
use serde_json::Value;
use uuid::Uuid;

use crate::{LoginSender, ResponseSender};

/// API request from REST server
#[derive(Debug)]
pub enum ApiRequest {
    /// CRUD operation on a top-level resource
    Crud {
        resource: Resource,
        operation: CrudOperation,
        response: ResponseSender,
    },
    /// Operation on a student's records
    Records {
        student: Uuid,
        operation: RecordOperation,
        response: ResponseSender,
    },
    /// Email/password check; replies with the principal
    Login {
        email: String,
        password: String,
        response: LoginSender,
    },
    /// Force a snapshot flush; replies with whether anything was written
    Flush { response: ResponseSender },
}

impl ApiRequest {
    /// Returns true if this request may change the database.
    pub fn is_write(&self) -> bool {
        match self {
            ApiRequest::Crud { operation, .. } => operation.is_write(),
            ApiRequest::Records { operation, .. } => operation.is_write(),
            ApiRequest::Login { .. } => false,
            ApiRequest::Flush { .. } => false,
        }
    }

    /// Short label for logs.
    pub fn label(&self) -> String {
        match self {
            ApiRequest::Crud {
                resource,
                operation,
                ..
            } => format!("{} {}", operation.name(), resource),
            ApiRequest::Records { operation, .. } => format!("{} record", operation.name()),
            ApiRequest::Login { .. } => "login".to_string(),
            ApiRequest::Flush { .. } => "flush".to_string(),
        }
    }
}

/// CRUD operation types
#[derive(Debug)]
pub enum CrudOperation {
    Create { body: Value },
    Read { guid: Uuid },
    ReadByEmail { email: String },
    List { query: ListQuery },
    Replace { guid: Uuid, body: Value },
    Patch { guid: Uuid, body: Value },
    Delete { guid: Uuid },
}

impl CrudOperation {
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            CrudOperation::Create { .. }
                | CrudOperation::Replace { .. }
                | CrudOperation::Patch { .. }
                | CrudOperation::Delete { .. }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            CrudOperation::Create { .. } => "create",
            CrudOperation::Read { .. } => "read",
            CrudOperation::ReadByEmail { .. } => "read_by_email",
            CrudOperation::List { .. } => "list",
            CrudOperation::Replace { .. } => "replace",
            CrudOperation::Patch { .. } => "patch",
            CrudOperation::Delete { .. } => "delete",
        }
    }
}

/// Operations under `/student/{guid}/record`
#[derive(Debug)]
pub enum RecordOperation {
    Create { year: Uuid, body: Value },
    List { year: Option<Uuid>, query: ListQuery },
    Read { guid: Uuid },
    Delete { guid: Uuid },
}

impl RecordOperation {
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            RecordOperation::Create { .. } | RecordOperation::Delete { .. }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            RecordOperation::Create { .. } => "create",
            RecordOperation::List { .. } => "list",
            RecordOperation::Read { .. } => "read",
            RecordOperation::Delete { .. } => "delete",
        }
    }
}
