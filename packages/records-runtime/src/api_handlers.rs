//! API request handlers

use records_core::config::RecordsConfig;
use records_core::database::{Database, TableAccess};
use records_core::error::DbError;
use records_core::model::{Entity, Mutable, Resource, Student, Teacher, Year};
use records_core::table::ListQuery;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use crate::api_request::{ApiRequest, CrudOperation, RecordOperation};
use crate::Result;

/// Decodes JSON payloads, applies them to the database and encodes replies.
#[derive(Debug, Clone)]
pub struct ApiHandlers {
    /// Page size applied when a list request names no limit
    default_list_limit: Option<usize>,
}

impl ApiHandlers {
    /// Create new API handlers
    pub fn new(config: &RecordsConfig) -> Self {
        Self {
            default_list_limit: config.default_list_limit,
        }
    }

    /// Handle API request. `Flush` belongs to the runtime and is answered there.
    pub fn handle_api_request(&self, db: &mut Database, req: ApiRequest) {
        match req {
            ApiRequest::Crud {
                resource,
                operation,
                response,
            } => {
                let result = self.handle_crud(db, resource, operation);
                let _ = response.send(result);
            }
            ApiRequest::Records {
                student,
                operation,
                response,
            } => {
                let result = self.handle_records(db, student, operation);
                let _ = response.send(result);
            }
            ApiRequest::Login {
                email,
                password,
                response,
            } => {
                let result = db.authenticate(&email, &password);
                if result.is_err() {
                    tracing::info!("Rejected login for {}", email);
                }
                let _ = response.send(result);
            }
            ApiRequest::Flush { response } => {
                let _ = response.send(Err(DbError::IoError(
                    "flush requests are handled by the runtime".to_string(),
                )));
            }
        }
    }

    /// Dispatches a CRUD operation to the typed table.
    pub fn handle_crud(
        &self,
        db: &mut Database,
        resource: Resource,
        operation: CrudOperation,
    ) -> Result<Value> {
        match (resource, operation) {
            // Deleting a student also hides its records
            (Resource::Student, CrudOperation::Delete { guid }) => {
                db.delete_student(guid).map(|()| Value::Null)
            }
            (Resource::Student, operation) => self.crud::<Student>(db, operation),
            (Resource::Teacher, operation) => self.crud::<Teacher>(db, operation),
            (Resource::Year, operation) => self.crud::<Year>(db, operation),
        }
    }

    fn crud<T>(&self, db: &mut Database, operation: CrudOperation) -> Result<Value>
    where
        T: Mutable,
        Database: TableAccess<T>,
    {
        match operation {
            CrudOperation::Create { body } => {
                let input = decode::<T::Create>(body)?;
                let row = db.create::<T>(input)?;
                tracing::debug!("Created {} {}", T::TABLE, row.guid());
                row.to_public_json()
            }
            CrudOperation::Read { guid } => db.get::<T>(guid)?.to_public_json(),
            CrudOperation::ReadByEmail { email } => db.find_by_email::<T>(&email)?.to_public_json(),
            CrudOperation::List { query } => {
                let query = self.window(query);
                to_json_array(db.list::<T>(&query))
            }
            CrudOperation::Replace { guid, body } => {
                let input = decode::<T::Put>(body)?;
                db.put::<T>(guid, input)?.to_public_json()
            }
            CrudOperation::Patch { guid, body } => {
                let input = decode::<T::Patch>(body)?;
                db.patch::<T>(guid, input)?.to_public_json()
            }
            CrudOperation::Delete { guid } => {
                db.delete::<T>(guid)?;
                tracing::debug!("Deleted {} {}", T::TABLE, guid);
                Ok(Value::Null)
            }
        }
    }

    /// Dispatches an operation on a student's records.
    pub fn handle_records(
        &self,
        db: &mut Database,
        student: Uuid,
        operation: RecordOperation,
    ) -> Result<Value> {
        match operation {
            RecordOperation::Create { year, body } => {
                let input = decode(body)?;
                db.create_record(student, year, input)?.to_public_json()
            }
            RecordOperation::List { year, query } => {
                let query = self.window(query);
                to_json_array(db.list_records(student, year, &query)?)
            }
            RecordOperation::Read { guid } => db.get_record(student, guid)?.to_public_json(),
            RecordOperation::Delete { guid } => {
                db.delete_record(student, guid)?;
                Ok(Value::Null)
            }
        }
    }

    fn window(&self, query: ListQuery) -> ListQuery {
        ListQuery {
            limit: query.limit.or(self.default_list_limit),
            offset: query.offset,
        }
    }
}

fn decode<T: DeserializeOwned>(body: Value) -> Result<T> {
    serde_json::from_value(body).map_err(|e| DbError::InvalidPayload(e.to_string()))
}

fn to_json_array<T: Entity>(rows: Vec<&T>) -> Result<Value> {
    rows.into_iter()
        .map(Entity::to_public_json)
        .collect::<Result<Vec<_>>>()
        .map(Value::Array)
}
