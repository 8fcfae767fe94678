//! CRUD (Create, Read, Update, Delete) handlers for `/student`, `/teacher`
//! and `/year`.

use hyper::{body::Bytes, Request, Response};
use records_core::model::Resource;
use records_core::table::ListQuery;
use records_runtime::{ApiRequest, CrudOperation};

use crate::router::{AppState, RouterError};

use super::request_utils::{
    build_empty_response, dispatch, guid_param, json_response, parse_query_params, read_json_body,
    text_param, MatchitParams,
};

async fn run(
    state: &AppState,
    resource: Resource,
    operation: CrudOperation,
) -> Result<serde_json::Value, RouterError> {
    dispatch(state, |response| ApiRequest::Crud {
        resource,
        operation,
        response,
    })
    .await
}

/// Lists live rows of a resource.
///
/// # Endpoint
/// `GET /{resource}?limit={n}&offset={n}`
///
/// # Response
/// - **200 OK**: JSON array in insertion order, deleted rows omitted
///
/// # Errors
/// - **400 Bad Request**: Non-numeric `limit` or `offset`
///
/// # Example
/// ```bash
/// curl http://localhost:8080/student?limit=20 -H "Authorization: Bearer $TOKEN"
/// ```
pub async fn list(
    req: Request<hyper::body::Incoming>,
    resource: Resource,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let params = parse_query_params(req.uri().query())?;
    let query = ListQuery {
        limit: params.limit,
        offset: params.offset.unwrap_or(0),
    };

    let rows = run(&state, resource, CrudOperation::List { query }).await?;
    json_response(200, &rows)
}

/// Creates a row.
///
/// # Endpoint
/// `POST /{resource}`
///
/// # Request Body
/// ```json
/// {
///   "email": "student@test.com",
///   "first_name": "Ivan",
///   "last_name": "Petrov",
///   "middle_name": "Sergeevich",
///   "role": "student",
///   "group": "IU7-11B",
///   "course": 1,
///   "password": "secret"
/// }
/// ```
///
/// # Response
/// - **201 Created**: The stored row with `guid`, `is_deleted`,
///   `created_at` and `updated_at`; passwords are never echoed
///
/// # Errors
/// - **400 Bad Request**: Body is not JSON
/// - **409 Conflict**: Email already used by a live row
/// - **422 Unprocessable Entity**: Missing fields or out-of-range values
pub async fn create(
    req: Request<hyper::body::Incoming>,
    resource: Resource,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let body = read_json_body(req, &state).await?;
    let row = run(&state, resource, CrudOperation::Create { body }).await?;
    tracing::debug!("Created {} {}", resource, row["guid"]);
    json_response(201, &row)
}

/// Reads a row by guid.
///
/// # Endpoint
/// `GET /{resource}/{guid}`
///
/// # Errors
/// - **400 Bad Request**: Malformed guid
/// - **404 Not Found**: Unknown or deleted
pub async fn read(
    params: MatchitParams<'_, '_>,
    resource: Resource,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let guid = guid_param(&params, "guid")?;
    let row = run(&state, resource, CrudOperation::Read { guid }).await?;
    json_response(200, &row)
}

/// Reads a student or teacher by email, ignoring ASCII case.
///
/// # Endpoint
/// `GET /{resource}/email/{email}`
pub async fn read_by_email(
    params: MatchitParams<'_, '_>,
    resource: Resource,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let email = text_param(&params, "email")?;
    let row = run(&state, resource, CrudOperation::ReadByEmail { email }).await?;
    json_response(200, &row)
}

/// Replaces every client-writable field of a row.
///
/// # Endpoint
/// `PUT /{resource}/{guid}`
///
/// # Notes
/// - `guid` and `created_at` are kept, `updated_at` advances
/// - A stored password survives when the body omits one
pub async fn replace(
    req: Request<hyper::body::Incoming>,
    params: MatchitParams<'_, '_>,
    resource: Resource,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let guid = guid_param(&params, "guid")?;
    let body = read_json_body(req, &state).await?;
    let row = run(&state, resource, CrudOperation::Replace { guid, body }).await?;
    json_response(200, &row)
}

/// Updates only the fields present in the body.
///
/// # Endpoint
/// `PATCH /{resource}/{guid}`
pub async fn patch(
    req: Request<hyper::body::Incoming>,
    params: MatchitParams<'_, '_>,
    resource: Resource,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let guid = guid_param(&params, "guid")?;
    let body = read_json_body(req, &state).await?;
    let row = run(&state, resource, CrudOperation::Patch { guid, body }).await?;
    json_response(200, &row)
}

/// Soft-deletes a row. Deleting a student also hides its records.
///
/// # Endpoint
/// `DELETE /{resource}/{guid}`
///
/// # Response
/// - **204 No Content**
///
/// # Errors
/// - **404 Not Found**: Unknown or already deleted
pub async fn delete(
    params: MatchitParams<'_, '_>,
    resource: Resource,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let guid = guid_param(&params, "guid")?;
    run(&state, resource, CrudOperation::Delete { guid }).await?;
    tracing::debug!("Deleted {} {}", resource, guid);
    build_empty_response(204)
}
