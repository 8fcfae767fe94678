//! Handlers for a student's academic records.

use hyper::{body::Bytes, Request, Response};
use records_core::table::ListQuery;
use records_runtime::{ApiRequest, RecordOperation};
use uuid::Uuid;

use crate::router::{AppState, RouterError};

use super::request_utils::{
    build_empty_response, dispatch, guid_param, json_response, parse_query_params, read_json_body,
    MatchitParams,
};

async fn run(
    state: &AppState,
    student: Uuid,
    operation: RecordOperation,
) -> Result<serde_json::Value, RouterError> {
    dispatch(state, |response| ApiRequest::Records {
        student,
        operation,
        response,
    })
    .await
}

/// Records a mark for a student in an academic year.
///
/// # Endpoint
/// `POST /student/{guid}/record?year={year_guid}`
///
/// # Request Body
/// ```json
/// { "subject": "Mathematics", "mark": 5, "semester": 1 }
/// ```
///
/// # Response
/// - **201 Created**: The stored record
///
/// # Errors
/// - **400 Bad Request**: Missing or malformed `year`
/// - **404 Not Found**: Student or year unknown or deleted
/// - **422 Unprocessable Entity**: Mark outside 1..=5 or semester outside 1..=2
pub async fn create_record(
    req: Request<hyper::body::Incoming>,
    params: MatchitParams<'_, '_>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let student = guid_param(&params, "guid")?;
    let year = parse_query_params(req.uri().query())?
        .year
        .ok_or_else(|| {
            RouterError::BadRequest("Missing required query parameter 'year'".to_string())
        })?;
    let body = read_json_body(req, &state).await?;

    let record = run(&state, student, RecordOperation::Create { year, body }).await?;
    json_response(201, &record)
}

/// Lists a student's live records, optionally for one year.
///
/// # Endpoint
/// `GET /student/{guid}/record[?year={year_guid}]`
pub async fn list_records(
    req: Request<hyper::body::Incoming>,
    params: MatchitParams<'_, '_>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let student = guid_param(&params, "guid")?;
    let query_params = parse_query_params(req.uri().query())?;
    let query = ListQuery {
        limit: query_params.limit,
        offset: query_params.offset.unwrap_or(0),
    };

    let records = run(
        &state,
        student,
        RecordOperation::List {
            year: query_params.year,
            query,
        },
    )
    .await?;
    json_response(200, &records)
}

/// `GET /student/{guid}/record/{record}`
pub async fn read_record(
    params: MatchitParams<'_, '_>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let student = guid_param(&params, "guid")?;
    let guid = guid_param(&params, "record")?;
    let record = run(&state, student, RecordOperation::Read { guid }).await?;
    json_response(200, &record)
}

/// `DELETE /student/{guid}/record/{record}`
pub async fn delete_record(
    params: MatchitParams<'_, '_>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let student = guid_param(&params, "guid")?;
    let guid = guid_param(&params, "record")?;
    run(&state, student, RecordOperation::Delete { guid }).await?;
    build_empty_response(204)
}
