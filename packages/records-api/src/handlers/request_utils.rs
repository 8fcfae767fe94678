//! Request utilities for HTTP endpoints.

use http_body_util::BodyExt;
use hyper::{body::Bytes, Request, Response};
use percent_encoding::percent_decode_str;
use records_core::error::DbError;
use records_runtime::ApiRequest;
use serde_json::Value;
use tokio::sync::oneshot;
use tokio::time;
use uuid::Uuid;

use crate::router::{AppState, RouterError};

/// Type alias for matchit parameters with explicit lifetimes
pub type MatchitParams<'a, 'b> = matchit::Params<'a, 'b>;

/// Helper function to read request body with timeout
pub async fn read_request_body_with_timeout(
    req: Request<hyper::body::Incoming>,
    timeout_ms: u64,
) -> Result<Bytes, RouterError> {
    let timeout_duration = time::Duration::from_millis(timeout_ms);
    let body = time::timeout(timeout_duration, req.collect())
        .await
        .map_err(|_| RouterError::Timeout)?
        .map_err(|e| RouterError::InternalError(format!("Failed to read request body: {}", e)))?;
    Ok(body.to_bytes())
}

/// Reads the body and parses it as JSON.
pub async fn read_json_body(
    req: Request<hyper::body::Incoming>,
    state: &AppState,
) -> Result<Value, RouterError> {
    let body_bytes = read_request_body_with_timeout(req, state.config.request_timeout_ms).await?;
    serde_json::from_slice(&body_bytes)
        .map_err(|e| RouterError::BadRequest(format!("Failed to parse request: {}", e)))
}

/// Helper function to wait for response with timeout
pub async fn wait_for_response_with_timeout<T>(
    rx: oneshot::Receiver<T>,
    timeout_ms: u64,
) -> Result<T, RouterError> {
    let timeout_duration = time::Duration::from_millis(timeout_ms);
    time::timeout(timeout_duration, rx)
        .await
        .map_err(|_| RouterError::Timeout)?
        .map_err(|e| RouterError::InternalError(format!("Response channel closed: {}", e)))
}

/// Sends a request to the runtime and waits for its reply.
pub async fn dispatch<T, F>(state: &AppState, build: F) -> Result<T, RouterError>
where
    F: FnOnce(oneshot::Sender<Result<T, DbError>>) -> ApiRequest,
{
    let (tx, rx) = oneshot::channel();
    state
        .api_tx
        .send(build(tx))
        .await
        .map_err(|e| RouterError::InternalError(format!("Channel closed: {}", e)))?;

    wait_for_response_with_timeout(rx, state.config.response_timeout_ms)
        .await?
        .map_err(map_db_error_to_router_error)
}

/// Map DbError to appropriate RouterError
pub fn map_db_error_to_router_error(e: DbError) -> RouterError {
    match e {
        DbError::NotFound { .. } => RouterError::NotFound(e.to_string()),
        DbError::Conflict { .. } => RouterError::Conflict(e.to_string()),
        DbError::Validation { .. } | DbError::InvalidPayload(_) => {
            RouterError::Unprocessable(e.to_string())
        }
        DbError::InvalidCredentials => RouterError::Unauthorized(e.to_string()),
        DbError::Timeout => RouterError::Timeout,
        _ => RouterError::InternalError(format!("Runtime error: {}", e)),
    }
}

/// Helper to build HTTP response with proper error handling
pub fn build_response(status: u16, json: Vec<u8>) -> Result<Response<Bytes>, RouterError> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Bytes::from(json))
        .map_err(|e| RouterError::InternalError(format!("Failed to build response: {}", e)))
}

/// Serializes `value` into a JSON response.
pub fn json_response<T: serde::Serialize>(
    status: u16,
    value: &T,
) -> Result<Response<Bytes>, RouterError> {
    let json = serde_json::to_vec(value)
        .map_err(|e| RouterError::InternalError(format!("Failed to serialize response: {}", e)))?;
    build_response(status, json)
}

/// Helper to build empty HTTP response (for 204 No Content)
pub fn build_empty_response(status: u16) -> Result<Response<Bytes>, RouterError> {
    Response::builder()
        .status(status)
        .body(Bytes::new())
        .map_err(|e| RouterError::InternalError(format!("Failed to build response: {}", e)))
}

/// Query parameters accepted by list and record endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    /// Academic year filter or target
    pub year: Option<Uuid>,
}

/// Parse query parameters from URL query string.
///
/// Unknown keys are ignored.
pub fn parse_query_params(query_str: Option<&str>) -> Result<QueryParams, RouterError> {
    let mut params = QueryParams::default();

    let Some(query_str) = query_str else {
        return Ok(params);
    };

    for pair in query_str.split('&') {
        let Some((key, encoded_value)) = pair.split_once('=') else {
            continue;
        };
        let decoded_value = percent_decode_str(encoded_value).decode_utf8_lossy();

        match key {
            "limit" => {
                params.limit = Some(decoded_value.parse().map_err(|e| {
                    RouterError::BadRequest(format!(
                        "Invalid limit value '{}': {}",
                        decoded_value, e
                    ))
                })?);
            }
            "offset" => {
                params.offset = Some(decoded_value.parse().map_err(|e| {
                    RouterError::BadRequest(format!(
                        "Invalid offset value '{}': {}",
                        decoded_value, e
                    ))
                })?);
            }
            "year" => {
                params.year = Some(parse_guid("year", &decoded_value)?);
            }
            _ => {}
        }
    }

    Ok(params)
}

/// Parses a guid, naming `what` in the error.
pub fn parse_guid(what: &str, raw: &str) -> Result<Uuid, RouterError> {
    Uuid::parse_str(raw)
        .map_err(|e| RouterError::BadRequest(format!("Invalid {} guid '{}': {}", what, raw, e)))
}

/// Reads and parses a guid route parameter.
pub fn guid_param(params: &MatchitParams<'_, '_>, name: &str) -> Result<Uuid, RouterError> {
    let raw = params
        .get(name)
        .ok_or_else(|| RouterError::BadRequest(format!("Missing route parameter '{}'", name)))?;
    parse_guid(name, raw)
}

/// Reads and percent-decodes a text route parameter.
pub fn text_param(params: &MatchitParams<'_, '_>, name: &str) -> Result<String, RouterError> {
    let raw = params
        .get(name)
        .ok_or_else(|| RouterError::BadRequest(format!("Missing route parameter '{}'", name)))?;
    percent_decode_str(raw)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|e| RouterError::BadRequest(format!("Invalid {} '{}': {}", name, raw, e)))
}
