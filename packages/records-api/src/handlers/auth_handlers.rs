//! Unauthenticated endpoints: health check and login.

use hyper::{body::Bytes, Request, Response};
use records_core::Principal;
use records_runtime::ApiRequest;
use serde::Deserialize;

use crate::router::{AppState, RouterError};

use super::request_utils::{dispatch, json_response, read_json_body};
use super::response::{HealthResponse, TokenResponse};

/// Login credentials.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `GET /health`
pub async fn health(_state: AppState) -> Result<Response<Bytes>, RouterError> {
    json_response(
        200,
        &HealthResponse {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        },
    )
}

/// Exchanges an email and password for a bearer token.
///
/// # Endpoint
/// `POST /auth/login`
///
/// # Request Body
/// ```json
/// { "email": "teacher@test.com", "password": "secret" }
/// ```
///
/// # Response
/// - **200 OK**
/// ```json
/// { "access_token": "eyJ...", "token_type": "bearer", "expires_in": 3600 }
/// ```
///
/// # Errors
/// - **400 Bad Request**: Body is not JSON
/// - **401 Unauthorized**: Unknown email, wrong password, or account without a password
/// - **422 Unprocessable Entity**: Missing `email` or `password`
pub async fn login(
    req: Request<hyper::body::Incoming>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let body = read_json_body(req, &state).await?;
    let LoginRequest { email, password } = serde_json::from_value(body)
        .map_err(|e| RouterError::Unprocessable(format!("Invalid payload: {}", e)))?;

    let principal: Principal = dispatch(&state, |response| ApiRequest::Login {
        email,
        password,
        response,
    })
    .await?;

    let access_token = state.tokens.issue_for(&principal)?;
    tracing::info!("Issued token for {} ({})", principal.guid, principal.role);

    json_response(
        200,
        &TokenResponse {
            access_token,
            token_type: "bearer",
            expires_in: state.tokens.ttl_secs(),
        },
    )
}
