//! Matchit routing configuration.

use std::sync::Arc;

use hyper::header::{HeaderValue, CONTENT_TYPE, WWW_AUTHENTICATE};
use hyper::{body::Bytes, Method, Request, Response, StatusCode};
use matchit::Router as MatchitRouter;
use records_core::config::RecordsConfig;
use records_core::model::Resource;
use records_runtime::ApiRequest;
use tokio::sync::mpsc;

use crate::handlers;
use crate::middleware::{bearer_token, AuthError, Authenticator, JwtAuthenticator};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Arc<RecordsConfig>,
    /// API request sender to runtime
    pub api_tx: mpsc::Sender<ApiRequest>,
    /// Gate applied to every protected route
    pub authenticator: Arc<dyn Authenticator>,
    /// Signs tokens handed out by `/auth/login`
    pub tokens: Arc<JwtAuthenticator>,
}

/// HTTP request router.
pub struct Router {
    inner: MatchitRouter<RouteHandler>,
    state: AppState,
}

impl Router {
    /// Creates a router with every resource route registered.
    ///
    /// `authenticator` guards the protected routes; `tokens` signs the
    /// tokens issued on login. Both are usually the same JWT authenticator.
    pub fn new(
        config: Arc<RecordsConfig>,
        api_tx: mpsc::Sender<ApiRequest>,
        authenticator: Arc<dyn Authenticator>,
        tokens: Arc<JwtAuthenticator>,
    ) -> Result<Self, RouterError> {
        let mut router = MatchitRouter::new();

        insert(&mut router, "/health".to_string(), RouteHandler::Health)?;
        insert(&mut router, "/auth/login".to_string(), RouteHandler::Login)?;

        for resource in Resource::ALL {
            insert(
                &mut router,
                format!("/{}", resource),
                RouteHandler::Collection(resource),
            )?;
            insert(
                &mut router,
                format!("/{}/{{guid}}", resource),
                RouteHandler::Item(resource),
            )?;
            if resource.has_email() {
                insert(
                    &mut router,
                    format!("/{}/email/{{email}}", resource),
                    RouteHandler::ByEmail(resource),
                )?;
            }
        }

        // Academic records nested under a student
        insert(
            &mut router,
            "/student/{guid}/record".to_string(),
            RouteHandler::Records,
        )?;
        insert(
            &mut router,
            "/student/{guid}/record/{record}".to_string(),
            RouteHandler::Record,
        )?;

        Ok(Self {
            inner: router,
            state: AppState {
                config,
                api_tx,
                authenticator,
                tokens,
            },
        })
    }

    /// Routes an incoming request to the appropriate handler.
    ///
    /// # Returns
    /// `Result<Response<Bytes>, RouterError>` containing the response or an error.
    pub async fn route(
        &self,
        req: Request<hyper::body::Incoming>,
    ) -> Result<Response<Bytes>, RouterError> {
        let path = req.uri().path().to_string();

        let matched = self
            .inner
            .at(&path)
            .map_err(|_| RouterError::NotFound(format!("No route found for {}", path)))?;
        let handler = *matched.value;

        if handler.requires_auth() {
            let token = bearer_token(req.headers())?;
            let claims = self.state.authenticator.authenticate(token)?;
            tracing::trace!("{} {} as {} ({})", req.method(), path, claims.sub, claims.role);
        }

        handler
            .handle(req, matched.params, self.state.clone())
            .await
    }
}

fn insert(
    router: &mut MatchitRouter<RouteHandler>,
    path: String,
    handler: RouteHandler,
) -> Result<(), RouterError> {
    router
        .insert(path.clone(), handler)
        .map_err(|e| RouterError::InternalError(format!("Failed to insert {} route: {}", path, e)))
}

/// Route handler function.
#[derive(Debug, Clone, Copy)]
enum RouteHandler {
    Health,
    Login,
    Collection(Resource),
    Item(Resource),
    ByEmail(Resource),
    Records,
    Record,
}

impl RouteHandler {
    fn requires_auth(&self) -> bool {
        !matches!(self, RouteHandler::Health | RouteHandler::Login)
    }

    /// Handles a request with the given route parameters.
    async fn handle(
        &self,
        req: Request<hyper::body::Incoming>,
        params: matchit::Params<'_, '_>,
        state: AppState,
    ) -> Result<Response<Bytes>, RouterError> {
        let method = req.method().clone();
        match (*self, method) {
            (RouteHandler::Health, Method::GET) => handlers::health(state).await,
            (RouteHandler::Login, Method::POST) => handlers::login(req, state).await,

            (RouteHandler::Collection(resource), Method::GET) => {
                handlers::list(req, resource, state).await
            }
            (RouteHandler::Collection(resource), Method::POST) => {
                handlers::create(req, resource, state).await
            }

            (RouteHandler::Item(resource), Method::GET) => {
                handlers::read(params, resource, state).await
            }
            (RouteHandler::Item(resource), Method::PUT) => {
                handlers::replace(req, params, resource, state).await
            }
            (RouteHandler::Item(resource), Method::PATCH) => {
                handlers::patch(req, params, resource, state).await
            }
            (RouteHandler::Item(resource), Method::DELETE) => {
                handlers::delete(params, resource, state).await
            }

            (RouteHandler::ByEmail(resource), Method::GET) => {
                handlers::read_by_email(params, resource, state).await
            }

            (RouteHandler::Records, Method::POST) => {
                handlers::create_record(req, params, state).await
            }
            (RouteHandler::Records, Method::GET) => {
                handlers::list_records(req, params, state).await
            }
            (RouteHandler::Record, Method::GET) => handlers::read_record(params, state).await,
            (RouteHandler::Record, Method::DELETE) => {
                handlers::delete_record(params, state).await
            }

            _ => Err(RouterError::MethodNotAllowed),
        }
    }
}

/// Router error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    MethodNotAllowed,
    InternalError(String),
    Timeout,
    BadRequest(String),
    NotFound(String),
    /// Credentials presented but rejected
    Unauthorized(String),
    /// No usable credentials presented
    Forbidden(String),
    Conflict(String),
    Unprocessable(String),
}

impl RouterError {
    pub fn status(&self) -> StatusCode {
        match self {
            RouterError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RouterError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RouterError::Timeout => StatusCode::REQUEST_TIMEOUT,
            RouterError::BadRequest(_) => StatusCode::BAD_REQUEST,
            RouterError::NotFound(_) => StatusCode::NOT_FOUND,
            RouterError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            RouterError::Forbidden(_) => StatusCode::FORBIDDEN,
            RouterError::Conflict(_) => StatusCode::CONFLICT,
            RouterError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn message(&self) -> &str {
        match self {
            RouterError::MethodNotAllowed => "Method Not Allowed",
            RouterError::Timeout => "Request Timeout",
            RouterError::InternalError(msg)
            | RouterError::BadRequest(msg)
            | RouterError::NotFound(msg)
            | RouterError::Unauthorized(msg)
            | RouterError::Forbidden(msg)
            | RouterError::Conflict(msg)
            | RouterError::Unprocessable(msg) => msg.as_str(),
        }
    }
}

impl std::fmt::Display for RouterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouterError::MethodNotAllowed => write!(f, "Method Not Allowed"),
            RouterError::InternalError(msg) => write!(f, "Internal Error: {}", msg),
            RouterError::Timeout => write!(f, "Request Timeout"),
            RouterError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            RouterError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            RouterError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            RouterError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            RouterError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            RouterError::Unprocessable(msg) => write!(f, "Unprocessable Entity: {}", msg),
        }
    }
}

impl std::error::Error for RouterError {}

impl From<AuthError> for RouterError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Issue(_) => RouterError::InternalError(err.to_string()),
            _ if err.is_forbidden() => RouterError::Forbidden(err.to_string()),
            _ => RouterError::Unauthorized(err.to_string()),
        }
    }
}

impl From<RouterError> for Response<Bytes> {
    fn from(err: RouterError) -> Self {
        let status = err.status();
        let error_response =
            crate::handlers::error_response(status.as_u16(), err.message().to_string(), None);
        let body = serde_json::to_vec(&error_response)
            .unwrap_or_else(|e| format!("{{\"success\":false,\"error\":{{\"code\":\"500\",\"message\":\"Failed to serialize error: {}\",\"details\":null}}}}", e).into_bytes());

        let mut response = Response::new(Bytes::from(body));
        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
