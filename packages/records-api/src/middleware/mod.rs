//! Request gates applied before routing to handlers.

pub mod auth;

pub use auth::{bearer_token, AuthError, Authenticator, Claims, JwtAuthenticator};
