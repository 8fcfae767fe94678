//! Bearer token authentication
//!
//! Tokens are HS256 JWTs carrying the principal guid and role. The router
//! only depends on the [`Authenticator`] trait so tests can swap in their
//! own implementation.

use std::fmt;

use chrono::Utc;
use hyper::header::{HeaderMap, AUTHORIZATION};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use records_core::model::Role;
use records_core::Principal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authentication errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No `Authorization` header on the request
    MissingToken,
    /// Header present but not `Bearer <token>`
    InvalidFormat,
    /// Signature, encoding or claims rejected
    InvalidToken(String),
    /// Token has expired
    Expired,
    /// Token could not be signed
    Issue(String),
}

impl AuthError {
    /// Missing or malformed credentials are refused; credentials that were
    /// presented but failed verification are unauthorized.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, AuthError::MissingToken | AuthError::InvalidFormat)
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MissingToken => write!(f, "Not authenticated"),
            AuthError::InvalidFormat => {
                write!(f, "Invalid authorization header (expected 'Bearer <token>')")
            }
            AuthError::InvalidToken(msg) => write!(f, "Invalid token: {}", msg),
            AuthError::Expired => write!(f, "Token has expired"),
            AuthError::Issue(msg) => write!(f, "Failed to issue token: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (principal guid)
    pub sub: Uuid,
    pub role: Role,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Verifies bearer tokens.
pub trait Authenticator: Send + Sync {
    /// Validates a raw token (without the `Bearer ` prefix).
    fn authenticate(&self, token: &str) -> Result<Claims, AuthError>;
}

/// HS256 token issuer and verifier
pub struct JwtAuthenticator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl JwtAuthenticator {
    /// Creates an authenticator signing with `secret`; issued tokens live
    /// for `ttl_secs`.
    pub fn new(secret: &[u8], ttl_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl_secs: i64::try_from(ttl_secs).unwrap_or(i64::MAX),
        }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Signs a token for `subject` with the given role.
    pub fn issue(&self, subject: Uuid, role: Role) -> Result<String, AuthError> {
        let iat = Utc::now().timestamp();
        let claims = Claims {
            sub: subject,
            role,
            iat,
            exp: iat.saturating_add(self.ttl_secs),
        };
        self.sign(&claims)
    }

    /// Signs a token for a logged-in principal.
    pub fn issue_for(&self, principal: &Principal) -> Result<String, AuthError> {
        self.issue(principal.guid, principal.role)
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::Issue(e.to_string()))
    }
}

impl Authenticator for JwtAuthenticator {
    fn authenticate(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidToken(e.to_string()),
            })
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidFormat)?;

    let (scheme, token) = value.split_once(' ').ok_or(AuthError::InvalidFormat)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::InvalidFormat);
    }
    Ok(token)
}
