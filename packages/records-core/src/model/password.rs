//! Bcrypt password hashing.

use crate::error::DbError;

/// Bcrypt cost used unless the configuration overrides it.
pub const BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;

/// Hashes passwords at a fixed bcrypt cost.
///
/// The stored form is the bcrypt string, which carries its own salt and
/// cost, so changing the cost later still verifies older hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hashes a password with a fresh salt.
    ///
    /// # Errors
    /// `DbError::PasswordHash` when bcrypt rejects the cost
    pub fn hash(&self, password: &str) -> Result<String, DbError> {
        bcrypt::hash(password, self.cost).map_err(|e| DbError::PasswordHash(e.to_string()))
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(BCRYPT_COST)
    }
}

/// Checks a password against a stored bcrypt hash. Unparseable hashes never match.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match bcrypt::verify(password, hash) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!("Stored password hash is unusable: {}", e);
            false
        }
    }
}
