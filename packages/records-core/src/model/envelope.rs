//! System envelope shared by every stored entity.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::password::PasswordHasher;
use crate::error::DbError;

/// System fields common to every entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub guid: Uuid,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Envelope {
    /// Fresh envelope with a random guid, stamped `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            guid: Uuid::new_v4(),
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Bumps `updated_at`, never moving it backwards.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.updated_at {
            self.updated_at = now;
        }
    }
}

/// A row stored in a [`Table`](crate::table::Table).
pub trait Entity: Clone + Serialize + DeserializeOwned {
    /// Table name, also used in error messages.
    const TABLE: &'static str;

    fn envelope(&self) -> &Envelope;

    fn envelope_mut(&mut self) -> &mut Envelope;

    /// Checks field-level invariants before the row is written.
    fn validate(&self) -> Result<(), DbError>;

    /// Value that must be unique among live rows, if any.
    fn unique_key(&self) -> Option<(&'static str, &str)> {
        None
    }

    /// JSON returned to API callers.
    fn to_public_json(&self) -> Result<serde_json::Value, DbError> {
        Ok(serde_json::to_value(self)?)
    }

    fn guid(&self) -> Uuid {
        self.envelope().guid
    }

    fn is_deleted(&self) -> bool {
        self.envelope().is_deleted
    }
}

/// An entity with create / full replace / partial update payloads.
pub trait Mutable: Entity {
    type Create: DeserializeOwned;
    type Put: DeserializeOwned;
    type Patch: DeserializeOwned;

    /// Builds a new row from a create payload. Passwords go through `passwords`.
    fn build(
        input: Self::Create,
        envelope: Envelope,
        passwords: &PasswordHasher,
    ) -> Result<Self, DbError>;

    /// Replaces every user-editable field.
    fn put(&mut self, input: Self::Put, passwords: &PasswordHasher) -> Result<(), DbError>;

    /// Updates only the fields present in the payload.
    fn patch(&mut self, input: Self::Patch, passwords: &PasswordHasher) -> Result<(), DbError>;
}
