use serde::{Deserialize, Serialize};

use super::envelope::{Entity, Envelope, Mutable};
use super::password::PasswordHasher;
use super::require_text;
use crate::error::DbError;

/// An academic year, e.g. `2024/2025`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Year {
    #[serde(flatten)]
    pub envelope: Envelope,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YearCreate {
    pub name: String,
}

pub type YearPut = YearCreate;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct YearPatch {
    pub name: Option<String>,
}

impl Entity for Year {
    const TABLE: &'static str = "year";

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn envelope_mut(&mut self) -> &mut Envelope {
        &mut self.envelope
    }

    fn validate(&self) -> Result<(), DbError> {
        require_text("name", &self.name)
    }
}

impl Mutable for Year {
    type Create = YearCreate;
    type Put = YearPut;
    type Patch = YearPatch;

    fn build(input: YearCreate, envelope: Envelope, _: &PasswordHasher) -> Result<Self, DbError> {
        let year = Self {
            envelope,
            name: input.name,
        };
        year.validate()?;
        Ok(year)
    }

    fn put(&mut self, input: YearPut, _: &PasswordHasher) -> Result<(), DbError> {
        self.name = input.name;
        self.validate()
    }

    fn patch(&mut self, input: YearPatch, _: &PasswordHasher) -> Result<(), DbError> {
        if let Some(name) = input.name {
            self.name = name;
        }
        self.validate()
    }
}
