//! Per-student academic record, scoped by year.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::envelope::{Entity, Envelope};
use super::require_text;
use crate::error::DbError;

pub const MARK_RANGE: std::ops::RangeInclusive<u8> = 1..=5;
pub const SEMESTER_RANGE: std::ops::RangeInclusive<u8> = 1..=2;

/// A mark for one subject in one semester of an academic year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcademicRecord {
    #[serde(flatten)]
    pub envelope: Envelope,
    pub student_guid: Uuid,
    pub year_guid: Uuid,
    pub subject: String,
    pub mark: u8,
    pub semester: u8,
}

/// `POST /student/{guid}/record?year={guid}` body.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordCreate {
    pub subject: String,
    pub mark: u8,
    #[serde(default = "default_semester")]
    pub semester: u8,
}

fn default_semester() -> u8 {
    1
}

impl AcademicRecord {
    pub fn build(
        student_guid: Uuid,
        year_guid: Uuid,
        input: RecordCreate,
        envelope: Envelope,
    ) -> Result<Self, DbError> {
        let record = Self {
            envelope,
            student_guid,
            year_guid,
            subject: input.subject,
            mark: input.mark,
            semester: input.semester,
        };
        record.validate()?;
        Ok(record)
    }
}

impl Entity for AcademicRecord {
    const TABLE: &'static str = "record";

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn envelope_mut(&mut self) -> &mut Envelope {
        &mut self.envelope
    }

    fn validate(&self) -> Result<(), DbError> {
        require_text("subject", &self.subject)?;
        if !MARK_RANGE.contains(&self.mark) {
            return Err(DbError::invalid(
                "mark",
                format!("{} is outside {}..={}", self.mark, MARK_RANGE.start(), MARK_RANGE.end()),
            ));
        }
        if !SEMESTER_RANGE.contains(&self.semester) {
            return Err(DbError::invalid(
                "semester",
                format!(
                    "{} is outside {}..={}",
                    self.semester,
                    SEMESTER_RANGE.start(),
                    SEMESTER_RANGE.end()
                ),
            ));
        }
        Ok(())
    }
}
