//! Entity model: the system envelope, the four resource types and their
//! create/put/patch payloads.

mod envelope;
mod password;
mod record;
mod resource;
mod role;
mod student;
mod teacher;
mod year;

pub use envelope::{Entity, Envelope, Mutable};
pub use password::{verify_password, PasswordHasher, BCRYPT_COST};
pub use record::{AcademicRecord, RecordCreate};
pub use resource::Resource;
pub use role::Role;
pub use student::{Student, StudentCreate, StudentPatch, StudentPut};
pub use teacher::{Teacher, TeacherCreate, TeacherPatch, TeacherPut};
pub use year::{Year, YearCreate, YearPatch, YearPut};

use crate::error::DbError;

/// Rejects empty or whitespace-only strings.
pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), DbError> {
    if value.trim().is_empty() {
        return Err(DbError::invalid(field, "must not be empty"));
    }
    Ok(())
}

/// Minimal shape check: one `@` with a non-empty local part and domain.
pub(crate) fn require_email(value: &str) -> Result<(), DbError> {
    match value.split_once('@') {
        Some((local, domain))
            if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
        {
            Ok(())
        }
        _ => Err(DbError::invalid("email", format!("'{}' is not an email address", value))),
    }
}
