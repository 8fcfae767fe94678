//! Student entity and payloads.

use serde::{Deserialize, Serialize};

use super::envelope::{Entity, Envelope, Mutable};
use super::password::PasswordHasher;
use super::role::Role;
use super::{require_email, require_text};
use crate::error::DbError;

/// Valid study years.
pub const COURSE_RANGE: std::ops::RangeInclusive<u8> = 1..=6;

/// A student account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    #[serde(flatten)]
    pub envelope: Envelope,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub role: Role,
    pub group: String,
    pub course: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
}

/// `POST /student` body.
#[derive(Debug, Clone, Deserialize)]
pub struct StudentCreate {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default = "default_role")]
    pub role: Role,
    pub group: String,
    pub course: u8,
    #[serde(default)]
    pub password: Option<String>,
}

/// `PUT /student/{guid}` body. A missing password keeps the stored one.
pub type StudentPut = StudentCreate;

/// `PATCH /student/{guid}` body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentPatch {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub middle_name: Option<String>,
    pub role: Option<Role>,
    pub group: Option<String>,
    pub course: Option<u8>,
    pub password: Option<String>,
}

fn default_role() -> Role {
    Role::Student
}

impl Entity for Student {
    const TABLE: &'static str = "student";

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn envelope_mut(&mut self) -> &mut Envelope {
        &mut self.envelope
    }

    fn validate(&self) -> Result<(), DbError> {
        require_email(&self.email)?;
        require_text("first_name", &self.first_name)?;
        require_text("last_name", &self.last_name)?;
        require_text("group", &self.group)?;
        if !COURSE_RANGE.contains(&self.course) {
            return Err(DbError::invalid(
                "course",
                format!(
                    "{} is outside {}..={}",
                    self.course,
                    COURSE_RANGE.start(),
                    COURSE_RANGE.end()
                ),
            ));
        }
        Ok(())
    }

    fn unique_key(&self) -> Option<(&'static str, &str)> {
        Some(("email", &self.email))
    }

    fn to_public_json(&self) -> Result<serde_json::Value, DbError> {
        let mut value = serde_json::to_value(self)?;
        if let Some(obj) = value.as_object_mut() {
            obj.remove("password_hash");
        }
        Ok(value)
    }
}

impl Mutable for Student {
    type Create = StudentCreate;
    type Put = StudentPut;
    type Patch = StudentPatch;

    fn build(
        input: StudentCreate,
        envelope: Envelope,
        passwords: &PasswordHasher,
    ) -> Result<Self, DbError> {
        let mut student = Self {
            envelope,
            email: input.email,
            first_name: input.first_name,
            last_name: input.last_name,
            middle_name: input.middle_name,
            role: input.role,
            group: input.group,
            course: input.course,
            password_hash: None,
        };
        student.validate()?;
        if let Some(password) = input.password.as_deref() {
            student.password_hash = Some(passwords.hash(password)?);
        }
        Ok(student)
    }

    fn put(&mut self, input: StudentPut, passwords: &PasswordHasher) -> Result<(), DbError> {
        self.email = input.email;
        self.first_name = input.first_name;
        self.last_name = input.last_name;
        self.middle_name = input.middle_name;
        self.role = input.role;
        self.group = input.group;
        self.course = input.course;
        self.validate()?;
        if let Some(password) = input.password.as_deref() {
            self.password_hash = Some(passwords.hash(password)?);
        }
        Ok(())
    }

    fn patch(&mut self, input: StudentPatch, passwords: &PasswordHasher) -> Result<(), DbError> {
        if let Some(email) = input.email {
            self.email = email;
        }
        if let Some(first_name) = input.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = input.last_name {
            self.last_name = last_name;
        }
        if let Some(middle_name) = input.middle_name {
            self.middle_name = Some(middle_name);
        }
        if let Some(role) = input.role {
            self.role = role;
        }
        if let Some(group) = input.group {
            self.group = group;
        }
        if let Some(course) = input.course {
            self.course = course;
        }
        self.validate()?;
        if let Some(password) = input.password.as_deref() {
            self.password_hash = Some(passwords.hash(password)?);
        }
        Ok(())
    }
}
