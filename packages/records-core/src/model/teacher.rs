use serde::{Deserialize, Serialize};

use super::envelope::{Entity, Envelope, Mutable};
use super::password::PasswordHasher;
use super::role::Role;
use super::{require_email, require_text};
use crate::error::DbError;

/// A teacher account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    #[serde(flatten)]
    pub envelope: Envelope,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub role: Role,
    pub department: String,
    pub position: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
}

/// `POST /teacher` and `PUT /teacher/{guid}` body.
///
/// Older clients spell the department field `departament`; both are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct TeacherCreate {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default = "default_role")]
    pub role: Role,
    #[serde(alias = "departament")]
    pub department: String,
    pub position: String,
    #[serde(default)]
    pub password: Option<String>,
}

pub type TeacherPut = TeacherCreate;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeacherPatch {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub middle_name: Option<String>,
    pub role: Option<Role>,
    #[serde(alias = "departament")]
    pub department: Option<String>,
    pub position: Option<String>,
    pub password: Option<String>,
}

fn default_role() -> Role {
    Role::Teacher
}

impl Entity for Teacher {
    const TABLE: &'static str = "teacher";

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
        require_text("department", &self.department)?;
        require_text("position", &self.position)
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

impl Mutable for Teacher {
    type Create = TeacherCreate;
    type Put = TeacherPut;
    type Patch = TeacherPatch;

    fn build(
        input: TeacherCreate,
        envelope: Envelope,
        passwords: &PasswordHasher,
    ) -> Result<Self, DbError> {
        let mut teacher = Self {
            envelope,
            email: input.email,
            first_name: input.first_name,
            last_name: input.last_name,
            middle_name: input.middle_name,
            role: input.role,
            department: input.department,
            position: input.position,
            password_hash: None,
        };
        teacher.validate()?;
        if let Some(password) = input.password.as_deref() {
            teacher.password_hash = Some(passwords.hash(password)?);
        }
        Ok(teacher)
    }

    fn put(&mut self, input: TeacherPut, passwords: &PasswordHasher) -> Result<(), DbError> {
        self.email = input.email;
        self.first_name = input.first_name;
        self.last_name = input.last_name;
        self.middle_name = input.middle_name;
        self.role = input.role;
        self.department = input.department;
        self.position = input.position;
        self.validate()?;
        if let Some(password) = input.password.as_deref() {
            self.password_hash = Some(passwords.hash(password)?);
        }
        Ok(())
    }

    fn patch(&mut self, input: TeacherPatch, passwords: &PasswordHasher) -> Result<(), DbError> {
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
        if let Some(department) = input.department {
            self.department = department;
        }
        if let Some(position) = input.position {
            self.position = position;
        }
        self.validate()?;
        if let Some(password) = input.password.as_deref() {
            self.password_hash = Some(passwords.hash(password)?);
        }
        Ok(())
    }
}
