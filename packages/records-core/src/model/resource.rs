use std::fmt;

/// Top-level resources served under `/{resource}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Student,
    Teacher,
    Year,
}

impl Resource {
    pub const ALL: [Resource; 3] = [Resource::Student, Resource::Teacher, Resource::Year];

    /// Path segment and table name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Student => "student",
            Resource::Teacher => "teacher",
            Resource::Year => "year",
        }
    }

    /// Whether `/{resource}/email/{email}` lookups exist.
    pub fn has_email(&self) -> bool {
        matches!(self, Resource::Student | Resource::Teacher)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
