//! Database container owning every table.

use chrono::Utc;
use uuid::Uuid;

use crate::error::DbError;
use crate::model::{
    verify_password, AcademicRecord, Entity, Envelope, Mutable, PasswordHasher, RecordCreate, Role,
    Student, Teacher, Year,
};
use crate::table::{ListQuery, Table};

/// Identity proven by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub guid: Uuid,
    pub email: String,
    pub role: Role,
}

/// Typed access to the table holding `T`.
pub trait TableAccess<T: Entity> {
    fn table(&self) -> &Table<T>;
    fn table_mut(&mut self) -> &mut Table<T>;
}

/// Database container holding all tables.
///
/// Not shared: the runtime owns it and applies requests one at a time.
#[derive(Debug, Default)]
pub struct Database {
    students: Table<Student>,
    teachers: Table<Teacher>,
    years: Table<Year>,
    records: Table<AcademicRecord>,
    /// Bumped on every successful mutation
    revision: u64,
    /// Hashes passwords on create and update
    passwords: PasswordHasher,
}

macro_rules! table_access {
    ($entity:ty, $field:ident) => {
        impl TableAccess<$entity> for Database {
            fn table(&self) -> &Table<$entity> {
                &self.$field
            }

            fn table_mut(&mut self) -> &mut Table<$entity> {
                &mut self.$field
            }
        }
    };
}

table_access!(Student, students);
table_access!(Teacher, teachers);
table_access!(Year, years);
table_access!(AcademicRecord, records);

impl Database {
    /// Creates a new empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a database from persisted tables.
    pub fn from_tables(
        students: Table<Student>,
        teachers: Table<Teacher>,
        years: Table<Year>,
        records: Table<AcademicRecord>,
    ) -> Self {
        Self {
            students,
            teachers,
            years,
            records,
            revision: 0,
            passwords: PasswordHasher::default(),
        }
    }

    /// Replaces the password hasher, e.g. to apply the configured bcrypt cost.
    pub fn with_password_hasher(mut self, passwords: PasswordHasher) -> Self {
        self.passwords = passwords;
        self
    }

    pub fn password_hasher(&self) -> &PasswordHasher {
        &self.passwords
    }

    pub fn students(&self) -> &Table<Student> {
        &self.students
    }

    pub fn teachers(&self) -> &Table<Teacher> {
        &self.teachers
    }

    pub fn years(&self) -> &Table<Year> {
        &self.years
    }

    pub fn records(&self) -> &Table<AcademicRecord> {
        &self.records
    }

    /// Mutation counter used by persistence to skip clean flushes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Creates a new entity from its create payload.
    pub fn create<T>(&mut self, input: T::Create) -> Result<&T, DbError>
    where
        T: Mutable,
        Self: TableAccess<T>,
    {
        let row = T::build(input, Envelope::new(Utc::now()), &self.passwords)?;
        let guid = row.guid();
        TableAccess::<T>::table_mut(self).insert(row)?;
        self.revision += 1;
        TableAccess::<T>::table(self).get(guid)
    }

    /// Returns a live entity by guid.
    pub fn get<T>(&self, guid: Uuid) -> Result<&T, DbError>
    where
        T: Entity,
        Self: TableAccess<T>,
    {
        TableAccess::<T>::table(self).get(guid)
    }

    /// Returns a live entity by email.
    pub fn find_by_email<T>(&self, email: &str) -> Result<&T, DbError>
    where
        T: Entity,
        Self: TableAccess<T>,
    {
        TableAccess::<T>::table(self).find_by_unique(email)
    }

    /// Lists live entities inside the window.
    pub fn list<T>(&self, query: &ListQuery) -> Vec<&T>
    where
        T: Entity,
        Self: TableAccess<T>,
    {
        TableAccess::<T>::table(self).list(query)
    }

    /// Replaces every editable field of a live entity.
    pub fn put<T>(&mut self, guid: Uuid, input: T::Put) -> Result<&T, DbError>
    where
        T: Mutable,
        Self: TableAccess<T>,
    {
        let passwords = self.passwords;
        TableAccess::<T>::table_mut(self).update(guid, Utc::now(), |row| {
            row.put(input, &passwords)
        })?;
        self.revision += 1;
        TableAccess::<T>::table(self).get(guid)
    }

    /// Updates only the fields present in the patch.
    pub fn patch<T>(&mut self, guid: Uuid, input: T::Patch) -> Result<&T, DbError>
    where
        T: Mutable,
        Self: TableAccess<T>,
    {
        let passwords = self.passwords;
        TableAccess::<T>::table_mut(self).update(guid, Utc::now(), |row| {
            row.patch(input, &passwords)
        })?;
        self.revision += 1;
        TableAccess::<T>::table(self).get(guid)
    }

    /// Soft-deletes a live entity.
    pub fn delete<T>(&mut self, guid: Uuid) -> Result<(), DbError>
    where
        T: Entity,
        Self: TableAccess<T>,
    {
        TableAccess::<T>::table_mut(self).soft_delete(guid, Utc::now())?;
        self.revision += 1;
        Ok(())
    }

    /// Soft-deletes a student together with its records.
    pub fn delete_student(&mut self, guid: Uuid) -> Result<(), DbError> {
        self.delete::<Student>(guid)?;
        let now = Utc::now();
        let owned: Vec<Uuid> = self
            .records
            .iter_live()
            .filter(|record| record.student_guid == guid)
            .map(|record| record.guid())
            .collect();
        for record in owned {
            self.records.soft_delete(record, now)?;
        }
        Ok(())
    }

    /// Creates a record for a live student in a live year.
    pub fn create_record(
        &mut self,
        student: Uuid,
        year: Uuid,
        input: RecordCreate,
    ) -> Result<&AcademicRecord, DbError> {
        self.students.get(student)?;
        self.years.get(year)?;
        let record = AcademicRecord::build(student, year, input, Envelope::new(Utc::now()))?;
        let guid = record.guid();
        self.records.insert(record)?;
        self.revision += 1;
        self.records.get(guid)
    }

    /// Lists a student's live records, optionally restricted to one year.
    pub fn list_records(
        &self,
        student: Uuid,
        year: Option<Uuid>,
        query: &ListQuery,
    ) -> Result<Vec<&AcademicRecord>, DbError> {
        self.students.get(student)?;
        if let Some(year) = year {
            self.years.get(year)?;
        }
        Ok(self.records.list_where(query, |record| {
            record.student_guid == student && year.map_or(true, |y| record.year_guid == y)
        }))
    }

    /// Returns one live record that belongs to `student`.
    pub fn get_record(&self, student: Uuid, guid: Uuid) -> Result<&AcademicRecord, DbError> {
        self.students.get(student)?;
        self.records
            .get(guid)
            .ok()
            .filter(|record| record.student_guid == student)
            .ok_or_else(|| DbError::not_found(AcademicRecord::TABLE, guid))
    }

    /// Soft-deletes one record of `student`.
    pub fn delete_record(&mut self, student: Uuid, guid: Uuid) -> Result<(), DbError> {
        self.get_record(student, guid)?;
        self.delete::<AcademicRecord>(guid)
    }

    /// Checks an email/password pair against students, then teachers.
    ///
    /// Accounts without a stored password cannot log in.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<Principal, DbError> {
        fn check<T: Entity>(
            row: Option<&T>,
            hash: impl Fn(&T) -> Option<&str>,
            role: impl Fn(&T) -> Role,
            password: &str,
        ) -> Option<Principal> {
            let row = row?;
            let stored = hash(row)?;
            if !verify_password(password, stored) {
                return None;
            }
            let (_, email) = row.unique_key()?;
            Some(Principal {
                guid: row.guid(),
                email: email.to_string(),
                role: role(row),
            })
        }

        check(
            self.students.find_by_unique(email).ok(),
            |s: &Student| s.password_hash.as_deref(),
            |s: &Student| s.role,
            password,
        )
        .or_else(|| {
            check(
                self.teachers.find_by_unique(email).ok(),
                |t: &Teacher| t.password_hash.as_deref(),
                |t: &Teacher| t.role,
                password,
            )
        })
        .ok_or(DbError::InvalidCredentials)
    }
}
