//! On-disk snapshot format.

use serde::{Deserialize, Serialize};

use crate::database::Database;
use crate::error::DbError;
use crate::model::{AcademicRecord, Student, Teacher, Year};
use crate::table::Table;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Borrowed view of every table, written as-is.
#[derive(Debug, Serialize)]
pub struct SnapshotTables<'a> {
    pub students: &'a [Student],
    pub teachers: &'a [Teacher],
    pub years: &'a [Year],
    pub records: &'a [AcademicRecord],
}

/// Owned tables as read back from disk.
#[derive(Debug, Deserialize)]
pub struct OwnedSnapshotTables {
    pub students: Vec<Student>,
    pub teachers: Vec<Teacher>,
    pub years: Vec<Year>,
    pub records: Vec<AcademicRecord>,
}

/// Snapshot file: version, CRC32 of the serialized tables, tables.
#[derive(Debug, Serialize)]
pub struct SnapshotFile<'a> {
    pub version: u32,
    pub checksum: u32,
    pub tables: SnapshotTables<'a>,
}

#[derive(Debug, Deserialize)]
pub struct OwnedSnapshotFile {
    pub version: u32,
    pub checksum: u32,
    pub tables: OwnedSnapshotTables,
}

impl<'a> SnapshotTables<'a> {
    pub fn of(db: &'a Database) -> Self {
        Self {
            students: db.students().rows(),
            teachers: db.teachers().rows(),
            years: db.years().rows(),
            records: db.records().rows(),
        }
    }

    /// CRC32 over the compact JSON encoding of the tables.
    pub fn checksum(&self) -> Result<u32, DbError> {
        let bytes = serde_json::to_vec(self)?;
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&bytes);
        Ok(hasher.finalize())
    }
}

impl OwnedSnapshotTables {
    fn view(&self) -> SnapshotTables<'_> {
        SnapshotTables {
            students: &self.students,
            teachers: &self.teachers,
            years: &self.years,
            records: &self.records,
        }
    }

    /// Verifies `expected` and rebuilds the database.
    pub fn into_database(self, expected: u32) -> Result<Database, DbError> {
        let actual = self.view().checksum()?;
        if actual != expected {
            return Err(DbError::DataCorruption(format!(
                "snapshot checksum mismatch: expected {:08x}, got {:08x}",
                expected, actual
            )));
        }
        Ok(Database::from_tables(
            Table::from_rows(self.students)?,
            Table::from_rows(self.teachers)?,
            Table::from_rows(self.years)?,
            Table::from_rows(self.records)?,
        ))
    }
}
