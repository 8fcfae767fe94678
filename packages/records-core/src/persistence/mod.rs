//! Snapshot persistence: atomic JSON snapshot flush, load and recovery.


pub mod io_utils;
pub mod snapshot;

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::RecordsConfig;
use crate::database::Database;
use crate::error::DbError;

use self::io_utils::{classify_io_error, retry_io_operation};
use self::snapshot::{OwnedSnapshotFile, SnapshotFile, SnapshotTables, SNAPSHOT_VERSION};

/// Snapshot file name inside the data directory.
pub const SNAPSHOT_FILE: &str = "records.json";

/// Serialized snapshot ready to be written, tagged with its database revision.
#[derive(Debug, Clone)]
pub struct EncodedSnapshot {
    revision: u64,
    bytes: Vec<u8>,
}

impl EncodedSnapshot {
    /// Serializes every table with its checksum.
    pub fn encode(db: &Database) -> Result<Self, DbError> {
        let tables = SnapshotTables::of(db);
        let file = SnapshotFile {
            version: SNAPSHOT_VERSION,
            checksum: tables.checksum()?,
            tables,
        };
        Ok(Self {
            revision: db.revision(),
            bytes: serde_json::to_vec_pretty(&file)?,
        })
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Persistence manager for the snapshot file.
#[derive(Debug)]
pub struct PersistenceManager {
    /// Data directory path
    data_dir: PathBuf,
    /// Maximum retry attempts for transient I/O errors
    max_retries: u32,
    /// Delay between retry attempts in milliseconds
    retry_delay_ms: u64,
    /// Database revision covered by the last successful flush
    flushed_revision: Option<u64>,
}

impl PersistenceManager {
    /// Creates a persistence manager rooted at `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>, config: &RecordsConfig) -> Self {
        Self {
            data_dir: data_dir.into(),
            max_retries: config.persistence_max_retries,
            retry_delay_ms: config.persistence_retry_delay_ms,
            flushed_revision: None,
        }
    }

    /// Returns a manager when the configuration names a data directory.
    pub fn from_config(config: &RecordsConfig) -> Option<Self> {
        config
            .data_dir
            .as_ref()
            .map(|dir| Self::new(dir.clone(), config))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(SNAPSHOT_FILE)
    }

    /// Loads the database from the snapshot, or an empty database when no
    /// snapshot exists yet.
    ///
    /// # Errors
    /// - `DbError::DataCorruption` on checksum mismatch or duplicate guids
    /// - `DbError::SerializationError` on unreadable JSON or unknown version
    pub fn load(&mut self) -> Result<Database, DbError> {
        let path = self.snapshot_path();
        if !path.exists() {
            tracing::info!("No snapshot at {}, starting empty", path.display());
            self.flushed_revision = Some(0);
            return Ok(Database::new());
        }

        let contents = retry_io_operation(
            || fs::read(&path).map_err(|e| classify_io_error(e, "Failed to read snapshot")),
            self.max_retries,
            self.retry_delay_ms,
            "snapshot load",
        )?;

        let file: OwnedSnapshotFile = serde_json::from_slice(&contents).map_err(|e| {
            DbError::SerializationError(format!("Failed to parse snapshot: {}", e))
        })?;
        if file.version != SNAPSHOT_VERSION {
            return Err(DbError::SerializationError(format!(
                "Unsupported snapshot version: {}",
                file.version
            )));
        }

        let db = file.tables.into_database(file.checksum)?;
        tracing::info!(
            "Loaded snapshot: {} students, {} teachers, {} years, {} records",
            db.students().rows().len(),
            db.teachers().rows().len(),
            db.years().rows().len(),
            db.records().rows().len()
        );
        self.flushed_revision = Some(db.revision());
        Ok(db)
    }

    /// Revision covered by the last successful load or flush.
    pub fn flushed_revision(&self) -> Option<u64> {
        self.flushed_revision
    }

    /// Writes the snapshot: temp file, fsync, atomic rename.
    pub fn save(&mut self, db: &Database) -> Result<(), DbError> {
        let snapshot = EncodedSnapshot::encode(db)?;
        self.write(&snapshot)
    }

    /// Writes an already encoded snapshot. Blocks on file I/O and retry delays.
    pub fn write(&mut self, snapshot: &EncodedSnapshot) -> Result<(), DbError> {
        let temp_path = self.data_dir.join(format!("{}.tmp", SNAPSHOT_FILE));
        let final_path = self.snapshot_path();

        retry_io_operation(
            || {
                fs::create_dir_all(&self.data_dir)
                    .map_err(|e| classify_io_error(e, "Failed to create data directory"))?;
                let mut file = File::create(&temp_path)
                    .map_err(|e| classify_io_error(e, "Failed to create temp file"))?;
                file.write_all(&snapshot.bytes)
                    .map_err(|e| classify_io_error(e, "Failed to write snapshot"))?;
                file.sync_all()
                    .map_err(|e| classify_io_error(e, "Failed to sync snapshot"))?;
                fs::rename(&temp_path, &final_path)
                    .map_err(|e| classify_io_error(e, "Failed to rename snapshot"))
            },
            self.max_retries,
            self.retry_delay_ms,
            "snapshot save",
        )?;

        self.flushed_revision = Some(snapshot.revision);
        tracing::debug!(
            "Wrote snapshot revision {} ({} bytes)",
            snapshot.revision,
            snapshot.len()
        );
        Ok(())
    }

    /// Saves only when the database changed since the last flush.
    ///
    /// Returns whether a snapshot was written.
    pub fn flush_if_dirty(&mut self, db: &Database) -> Result<bool, DbError> {
        if self.flushed_revision == Some(db.revision()) {
            return Ok(false);
        }
        self.save(db)?;
        Ok(true)
    }
}
